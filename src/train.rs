use std::ops::ControlFlow;

use crate::{
    agent::Agent,
    env::{Environment, Report},
    error::Result,
    exp::Exp,
};

/// Which loop is driving the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Demo,
}

/// Read-only view of a run, handed to an [`Observer`]
pub struct Progress<'a, E, A> {
    pub env: &'a E,
    pub agent: &'a A,
    pub phase: Phase,
    /// 1-based episode number
    pub episode: usize,
    pub total_episodes: usize,
    /// Reward of the last step, `0.0` at the end of an episode
    pub reward: f64,
    pub history: &'a History,
}

/// Watches a run without being able to change it
///
/// Returning [`ControlFlow::Break`] ends the run after the current step; the
/// interrupted episode is not recorded.
pub trait Observer<E, A> {
    /// Called right after the environment is reset, before the first step
    fn on_episode_start(&mut self, _progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
        Ok(ControlFlow::Continue(()))
    }

    /// Called on throttled steps, see [`TrainConfig`]
    fn on_step(&mut self, progress: Progress<'_, E, A>) -> Result<ControlFlow<()>>;

    /// Called once an episode has finished and been recorded
    fn on_episode_end(&mut self, progress: Progress<'_, E, A>) -> Result<ControlFlow<()>>;
}

/// The headless observer
impl<E, A> Observer<E, A> for () {
    fn on_step(&mut self, _progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
        Ok(ControlFlow::Continue(()))
    }

    fn on_episode_end(&mut self, _progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
        Ok(ControlFlow::Continue(()))
    }
}

/// Configuration for [`train`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// **Default**: `1000`
    pub episodes: usize,
    /// Observe every n-th step of an episode
    ///
    /// **Default**: `2`
    pub steps_per_update: usize,
    /// Steps rewarded above this are always observed
    ///
    /// **Default**: `50.0`
    pub redraw_reward: f64,
    /// Log a progress line every n episodes
    ///
    /// **Default**: `25`
    pub log_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            steps_per_update: 2,
            redraw_reward: 50.0,
            log_interval: 25,
        }
    }
}

impl TrainConfig {
    fn should_observe(&self, step: usize, reward: f64, done: bool) -> bool {
        done || reward > self.redraw_reward || step % self.steps_per_update.max(1) == 0
    }
}

/// Configuration for [`demo`]
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// **Default**: `3`
    pub episodes: usize,
    /// A demo episode is cut short once it has taken more than this many steps
    ///
    /// **Default**: `150`
    pub step_limit: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            episodes: 3,
            step_limit: 150,
        }
    }
}

/// Per-episode training statistics
///
/// The three series always have one entry per completed episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    scores: Vec<usize>,
    exploration: Vec<f64>,
    avg_rewards: Vec<f64>,
}

impl History {
    pub fn push(&mut self, score: usize, exploration_rate: f64, avg_reward: f64) {
        self.scores.push(score);
        self.exploration.push(exploration_rate);
        self.avg_rewards.push(avg_reward);
    }

    /// Number of completed episodes
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> &[usize] {
        &self.scores
    }

    pub fn exploration(&self) -> &[f64] {
        &self.exploration
    }

    pub fn avg_rewards(&self) -> &[f64] {
        &self.avg_rewards
    }

    /// Mean score over the last `n` episodes, `0.0` before the first one
    pub fn recent_mean_score(&self, n: usize) -> f64 {
        let recent = &self.scores[self.scores.len().saturating_sub(n)..];
        mean(recent.iter().map(|&s| s as f64))
    }

    /// Mean average reward over the last `n` episodes, `0.0` before the first one
    pub fn recent_mean_reward(&self, n: usize) -> f64 {
        let recent = &self.avg_rewards[self.avg_rewards.len().saturating_sub(n)..];
        mean(recent.iter().copied())
    }

    pub fn best_score(&self) -> usize {
        self.scores.iter().copied().max().unwrap_or_default()
    }
}

/// Trailing mean of each element over itself and up to `window - 1` predecessors
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..series.len())
        .map(|i| mean(series[(i + 1).saturating_sub(window)..=i].iter().copied()))
        .collect()
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

/// Train `agent` in `env` for `config.episodes` episodes
///
/// Every episode starts from [`Environment::reset`] and feeds each transition to
/// [`Agent::learn`] until the environment reports `done`. **Returns** the
/// statistics of every completed episode, which is fewer than requested only if
/// the observer stopped the run.
pub fn train<E, A, O>(
    env: &mut E,
    agent: &mut A,
    config: &TrainConfig,
    observer: &mut O,
) -> Result<History>
where
    E: Environment,
    A: Agent<E>,
    O: Observer<E, A>,
{
    let mut history = History::default();
    log::info!("Training for {} episodes", config.episodes);

    for episode in 1..=config.episodes {
        let mut state = env.reset();
        let mut step = 0;

        let progress = Progress {
            env: &*env,
            agent: &*agent,
            phase: Phase::Train,
            episode,
            total_episodes: config.episodes,
            reward: 0.0,
            history: &history,
        };
        if observer.on_episode_start(progress)?.is_break() {
            log::warn!("Training stopped before episode {episode}");
            return Ok(history);
        }

        loop {
            let action = agent.act(&state);
            let (next_state, reward, done) = env.step(action.clone());
            agent.learn(Exp {
                state,
                action,
                reward,
                next_state: next_state.clone(),
                done,
            });
            state = next_state;
            step += 1;

            if config.should_observe(step, reward, done) {
                let progress = Progress {
                    env: &*env,
                    agent: &*agent,
                    phase: Phase::Train,
                    episode,
                    total_episodes: config.episodes,
                    reward,
                    history: &history,
                };
                if observer.on_step(progress)?.is_break() {
                    log::warn!("Training stopped during episode {episode}");
                    return Ok(history);
                }
            }

            if done {
                break;
            }
        }

        let report = env.report();
        history.push(report.score, agent.exploration_rate(), report.avg_reward());
        log::debug!(
            "Episode {episode}: score {} in {} steps, total reward {:.1}",
            report.score,
            report.steps,
            report.total_reward
        );

        let progress = Progress {
            env: &*env,
            agent: &*agent,
            phase: Phase::Train,
            episode,
            total_episodes: config.episodes,
            reward: 0.0,
            history: &history,
        };
        if observer.on_episode_end(progress)?.is_break() {
            log::warn!("Training stopped after episode {episode}");
            return Ok(history);
        }

        if config.log_interval > 0 && episode % config.log_interval == 0 {
            log::info!(
                "Episode {episode:>4} | Avg Score: {:5.2} | Avg Reward: {:6.1} | Epsilon: {:.4}",
                history.recent_mean_score(config.log_interval),
                history.recent_mean_reward(config.log_interval),
                agent.exploration_rate(),
            );
        }
    }

    log::info!(
        "Training completed: {:.2} avg score over the last 50 episodes",
        history.recent_mean_score(50)
    );
    Ok(history)
}

/// Run `agent` greedily in `env` without learning
///
/// Every step is observed. **Returns** the report of each completed demo episode.
pub fn demo<E, A, O>(
    env: &mut E,
    agent: &A,
    config: &DemoConfig,
    observer: &mut O,
) -> Result<Vec<Report>>
where
    E: Environment,
    A: Agent<E>,
    O: Observer<E, A>,
{
    let mut reports = Vec::with_capacity(config.episodes);
    let history = History::default();

    for episode in 1..=config.episodes {
        let mut state = env.reset();
        let mut step = 0;

        let progress = Progress {
            env: &*env,
            agent,
            phase: Phase::Demo,
            episode,
            total_episodes: config.episodes,
            reward: 0.0,
            history: &history,
        };
        if observer.on_episode_start(progress)?.is_break() {
            return Ok(reports);
        }

        loop {
            let (next_state, reward, done) = env.step(agent.act_greedy(&state));
            state = next_state;
            step += 1;

            let progress = Progress {
                env: &*env,
                agent,
                phase: Phase::Demo,
                episode,
                total_episodes: config.episodes,
                reward,
                history: &history,
            };
            if observer.on_step(progress)?.is_break() {
                return Ok(reports);
            }

            if done || step > config.step_limit {
                break;
            }
        }

        let report = env.report();
        log::info!(
            "Demo episode {episode}: {} algae in {} steps",
            report.score,
            report.steps
        );
        reports.push(report);

        let progress = Progress {
            env: &*env,
            agent,
            phase: Phase::Demo,
            episode,
            total_episodes: config.episodes,
            reward: 0.0,
            history: &history,
        };
        if observer.on_episode_end(progress)?.is_break() {
            return Ok(reports);
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use crate::{
        algo::tabular::{QTableAgent, QTableAgentConfig},
        decay::Constant,
        env::tests::MockEnv,
        exploration::EpsilonGreedy,
        gym::{AlgaeField, AlgaeFieldConfig},
    };

    use super::*;

    /// Counts callbacks and stops after a fixed number of episode ends
    #[derive(Default)]
    struct Recorder {
        starts: Vec<usize>,
        steps: Vec<(usize, f64)>,
        episodes: Vec<usize>,
        history_lens: Vec<usize>,
        stop_after: Option<usize>,
    }

    impl<E, A> Observer<E, A> for Recorder {
        fn on_episode_start(&mut self, progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
            self.starts.push(progress.episode);
            Ok(ControlFlow::Continue(()))
        }

        fn on_step(&mut self, progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
            self.steps.push((progress.episode, progress.reward));
            Ok(ControlFlow::Continue(()))
        }

        fn on_episode_end(&mut self, progress: Progress<'_, E, A>) -> Result<ControlFlow<()>> {
            self.episodes.push(progress.episode);
            self.history_lens.push(progress.history.len());
            match self.stop_after {
                Some(n) if self.episodes.len() >= n => Ok(ControlFlow::Break(())),
                _ => Ok(ControlFlow::Continue(())),
            }
        }
    }

    fn greedy_agent(env: &MockEnv, alpha: f64) -> QTableAgent<Constant> {
        let mut agent = QTableAgent::for_env(
            env,
            QTableAgentConfig {
                exploration: EpsilonGreedy::new(Constant::new(0.0)),
                alpha,
                gamma: 0.9,
            },
        );
        agent.fill(0.0);
        agent
    }

    #[test]
    fn history_series_stay_in_lock_step() {
        let mut env = MockEnv::new(6);
        let mut agent = QTableAgent::for_env(&env, QTableAgentConfig::default());
        let config = TrainConfig {
            episodes: 12,
            ..Default::default()
        };

        let history = train(&mut env, &mut agent, &config, &mut ()).unwrap();

        assert_eq!(history.len(), 12, "one entry per episode");
        assert_eq!(history.exploration().len(), 12);
        assert_eq!(history.avg_rewards().len(), 12);
        assert!(
            history.exploration().windows(2).all(|w| w[1] <= w[0]),
            "exploration never increases"
        );
        assert!(history.scores().iter().all(|&s| s <= 1));
    }

    #[test]
    fn observer_sees_throttled_steps_and_every_episode() {
        // A greedy agent that never learns stays put, so every episode runs the full 6 steps
        let mut env = MockEnv::new(6);
        let mut agent = greedy_agent(&env, 0.0);
        let config = TrainConfig {
            episodes: 3,
            steps_per_update: 4,
            ..Default::default()
        };
        let mut recorder = Recorder::default();

        let history = train(&mut env, &mut agent, &config, &mut recorder).unwrap();

        assert_eq!(history.scores(), [0, 0, 0]);
        assert_eq!(recorder.starts, [1, 2, 3], "every episode start observed");
        assert_eq!(recorder.episodes, [1, 2, 3], "every episode end observed");
        assert_eq!(recorder.history_lens, [1, 2, 3], "recorded before observing");
        // Steps 4 (throttle) and 6 (done) of each episode
        assert_eq!(recorder.steps.len(), 6);
        assert!((history.avg_rewards()[0] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn observer_can_stop_training() {
        let mut env = MockEnv::new(5);
        let mut agent = greedy_agent(&env, 0.5);
        let config = TrainConfig {
            episodes: 10,
            ..Default::default()
        };
        let mut recorder = Recorder {
            stop_after: Some(4),
            ..Default::default()
        };

        let history = train(&mut env, &mut agent, &config, &mut recorder).unwrap();

        assert_eq!(history.len(), 4, "only completed episodes recorded");
    }

    #[test]
    fn trains_on_algae_field() {
        let mut env = AlgaeField::new(AlgaeFieldConfig::default()).unwrap();
        let mut agent = QTableAgent::for_env(&env, QTableAgentConfig::default());
        let config = TrainConfig {
            episodes: 5,
            ..Default::default()
        };
        let mut recorder = Recorder::default();

        let history = train(&mut env, &mut agent, &config, &mut recorder).unwrap();

        assert_eq!(history.len(), 5);
        assert!(history.scores().iter().all(|&s| s <= 8), "at most every algae");
        assert!(agent.epsilon() < 0.9, "exploration decayed while training");
        assert!(
            recorder.steps.iter().all(|&(ep, _)| (1..=5).contains(&ep)),
            "episodes are 1-based"
        );
    }

    #[test]
    fn demo_runs_greedy_without_learning() {
        let mut env = MockEnv::new(100);
        let mut agent = greedy_agent(&env, 0.5);
        // Make "move right" the greedy choice everywhere
        for state in 0..agent.num_states() {
            agent.update(state, 1, 1.0, state, true);
        }
        let epsilon = agent.epsilon();
        let mut recorder = Recorder::default();
        let config = DemoConfig {
            episodes: 2,
            step_limit: 50,
        };

        let reports = demo(&mut env, &agent, &config, &mut recorder).unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.score == 1 && r.steps == 3));
        assert_eq!(recorder.steps.len(), 6, "every demo step observed");
        assert_eq!(recorder.starts, [1, 2]);
        assert_eq!(agent.epsilon(), epsilon, "exploration untouched");
    }

    /// Where the agent stands when each episode starts
    #[derive(Default)]
    struct StartPositions(Vec<(usize, usize)>);

    impl<A> Observer<MockEnv, A> for StartPositions {
        fn on_episode_start(
            &mut self,
            progress: Progress<'_, MockEnv, A>,
        ) -> Result<ControlFlow<()>> {
            self.0.push((progress.env.pos, progress.env.report().steps));
            Ok(ControlFlow::Continue(()))
        }

        fn on_step(&mut self, _progress: Progress<'_, MockEnv, A>) -> Result<ControlFlow<()>> {
            Ok(ControlFlow::Continue(()))
        }

        fn on_episode_end(
            &mut self,
            _progress: Progress<'_, MockEnv, A>,
        ) -> Result<ControlFlow<()>> {
            Ok(ControlFlow::Continue(()))
        }
    }

    #[test]
    fn episode_start_sees_reset_position() {
        let mut env = MockEnv::new(100);
        let mut agent = greedy_agent(&env, 0.5);
        for state in 0..agent.num_states() {
            agent.update(state, 1, 1.0, state, true);
        }
        let mut starts = StartPositions::default();

        demo(&mut env, &agent, &DemoConfig::default(), &mut starts).unwrap();

        assert_eq!(starts.0, [(0, 0); 3], "observed before the first step");
    }

    #[test]
    fn demo_respects_step_limit() {
        let mut env = MockEnv::new(1000);
        let agent = greedy_agent(&env, 0.0);
        let config = DemoConfig {
            episodes: 1,
            step_limit: 7,
        };

        let reports = demo(&mut env, &agent, &config, &mut ()).unwrap();

        assert_eq!(reports[0].steps, 8, "cut short just past the limit");
    }

    #[test]
    fn history_statistics() {
        let mut history = History::default();
        assert_eq!(history.recent_mean_score(10), 0.0, "empty history");
        assert_eq!(history.best_score(), 0);

        for (score, reward) in [(1, 0.5), (4, 1.5), (2, -1.0)] {
            history.push(score, 0.5, reward);
        }

        assert_eq!(history.best_score(), 4);
        assert_eq!(history.recent_mean_score(2), 3.0);
        assert_eq!(history.recent_mean_score(50), 7.0 / 3.0);
        assert_eq!(history.recent_mean_reward(2), 0.25);
    }

    #[test]
    fn moving_average_is_trailing() {
        let series = [2.0, 4.0, 6.0, 8.0];
        assert_eq!(moving_average(&series, 2), [2.0, 3.0, 5.0, 7.0]);
        assert_eq!(moving_average(&series, 10), [2.0, 3.0, 4.0, 5.0]);
        assert!(moving_average(&[], 3).is_empty());
    }
}
