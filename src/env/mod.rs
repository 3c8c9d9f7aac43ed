/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and episodes that run from [`reset`](Environment::reset) until a step reports `done`.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State: Clone;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** `(next_state, reward, done)`
    fn step(&mut self, action: Self::Action) -> (Self::State, f64, bool);

    /// Reset the environment to the start of a new episode
    ///
    /// **Returns** the initial state
    fn reset(&mut self) -> Self::State;

    /// Statistics of the current episode
    fn report(&self) -> Report;
}

/// An environment whose states and actions are dense indices `0..n`, suitable for tabular methods
pub trait DiscreteSpace: Environment<State = usize, Action = usize> {
    /// Number of distinct states
    fn num_states(&self) -> usize;

    /// Number of distinct actions, all of which are available in every state
    fn num_actions(&self) -> usize;
}

/// Per-episode statistics reported by an [`Environment`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Report {
    pub score: usize,
    pub steps: usize,
    pub total_reward: f64,
}

impl Report {
    /// Mean reward per step, or the total reward if no step was taken
    pub fn avg_reward(&self) -> f64 {
        self.total_reward / self.steps.max(1) as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A corridor of `LEN` cells; action 1 moves right, anything else stays.
    /// Reaching the last cell scores and ends the episode, as does running out of steps.
    pub struct MockEnv {
        pub pos: usize,
        pub report: Report,
        pub step_limit: usize,
    }

    pub const LEN: usize = 4;

    impl MockEnv {
        pub fn new(step_limit: usize) -> Self {
            Self {
                pos: 0,
                report: Report::default(),
                step_limit,
            }
        }
    }

    impl Environment for MockEnv {
        type State = usize;
        type Action = usize;

        fn step(&mut self, action: Self::Action) -> (Self::State, f64, bool) {
            if action == 1 {
                self.pos += 1;
            }
            let reward = if self.pos == LEN - 1 { 1.0 } else { -0.1 };
            if self.pos == LEN - 1 {
                self.report.score += 1;
            }
            self.report.steps += 1;
            self.report.total_reward += reward;
            let done = self.pos == LEN - 1 || self.report.steps >= self.step_limit;
            (self.pos, reward, done)
        }

        fn reset(&mut self) -> Self::State {
            self.pos = 0;
            self.report = Report::default();
            self.pos
        }

        fn report(&self) -> Report {
            self.report
        }
    }

    impl DiscreteSpace for MockEnv {
        fn num_states(&self) -> usize {
            LEN
        }

        fn num_actions(&self) -> usize {
            2
        }
    }

    #[test]
    fn report_avg_reward() {
        let report = Report {
            score: 2,
            steps: 4,
            total_reward: 10.0,
        };
        assert_eq!(report.avg_reward(), 2.5);
        assert_eq!(Report::default().avg_reward(), 0.0, "no steps taken");
    }

    #[test]
    fn mock_env_functional() {
        let mut env = MockEnv::new(10);
        assert_eq!(env.reset(), 0);
        assert_eq!(env.step(0), (0, -0.1, false), "stay");
        assert_eq!(env.step(1), (1, -0.1, false), "move");
        env.step(1);
        let (state, reward, done) = env.step(1);
        assert_eq!((state, reward, done), (3, 1.0, true), "goal reached");
        assert_eq!(env.report().score, 1);
        assert_eq!(env.report().steps, 4);
    }
}
