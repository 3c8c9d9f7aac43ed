use rand::{thread_rng, Rng};
use rand_distr::{Distribution, Uniform};

use crate::{
    agent::Agent,
    assert_interval,
    decay::{self, Decay},
    env::{DiscreteSpace, Environment},
    exploration::{Choice, EpsilonGreedy},
    exp::Exp,
    util::{argmax, max_value},
};

/// Half-width of the uniform noise the table is seeded with
const INIT_NOISE: f64 = 0.01;

/// Configuration for the [`QTableAgent`]
pub struct QTableAgentConfig<D: Decay = decay::Geometric> {
    /// Exploration policy
    ///
    /// **Default**: [`Geometric`](decay::Geometric) decay from `0.9` to `0.05` at a rate of `0.996` per update
    pub exploration: EpsilonGreedy<D>,
    /// Learning rate
    ///
    /// **Default**: `0.3`
    pub alpha: f64,
    /// Discount factor
    ///
    /// **Default**: `0.99`
    pub gamma: f64,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Geometric::default()),
            alpha: 0.3,
            gamma: 0.99,
        }
    }
}

/// A Q-learning agent backed by a dense state × action table
///
/// The table is a flat `Vec` indexed by `state * num_actions + action` and is
/// never resized. It is seeded with small uniform noise so that greedy
/// selection has no systematic bias towards low action indices before learning.
pub struct QTableAgent<D: Decay = decay::Geometric> {
    q_table: Vec<f64>,
    num_states: usize,
    num_actions: usize,
    exploration: EpsilonGreedy<D>,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
}

impl<D: Decay> QTableAgent<D> {
    /// Initialize a new `QTableAgent` with a table of `num_states` × `num_actions` values
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`, or if either dimension is zero
    pub fn new(num_states: usize, num_actions: usize, config: QTableAgentConfig<D>) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        assert!(
            num_states > 0 && num_actions > 0,
            "Q-table dimensions must be non-zero"
        );

        let noise = Uniform::new_inclusive(-INIT_NOISE, INIT_NOISE);
        let mut rng = thread_rng();
        let q_table = (0..num_states * num_actions)
            .map(|_| noise.sample(&mut rng))
            .collect();

        Self {
            q_table,
            num_states,
            num_actions,
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
        }
    }

    /// Initialize a new `QTableAgent` sized for a discrete environment
    pub fn for_env<E: DiscreteSpace>(env: &E, config: QTableAgentConfig<D>) -> Self {
        Self::new(env.num_states(), env.num_actions(), config)
    }

    /// Action values for a single state
    pub fn q_values(&self, state: usize) -> &[f64] {
        let start = state * self.num_actions;
        &self.q_table[start..start + self.num_actions]
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    #[cfg(test)]
    pub(crate) fn fill(&mut self, value: f64) {
        self.q_table.fill(value);
    }

    fn index(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.num_states && action < self.num_actions,
            "State-action pair ({state}, {action}) is outside the {}x{} table",
            self.num_states,
            self.num_actions,
        );
        state * self.num_actions + action
    }

    /// Choose an action based on the current state and exploration policy
    pub fn choose_action(&self, state: usize) -> usize {
        match self.exploration.choose() {
            Choice::Explore => thread_rng().gen_range(0..self.num_actions),
            Choice::Exploit => self.best_action(state),
        }
    }

    /// Greedy action for `state`; ties go to the lowest action index
    pub fn best_action(&self, state: usize) -> usize {
        argmax(self.q_values(state))
    }

    /// One-step Q-learning backup followed by a single exploration decay tick
    ///
    /// Q(s,a) ← Q(s,a) + α(target - Q(s,a)), where target = r if the transition
    /// is terminal and r + γ max<sub>a'</sub> Q(s',a') otherwise
    pub fn update(
        &mut self,
        state: usize,
        action: usize,
        reward: f64,
        next_state: usize,
        done: bool,
    ) {
        let ix = self.index(state, action);
        let target = if done {
            reward
        } else {
            reward + self.gamma * max_value(self.q_values(next_state))
        };

        let q_value = self.q_table[ix];
        self.q_table[ix] = q_value + self.alpha * (target - q_value);

        self.exploration.decay();
    }
}

impl<E, D> Agent<E> for QTableAgent<D>
where
    E: Environment<State = usize, Action = usize>,
    D: Decay,
{
    fn act(&self, state: &usize) -> usize {
        self.choose_action(*state)
    }

    fn act_greedy(&self, state: &usize) -> usize {
        self.best_action(*state)
    }

    fn learn(&mut self, exp: Exp<E>) {
        let Exp {
            state,
            action,
            reward,
            next_state,
            done,
        } = exp;
        self.update(state, action, reward, next_state, done);
    }

    fn exploration_rate(&self) -> f64 {
        self.epsilon()
    }
}

#[cfg(test)]
mod tests {
    use statrs::statistics::Statistics;

    use crate::{decay::Constant, env::tests::MockEnv};

    use super::*;

    fn greedy_agent(num_states: usize, num_actions: usize) -> QTableAgent<Constant> {
        QTableAgent::new(
            num_states,
            num_actions,
            QTableAgentConfig {
                exploration: EpsilonGreedy::new(Constant::new(0.0)),
                alpha: 0.3,
                gamma: 0.99,
            },
        )
    }

    #[test]
    fn table_initialized_with_small_noise() {
        let agent = QTableAgent::new(200, 8, QTableAgentConfig::default());
        assert_eq!(agent.q_table.len(), 1600, "dense 200x8 table");
        assert!(
            agent.q_table.iter().all(|q| q.abs() <= INIT_NOISE),
            "noise within bounds"
        );
        assert!(
            agent.q_table.iter().any(|&q| q != agent.q_table[0]),
            "values are not all equal"
        );
    }

    #[test]
    fn update_is_exact_bellman_backup() {
        let mut agent = greedy_agent(4, 3);
        // rows of 3: state 1 starts at 3, state 2 at 6
        agent.q_table = vec![0.0; 12];
        agent.q_table[6] = 0.5;
        agent.q_table[7] = 2.0;
        agent.q_table[5] = 1.0;

        agent.update(1, 2, 3.0, 2, false);

        let expected = 1.0 + 0.3 * (3.0 + 0.99 * 2.0 - 1.0);
        assert!(
            (agent.q_values(1)[2] - expected).abs() < 1e-12,
            "updated value matches backup"
        );
        assert_eq!(agent.q_values(2), [0.5, 2.0, 0.0], "other rows untouched");
    }

    #[test]
    fn terminal_update_ignores_next_state() {
        let mut agent = greedy_agent(2, 2);
        agent.q_table = vec![0.0, 0.0, 50.0, 50.0];

        agent.update(0, 1, 10.0, 1, true);

        assert!((agent.q_values(0)[1] - 3.0).abs() < 1e-12, "target is the reward alone");
    }

    #[test]
    fn exploration_rate_is_non_increasing_and_floored() {
        let config = QTableAgentConfig {
            exploration: EpsilonGreedy::new(decay::Geometric::new(0.9, 0.9, 0.05).unwrap()),
            ..Default::default()
        };
        let mut agent = QTableAgent::new(3, 2, config);
        let mut previous = agent.epsilon();
        assert_eq!(previous, 0.9, "starts at initial value");

        for i in 0..200 {
            let reward = if i % 2 == 0 { 5.0 } else { -5.0 };
            agent.update(i % 3, i % 2, reward, (i + 1) % 3, i % 7 == 0);
            assert!(agent.epsilon() <= previous, "never increases");
            assert!(agent.epsilon() >= 0.05, "never below the floor");
            previous = agent.epsilon();
        }
        assert_eq!(agent.epsilon(), 0.05, "reaches the floor");
    }

    #[test]
    fn greedy_choice_breaks_ties_on_lowest_index() {
        let mut agent = greedy_agent(1, 4);
        agent.q_table = vec![0.1, 0.7, 0.7, -1.0];
        for _ in 0..100 {
            assert_eq!(agent.choose_action(0), 1, "exploits first maximum");
        }
    }

    #[test]
    fn random_actions_cover_action_space() {
        let config = QTableAgentConfig {
            exploration: EpsilonGreedy::new(Constant::new(1.0)),
            alpha: 0.3,
            gamma: 0.99,
        };
        let agent = QTableAgent::new(1, 8, config);
        let actions = (0..10_000)
            .map(|_| agent.choose_action(0))
            .collect::<Vec<_>>();

        assert!(actions.iter().all(|&a| a < 8), "actions in range");
        for a in 0..8 {
            assert!(actions.contains(&a), "action {a} is sampled");
        }
        let mean = actions.iter().map(|&a| a as f64).mean();
        assert!((mean - 3.5).abs() < 0.3, "uniform mean, got {mean}");
    }

    #[test]
    fn agent_trait_routes_through_table() {
        let env = MockEnv::new(10);
        let mut agent = QTableAgent::for_env(
            &env,
            QTableAgentConfig {
                exploration: EpsilonGreedy::new(Constant::new(0.0)),
                alpha: 1.0,
                gamma: 0.0,
            },
        );
        assert_eq!((agent.num_states(), agent.num_actions()), (4, 2));

        Agent::<MockEnv>::learn(
            &mut agent,
            Exp {
                state: 0,
                action: 0,
                reward: 5.0,
                next_state: 0,
                done: false,
            },
        );
        assert_eq!(agent.q_values(0)[0], 5.0, "alpha 1 overwrites");
        assert_eq!(Agent::<MockEnv>::act_greedy(&agent, &0), 0);
        assert_eq!(Agent::<MockEnv>::exploration_rate(&agent), 0.0);
    }

    #[test]
    #[should_panic(expected = "Invalid value for `config.gamma`")]
    fn rejects_invalid_discount() {
        let config = QTableAgentConfig {
            gamma: 1.5,
            ..Default::default()
        };
        QTableAgent::new(2, 2, config);
    }

    #[test]
    #[should_panic(expected = "outside the")]
    fn rejects_out_of_range_update() {
        let mut agent = greedy_agent(2, 2);
        agent.update(0, 2, 1.0, 1, false);
    }
}
