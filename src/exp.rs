use crate::env::Environment;

/// Represents a single experience or transition in the environment
pub struct Exp<E: Environment> {
    /// The state of the environment before taking the action
    pub state: E::State,
    /// The action taken in the given state
    pub action: E::Action,
    /// The reward received after taking the action
    pub reward: f64,
    /// The state of the environment after the action is taken
    pub next_state: E::State,
    /// Whether the action ended the episode
    pub done: bool,
}

impl<E: Environment> Clone for Exp<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            action: self.action.clone(),
            reward: self.reward,
            next_state: self.next_state.clone(),
            done: self.done,
        }
    }
}
