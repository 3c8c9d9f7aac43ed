use crate::{env::Environment, exp::Exp};

/// A learning agent acting in an [`Environment`]
pub trait Agent<E>
where
    E: Environment,
{
    /// Choose an action for `state` under the agent's exploration policy
    fn act(&self, state: &E::State) -> E::Action;

    /// Choose the best known action for `state`, never exploring
    fn act_greedy(&self, state: &E::State) -> E::Action;

    /// Update the agent from a single transition
    fn learn(&mut self, exp: Exp<E>);

    /// Current probability of taking an exploratory action
    fn exploration_rate(&self) -> f64;
}
