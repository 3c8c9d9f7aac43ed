use rand::{thread_rng, Rng};

use crate::decay::Decay;

use super::Choice;

/// Epsilon greedy exploration policy with a decaying epsilon threshold
///
/// Epsilon starts at the decay strategy's initial value and moves one tick each
/// time [`EpsilonGreedy::decay`] is called, so it tracks learning updates rather
/// than episodes.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    schedule: D,
    epsilon: f64,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(schedule: D) -> Self {
        let epsilon = schedule.start();
        Self { schedule, epsilon }
    }

    /// Current probability of exploring
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Explore with probability epsilon, otherwise exploit
    pub fn choose(&self) -> Choice {
        if thread_rng().gen::<f64>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Advance the schedule by one tick
    pub fn decay(&mut self) {
        self.epsilon = self.schedule.next(self.epsilon);
    }
}

#[cfg(test)]
mod tests {
    use crate::decay::{Constant, Geometric};

    use super::*;

    #[test]
    fn epsilon_decays_to_floor() {
        let mut policy = EpsilonGreedy::new(Geometric::new(0.5, 1.0, 0.2).unwrap());
        assert_eq!(policy.epsilon(), 1.0, "starts at initial value");
        policy.decay();
        assert_eq!(policy.epsilon(), 0.5);
        policy.decay();
        policy.decay();
        assert_eq!(policy.epsilon(), 0.2, "never drops below the floor");
    }

    #[test]
    fn extreme_epsilons_are_deterministic() {
        let always = EpsilonGreedy::new(Constant::new(1.0));
        let never = EpsilonGreedy::new(Constant::new(0.0));
        for _ in 0..1000 {
            assert_eq!(always.choose(), Choice::Explore);
            assert_eq!(never.choose(), Choice::Exploit);
        }
    }
}
