// Uniform random action selection, the perception-free variant.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::action::Action;
use crate::capture::Frame;
use crate::error::PilotResult;
use crate::policy::Policy;

/// Picks one of the four actions uniformly at random each tick.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, _frame: Option<&Frame>) -> PilotResult<Option<Action>> {
        let index = self.rng.gen_range(0..Action::ALL.len());
        Ok(Action::from_index(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_policy_is_deterministic() {
        let mut a = RandomPolicy::with_seed(7);
        let mut b = RandomPolicy::with_seed(7);
        for _ in 0..64 {
            assert_eq!(a.decide(None).unwrap(), b.decide(None).unwrap());
        }
    }

    #[test]
    fn always_yields_an_action() {
        let mut policy = RandomPolicy::with_seed(42);
        for _ in 0..256 {
            assert!(policy.decide(None).unwrap().is_some());
        }
    }

    #[test]
    fn covers_the_whole_action_set() {
        let mut policy = RandomPolicy::with_seed(1);
        let mut seen = [false; 4];
        for _ in 0..256 {
            let action = policy.decide(None).unwrap().unwrap();
            seen[action.index()] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn never_wants_frames() {
        let policy = RandomPolicy::with_seed(0);
        assert!(!policy.wants_frames());
        assert_eq!(policy.name(), "random");
    }
}
