//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use crate::load_balancer::Selector;

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for RoundRobin {
    fn next_index(&self, len: usize) -> usize {
        // fetch_add wraps on overflow, so the counter itself never panics.
        self.counter.fetch_add(1, Ordering::Relaxed) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let rr = RoundRobin::new();

        assert_eq!(rr.next_index(3), 0);
        assert_eq!(rr.next_index(3), 1);
        assert_eq!(rr.next_index(3), 2);
        assert_eq!(rr.next_index(3), 0);
    }

    #[test]
    fn single_slot_always_zero() {
        let rr = RoundRobin::new();
        for _ in 0..10 {
            assert_eq!(rr.next_index(1), 0);
        }
    }

    #[test]
    fn counter_wraps_without_leaving_range() {
        let rr = RoundRobin {
            counter: AtomicUsize::new(usize::MAX),
        };
        assert_eq!(rr.next_index(4), usize::MAX % 4);
        assert_eq!(rr.next_index(4), 0);
        assert_eq!(rr.next_index(4), 1);
    }
}
