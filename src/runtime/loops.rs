//! Cycle protection for one run.

use std::collections::HashMap;

use crate::utils;

/// Verdict on whether a node may be visited again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopDecision {
    pub allowed: bool,
    pub iteration: u32,
}

#[derive(Debug, Clone)]
struct LoopState {
    iteration_count: u32,
    last_visit: i64,
}

/// Per-run visit counter keyed by node id.
///
/// Owned by the run's `ExecutionState` and passed through the traversal, so
/// its memory is released with the run. A node counts as looping once the
/// execution path already holds `limit` occurrences of it; the counter keeps
/// tracking visits below that threshold as well.
#[derive(Debug, Clone)]
pub struct LoopController {
    limit: u32,
    counters: HashMap<String, LoopState>,
}

impl LoopController {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counters: HashMap::new(),
        }
    }

    /// True once the path already holds `limit` occurrences of the node.
    pub fn check_loop(
        &self,
        node_id: &str,
        execution_path: &[String],
    ) -> bool {
        let occurrences = execution_path.iter().filter(|id| id.as_str() == node_id).count() as u32;
        occurrences >= self.limit
    }

    /// Bump the visit counter for a node, returning the new count.
    pub fn increment(
        &mut self,
        node_id: &str,
    ) -> u32 {
        let state = self.counters.entry(node_id.to_string()).or_insert(LoopState {
            iteration_count: 0,
            last_visit: 0,
        });
        state.iteration_count += 1;
        state.last_visit = utils::time::time_millis();
        state.iteration_count
    }

    pub fn limit_reached(
        &self,
        node_id: &str,
    ) -> bool {
        self.counters.get(node_id).map(|s| s.iteration_count >= self.limit).unwrap_or(false)
    }

    /// Count a visit and decide whether the traversal may continue into the
    /// node given the path walked so far.
    pub fn detect(
        &mut self,
        node_id: &str,
        execution_path: &[String],
    ) -> LoopDecision {
        let looping = self.check_loop(node_id, execution_path);
        let iteration = self.increment(node_id);

        if looping && self.limit_reached(node_id) {
            return LoopDecision {
                allowed: false,
                iteration,
            };
        }

        LoopDecision {
            allowed: true,
            iteration,
        }
    }

    /// Release all per-node state of the run.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visit_allowed() {
        let mut loops = LoopController::new(100);
        let decision = loops.detect("a", &[]);
        assert!(decision.allowed);
        assert_eq!(decision.iteration, 1);
    }

    #[test]
    fn test_visits_below_limit_allowed() {
        let mut loops = LoopController::new(3);
        let mut path: Vec<String> = Vec::new();
        for i in 1..=3 {
            let decision = loops.detect("a", &path);
            assert!(decision.allowed, "visit {} should be allowed", i);
            path.push("a".to_string());
        }
    }

    #[test]
    fn test_rejected_once_path_reaches_limit() {
        let mut loops = LoopController::new(3);
        let path = vec!["a".to_string(); 3];
        loops.increment("a");
        loops.increment("a");
        loops.increment("a");

        let decision = loops.detect("a", &path);
        assert!(!decision.allowed);
        assert_eq!(decision.iteration, 4);
    }

    #[test]
    fn test_counters_are_per_node() {
        let mut loops = LoopController::new(2);
        loops.detect("a", &[]);
        let decision = loops.detect("b", &["a".to_string()]);
        assert!(decision.allowed);
        assert_eq!(decision.iteration, 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut loops = LoopController::new(2);
        loops.increment("a");
        loops.increment("a");
        assert!(loops.limit_reached("a"));

        loops.reset();
        assert!(!loops.limit_reached("a"));
    }
}
