pub mod forecast;
pub mod heuristic_routine;
pub mod materiality;
pub mod quantitative;
pub mod routine;
pub mod strategic;

/// Key for the two sides of a presence/absence hypothesis pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Is,
    IsNot,
}

/// Threshold gates are inclusive: a score equal to the threshold passes.
pub fn passes(score: f64, threshold: f64) -> bool {
    score >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_gate_inclusive() {
        assert!(passes(0.85, 0.85));
        assert!(passes(0.6, 0.6));
        assert!(passes(0.5, 0.5));
        assert!(!passes(0.8499, 0.85));
        assert!(passes(17.0 / 20.0, 0.85));
    }
}
