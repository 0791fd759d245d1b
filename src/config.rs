// ABOUTME: Tuning knobs bounding pathological input to the resolver

/// Bounds recursion depth and variable-history length during resolution
/// (§5: "implementations should enforce a configurable maximum recursion
/// depth and maximum history length to bound pathological inputs").
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_recursion_depth: usize,
    pub max_history_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_recursion_depth: 512,
            max_history_length: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative_but_nonzero() {
        let cfg = EngineConfig::default();
        assert!(cfg.max_recursion_depth > 0);
        assert!(cfg.max_history_length > 0);
    }
}
