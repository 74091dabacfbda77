use serde::{Deserialize, Serialize};

/// Explicit engine configuration, passed in at construction time rather than
/// read from the environment so engine output stays a pure function of its
/// inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Treat `pending` catalog programs as matchable.
    pub include_pending_programs: bool,
    /// Resolve mutual-exclusivity pairs after pricing.
    pub apply_stacking_rules: bool,
    /// Replace every program's base confidence; clamped to `[0, 1]`.
    pub confidence_override: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_pending_programs: false,
            apply_stacking_rules: true,
            confidence_override: None,
        }
    }
}
