use serde::{Deserialize, Serialize};

/// Configuration for the key usage gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// When `true`, a key's default does not satisfy the check; every key of
    /// the definition needs a stored value.
    pub defaults_disabled: bool,
    /// Stop at the first failing check instead of collecting all of them.
    pub fail_fast: bool,
}

impl GateConfig {
    /// Require explicit values for every key.
    pub fn strict() -> Self {
        Self {
            defaults_disabled: true,
            ..Default::default()
        }
    }
}
