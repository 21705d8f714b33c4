use serde::{Deserialize, Serialize};

/// Tunable tolerance used by near-tangent split classification and by
/// the portal sweep's tie-break band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub epsilon: f64,
}

impl Config {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { epsilon: 0.0625 }
    }
}
