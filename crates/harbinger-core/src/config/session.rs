//! Session marker configuration.

use serde::{Deserialize, Serialize};

/// Settings for the advisory session markers swept at logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// COUNT hint passed to each cursor round trip of the logout sweep.
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_batch_size: default_sweep_batch_size(),
        }
    }
}

fn default_sweep_batch_size() -> usize {
    100
}
