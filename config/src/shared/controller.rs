use serde::{Deserialize, Serialize};

use crate::load::Config;
use crate::shared::{AdminConnectionConfig, PauseRetryConfig, ValidationError};

/// Top level configuration of the pooler controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControllerConfig {
    /// How to reach the pooler's administrative console.
    #[serde(default)]
    pub admin: AdminConnectionConfig,
    /// Retry budget of the pause command.
    #[serde(default)]
    pub pause_retry: PauseRetryConfig,
}

impl Config for ControllerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.admin.validate()?;
        self.pause_retry.validate()
    }
}
