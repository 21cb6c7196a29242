use crate::core::reputation::ReputationPolicy;
use crate::utils::error::{InteractionError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reputation: ReputationPolicy,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Attempts per operation before a version conflict is reported.
    pub max_retries: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
            verbose: false,
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InteractionError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InteractionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown names stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            InteractionError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_retries(&self) -> u32 {
        self.concurrency.max_retries
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_ascending(
            "reputation",
            &[
                ("vote", self.reputation.vote),
                ("comment", self.reputation.comment),
                ("edit_others", self.reputation.edit_others),
            ],
        )?;
        validation::validate_range("concurrency.max_retries", self.concurrency.max_retries, 1, 10)?;
        validation::validate_log_format("logging.format", &self.logging.format)?;
        Ok(())
    }
}
