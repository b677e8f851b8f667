//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod providers;
mod run;

pub use output::{DEFAULT_DATA_DIR, FileOutputConfig, FileOutputFormat};
pub use providers::{FileProviderConfig, FileProvidersConfig};
pub use run::FileRunConfig;

use consensus_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Run defaults
    pub run: FileRunConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Model id → provider
    pub providers: FileProvidersConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks empty model names, a zero timeout, command providers without a
    /// program, and a default judge that no provider serves.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for model in &self.run.models {
            if model.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "run.models".to_string(),
                    },
                    "run.models: model name cannot be empty in list",
                ));
            }
        }

        if let Some(judge) = &self.run.judge {
            if judge.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "run.judge".to_string(),
                    },
                    "run.judge: model name cannot be empty",
                ));
            } else if !self.providers.is_empty() && !self.providers.contains_key(judge) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::JudgeNotConfigured {
                        model: judge.clone(),
                    },
                    format!("run.judge: no [providers.{}] entry for the judge", judge),
                ));
            }
        }

        if self.run.timeout_secs == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "run.timeout_secs cannot be 0",
            ));
        }

        for (model, provider) in &self.providers {
            if let FileProviderConfig::Command { command, .. } = provider {
                let program_missing = command.first().is_none_or(|p| p.trim().is_empty());
                if program_missing {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::EmptyCommand {
                            model: model.clone(),
                        },
                        format!("providers.{}: command cannot be empty", model),
                    ));
                }
            }
        }

        issues
    }

    /// Split [`validate`](Self::validate) into a hard failure (any error)
    /// or the remaining warnings.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(
                errors.into_iter().map(|issue| issue.message).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[run]
models = ["gpt", "claude"]
judge = "gpt"
timeout_secs = 60

[output]
format = "consensus"
data_dir = "runs"
save = false

[providers.gpt]
kind = "command"
command = ["llm", "-m", "gpt-4o"]
provider = "openai"

[providers.claude]
kind = "static"
response = "hi"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.models, vec!["gpt", "claude"]);
        assert_eq!(config.run.judge.as_deref(), Some("gpt"));
        assert_eq!(config.run.timeout_secs, Some(60));
        assert_eq!(config.output.format, Some(OutputFormat::Consensus));
        assert_eq!(config.output.data_dir, PathBuf::from("runs"));
        assert!(!config.output.save);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers["gpt"].kind(), "command");
        assert_eq!(config.providers["claude"].kind(), "static");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[run]
judge = "gpt"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.run.models.is_empty());
        assert!(config.output.save);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert!(config.check().unwrap().is_empty());
    }

    #[test]
    fn test_validate_empty_model_name() {
        let mut config = FileConfig::default();
        config.run.models = vec!["gpt".to_string(), "  ".to_string()];

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::EmptyModelName { ref field } if field == "run.models"
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.run.timeout_secs = Some(0);

        let err = config.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: run.timeout_secs cannot be 0"
        );
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = FileConfig::default();
        config.providers.insert(
            "gpt".to_string(),
            FileProviderConfig::Command {
                command: vec![],
                provider: None,
                env: Default::default(),
            },
        );

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::EmptyCommand {
                model: "gpt".to_string()
            }
        );
    }

    #[test]
    fn test_unconfigured_judge_is_only_a_warning() {
        let mut config = FileConfig::default();
        config.run.judge = Some("judge".to_string());
        config.providers.insert(
            "gpt".to_string(),
            FileProviderConfig::Static {
                response: "x".to_string(),
                provider: None,
                delay_ms: None,
            },
        );

        let warnings = config.check().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].is_error());
    }
}
