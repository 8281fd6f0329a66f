//! Configuration management for ecrpipe
//!
//! Two sources feed a synthesis run:
//!
//! - the pipeline input file (YAML) describing the repository, stage and any
//!   additional build variables or secrets, see [`PipelineInput`];
//! - the process environment, which supplies the target account and region
//!   when the input file does not, see [`EcrpipeConfig`].
//!
//! # Environment Variables
//!
//! - `ECRPIPE_ACCOUNT`, then `CDK_DEPLOY_ACCOUNT`, then `CDK_DEFAULT_ACCOUNT`:
//!   target account id
//! - `ECRPIPE_REGION`, then `CDK_DEPLOY_REGION`, then `CDK_DEFAULT_REGION`:
//!   target region
//! - `ECRPIPE_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use ecrpipe::config::{EcrpipeConfig, PipelineInput};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let input = PipelineInput::from_file(Path::new("pipeline.yaml"))?;
//! let target = EcrpipeConfig::default().resolve_target(input.env.as_ref())?;
//! println!("{} in {}", target.account, target.region);
//! # Ok(())
//! # }
//! ```

use crate::build::OrderedVars;
use crate::validation::RawRepository;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const ACCOUNT_VARS: &[&str] = &["ECRPIPE_ACCOUNT", "CDK_DEPLOY_ACCOUNT", "CDK_DEFAULT_ACCOUNT"];
const REGION_VARS: &[&str] = &["ECRPIPE_REGION", "CDK_DEPLOY_REGION", "CDK_DEFAULT_REGION"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pipeline input: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Target {field} not specified. Set it under `env` in the input file or via {vars}")]
    MissingTarget { field: &'static str, vars: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Pipeline input file contents, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineInput {
    /// Prefix for generated resource names; defaults to the repository name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub repository: RawRepository,
    /// Name of the output image repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_build_env: Option<OrderedVars>,
    /// Variable name -> secret store identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_build_secrets: Option<OrderedVars>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<TargetOverride>,
}

impl PipelineInput {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }
}

/// Account/region as written in the input file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Resolved account and region the pipeline is defined in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployTarget {
    pub account: String,
    pub region: String,
}

impl DeployTarget {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// Checks that:
    /// - the account id is 12 digits
    /// - the region is non-empty and contains no whitespace
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.len() != 12 || !self.account.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Account id must be 12 digits, got {:?}",
                self.account
            )));
        }
        if self.region.is_empty() || self.region.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid region: {:?}",
                self.region
            )));
        }
        Ok(())
    }
}

/// Process-level configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct EcrpipeConfig {
    pub account: Option<String>,
    pub region: Option<String>,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|name| env::var(name).ok())
        .find(|v| !v.is_empty())
}

impl Default for EcrpipeConfig {
    /// Loads from environment variables with defaults
    fn default() -> Self {
        let log_level = env::var("ECRPIPE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            account: first_env(ACCOUNT_VARS),
            region: first_env(REGION_VARS),
            log_level,
        }
    }
}

impl EcrpipeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }

    /// Picks account and region, preferring the input file over the environment.
    pub fn resolve_target(
        &self,
        file: Option<&TargetOverride>,
    ) -> Result<DeployTarget, ConfigError> {
        let file_account = file.and_then(|t| t.account.clone());
        let file_region = file.and_then(|t| t.region.clone());

        let account = file_account
            .filter(|v| !v.is_empty())
            .or_else(|| self.account.clone())
            .ok_or_else(|| ConfigError::MissingTarget {
                field: "account",
                vars: ACCOUNT_VARS.join(", "),
            })?;
        let region = file_region
            .filter(|v| !v.is_empty())
            .or_else(|| self.region.clone())
            .ok_or_else(|| ConfigError::MissingTarget {
                field: "region",
                vars: REGION_VARS.join(", "),
            })?;

        let target = DeployTarget::new(account, region);
        target.validate()?;
        Ok(target)
    }
}
