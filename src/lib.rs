//! ecrpipe - two-stage source-to-image pipeline synthesizer
//!
//! Reads a small deployment description (stage, GitHub repository, optional
//! build environment and build secrets) and produces a pipeline definition:
//! a webhook-triggered source stage feeding a privileged build stage that
//! builds a container image and pushes it to an image repository under two
//! tags (`latest` and the 7-character commit hash).
//!
//! Secret values never appear in the synthesized output. Build secrets are
//! carried by reference and fetched at build time.
//!
//! # Example
//!
//! ```
//! use ecrpipe::config::{DeployTarget, PipelineInput};
//! use ecrpipe::synthesize;
//!
//! let input = PipelineInput::from_yaml_str(
//!     r#"
//! stage: dev
//! repository:
//!   name: Org/Repo
//!   secret: github-token
//! additional_build_secrets:
//!   API_KEY: secret-1
//! "#,
//! )
//! .unwrap();
//!
//! let pipeline = synthesize(&input, DeployTarget::new("123456789012", "us-east-1")).unwrap();
//! assert_eq!(pipeline.stages.len(), 2);
//! assert!(pipeline
//!     .build_spec()
//!     .commands()
//!     .any(|c| c.contains(r#"--build-arg=API_KEY="$API_KEY""#)));
//! ```
//!
//! # Project Structure
//!
//! - [`validation`]: input parsing and build-project checks
//! - [`build`]: build environment, secret forwarding and build-spec generation
//! - [`pipeline`]: pipeline assembly
//! - [`output`]: the build-spec document schema
//! - [`cli`]: command-line surface

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod util;
pub mod validation;

pub use config::{ConfigError, DeployTarget, EcrpipeConfig, PipelineInput};
pub use error::SynthError;
pub use output::BuildSpec;
pub use pipeline::{synthesize, PipelineAssembler, PipelineDefinition, SynthContext};
pub use util::{config_from_env, init_logging, LoggingConfig};
pub use validation::{DeploymentStage, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
