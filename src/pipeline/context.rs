//! Validated synthesis inputs

use crate::build::{BuildSecrets, OrderedVars};
use crate::config::{DeployTarget, PipelineInput};
use crate::validation::{
    check_build_variables, parse_image_repository_name, parse_repository, parse_resource_name,
    parse_stage, DeploymentStage, RepositoryReference, ValidationError,
};
use tracing::debug;

/// Pipeline input that passed validation but has no deploy target yet
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub name: String,
    pub stage: DeploymentStage,
    pub repository: RepositoryReference,
    pub image_repository_name: String,
    pub additional_env: OrderedVars,
    pub secrets: BuildSecrets,
}

impl ValidatedInput {
    /// Validates `input` in field order: stage, repository, names, then build variables.
    pub fn from_input(input: &PipelineInput) -> Result<Self, ValidationError> {
        let stage = parse_stage(&input.stage)?;
        let repository = parse_repository(&input.repository)?;

        let base = match input.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => parse_resource_name("name", name)?,
            None => repository.repo().to_lowercase(),
        };
        let name = format!("{}-{}", base, stage);
        let image_repository_name = parse_image_repository_name(
            &input
                .image_repository
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| name.to_lowercase()),
        )?;

        let additional_env = input.additional_build_env.clone().unwrap_or_default();
        let secrets = input.additional_build_secrets.clone().unwrap_or_default();
        check_build_variables(&additional_env, &secrets)?;

        debug!(
            repository = %repository.name(),
            stage = %stage,
            "Validated pipeline input"
        );

        Ok(Self {
            name,
            stage,
            repository,
            image_repository_name,
            additional_env,
            secrets: BuildSecrets::new(secrets),
        })
    }
}

/// Everything the assembler needs, already validated and normalized
#[derive(Debug, Clone)]
pub struct SynthContext {
    pub name: String,
    pub stage: DeploymentStage,
    pub repository: RepositoryReference,
    pub image_repository_name: String,
    pub additional_env: OrderedVars,
    pub secrets: BuildSecrets,
    pub target: DeployTarget,
}

impl SynthContext {
    /// Validates `input` and fails before anything is defined if it is malformed.
    pub fn from_input(input: &PipelineInput, target: DeployTarget) -> Result<Self, ValidationError> {
        Ok(Self::from_validated(ValidatedInput::from_input(input)?, target))
    }

    pub fn from_validated(input: ValidatedInput, target: DeployTarget) -> Self {
        Self {
            name: input.name,
            stage: input.stage,
            repository: input.repository,
            image_repository_name: input.image_repository_name,
            additional_env: input.additional_env,
            secrets: input.secrets,
            target,
        }
    }

    pub fn new(stage: DeploymentStage, repository: RepositoryReference, target: DeployTarget) -> Self {
        let name = format!("{}-{}", repository.repo().to_lowercase(), stage);
        Self {
            image_repository_name: name.clone(),
            name,
            stage,
            repository,
            additional_env: OrderedVars::new(),
            secrets: BuildSecrets::default(),
            target,
        }
    }

    pub fn with_additional_env(mut self, env: OrderedVars) -> Self {
        self.additional_env = env;
        self
    }

    pub fn with_secrets(mut self, secrets: OrderedVars) -> Self {
        self.secrets = BuildSecrets::new(secrets);
        self
    }
}
