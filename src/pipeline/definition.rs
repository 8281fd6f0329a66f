//! Pipeline definition data structures
//!
//! A [`PipelineDefinition`] describes a pipeline; it carries no execution
//! state. Everything here is built once by the assembler and never mutated.

use crate::build::{BuildEnvironment, BuildSecrets};
use crate::output::schema::BuildSpec;
use crate::validation::{CredentialRef, DeploymentStage};
use serde::Serialize;
use std::fmt;

pub const SOURCE_STAGE: &str = "source";
pub const BUILD_STAGE: &str = "build";
pub const SOURCE_ARTIFACT: &str = "source_output";

pub const DEFAULT_BUILD_IMAGE: &str = "aws/codebuild/standard:5.0";
pub const DEFAULT_COMPUTE_TYPE: &str = "BUILD_GENERAL1_SMALL";

const PULL_ACTIONS: &[&str] = &[
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
];
const PUSH_ACTIONS: &[&str] = &[
    "ecr:PutImage",
    "ecr:InitiateLayerUpload",
    "ecr:UploadLayerPart",
    "ecr:CompleteLayerUpload",
];
const AUTH_TOKEN_ACTION: &str = "ecr:GetAuthorizationToken";

#[derive(Debug, Clone, Serialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub stage: DeploymentStage,
    pub stages: Vec<PipelineStage>,
    pub build_project: BuildProject,
    /// Durable output of the pipeline; handed to downstream consumers
    pub image_repository: ImageRepository,
    pub grants: Vec<Grant>,
}

impl PipelineDefinition {
    pub fn stage_named(&self, name: &str) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn output_image_repository(&self) -> &ImageRepository {
        &self.image_repository
    }

    pub fn build_spec(&self) -> &BuildSpec {
        &self.build_project.build_spec
    }

    /// Grants held by `principal` on `resource`
    pub fn grants_for<'a>(
        &'a self,
        principal: &'a Principal,
        resource: &'a str,
    ) -> impl Iterator<Item = &'a Grant> {
        self.grants
            .iter()
            .filter(move |g| &g.principal == principal && g.resource == resource)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStage {
    pub name: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    GithubSource(SourceAction),
    CodeBuild(BuildAction),
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Action::GithubSource(a) => &a.name,
            Action::CodeBuild(a) => &a.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTrigger {
    /// Triggered by a webhook on each commit to the branch
    Webhook,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceAction {
    pub name: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub oauth_token: CredentialRef,
    pub trigger: SourceTrigger,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildAction {
    pub name: String,
    pub project: String,
    pub input: String,
    pub outputs: Vec<String>,
}

/// Execution identity of the build project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn role(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectEnvironment {
    pub build_image: String,
    pub compute_type: String,
    /// Required to run docker inside the build
    pub privileged: bool,
    /// Persisted project variables; plain values only
    pub variables: BuildEnvironment,
}

impl ProjectEnvironment {
    pub fn new(variables: BuildEnvironment) -> Self {
        Self {
            build_image: DEFAULT_BUILD_IMAGE.to_string(),
            compute_type: DEFAULT_COMPUTE_TYPE.to_string(),
            privileged: true,
            variables,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildProject {
    pub name: String,
    pub role: Principal,
    pub environment: ProjectEnvironment,
    /// Secret identifiers fetched at build time, keyed by variable name
    pub forwarded_secrets: BuildSecrets,
    pub build_spec: BuildSpec,
}

/// Container image repository the build pushes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRepository {
    pub name: String,
    pub uri: String,
    pub arn: String,
}

impl ImageRepository {
    pub fn new(name: &str, account: &str, region: &str) -> Self {
        Self {
            name: name.to_string(),
            uri: format!("{}.dkr.ecr.{}.amazonaws.com/{}", account, region, name),
            arn: format!("arn:aws:ecr:{}:{}:repository/{}", region, account, name),
        }
    }

    /// Allows `principal` to pull from and push to this repository.
    ///
    /// Registry login needs an authorization token that is not scoped to a
    /// single repository, hence the second, account-wide grant.
    pub fn grant_pull_push(&self, principal: &Principal) -> Vec<Grant> {
        let actions = PULL_ACTIONS
            .iter()
            .chain(PUSH_ACTIONS)
            .map(|a| a.to_string())
            .collect();
        vec![
            Grant {
                principal: principal.clone(),
                resource: self.arn.clone(),
                actions,
            },
            Grant {
                principal: principal.clone(),
                resource: "*".to_string(),
                actions: vec![AUTH_TOKEN_ACTION.to_string()],
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub principal: Principal,
    pub resource: String,
    pub actions: Vec<String>,
}

impl Grant {
    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    pub fn allows_push(&self) -> bool {
        PUSH_ACTIONS.iter().all(|a| self.allows(a))
    }
}
