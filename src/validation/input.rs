//! Input validation for pipeline configuration
//!
//! The stage, repository reference, resource names and build variable maps
//! arrive from a config file and are only semi-trusted. They are parsed into
//! normalized types here, before any pipeline resource is defined; everything
//! downstream assumes normalized input.

use crate::build::OrderedVars;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const REPOSITORY_NAME_PATTERN: &str = r"^[^/]+/[^/]+$";
const REPOSITORY_NAME_EXPECTED: &str =
    "A GitHub repository name must follow the pattern \"<owner>/<repo>\"";
const CREDENTIAL_EXPECTED: &str = "A source credential reference (secret id) is required";

const RESOURCE_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";
const RESOURCE_NAME_EXPECTED: &str =
    "A resource name must start with a letter or digit and contain only letters, digits, '.', '_' or '-'";

const IMAGE_REPOSITORY_PATTERN: &str =
    r"^(?:[a-z0-9]+(?:[._-][a-z0-9]+)*/)*[a-z0-9]+(?:[._-][a-z0-9]+)*$";
const IMAGE_REPOSITORY_MAX_LEN: usize = 256;
const IMAGE_REPOSITORY_EXPECTED: &str =
    "An image repository name must be 2-256 lowercase characters from [a-z0-9._/-], starting and ending with a letter or digit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid stage: {value:?}. Valid options: dev, prod")]
    InvalidStage { value: String },

    #[error("Invalid repository {field}: {value:?}. {expected}")]
    InvalidRepository {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid {field}: {value:?}. {expected}")]
    InvalidName {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Build variable {name:?} is declared both as a plain build variable and as a build secret")]
    ConflictingBuildVariable { name: String },
}

/// Named deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStage {
    Dev,
    Prod,
}

impl DeploymentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStage::Dev => "dev",
            DeploymentStage::Prod => "prod",
        }
    }

    /// Branch fetched when the repository reference names none
    pub fn default_branch(&self) -> String {
        format!("deploy/{}", self.as_str())
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_stage(s)
    }
}

/// Opaque reference to the credential used to authenticate against the source host.
///
/// This is a secret store identifier, never the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn secret_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secretsmanager:{}", self.0)
    }
}

/// Repository reference as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRepository {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Validated, normalized repository reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReference {
    owner: String,
    repo: String,
    branch: Option<String>,
    path: Option<String>,
    secret: CredentialRef,
}

impl RepositoryReference {
    /// `<owner>/<repo>`
    pub fn name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Explicit branch, or `deploy/<stage>` when none was configured
    pub fn branch_for(&self, stage: DeploymentStage) -> String {
        self.branch
            .clone()
            .unwrap_or_else(|| stage.default_branch())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn secret(&self) -> &CredentialRef {
        &self.secret
    }
}

fn repository_name_regex() -> &'static Regex {
    static REPOSITORY_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    REPOSITORY_NAME_REGEX
        .get_or_init(|| Regex::new(REPOSITORY_NAME_PATTERN).expect("Invalid repository regex"))
}

fn resource_name_regex() -> &'static Regex {
    static RESOURCE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    RESOURCE_NAME_REGEX
        .get_or_init(|| Regex::new(RESOURCE_NAME_PATTERN).expect("Invalid resource name regex"))
}

fn image_repository_regex() -> &'static Regex {
    static IMAGE_REPOSITORY_REGEX: OnceLock<Regex> = OnceLock::new();
    IMAGE_REPOSITORY_REGEX.get_or_init(|| {
        Regex::new(IMAGE_REPOSITORY_PATTERN).expect("Invalid image repository regex")
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parses a raw stage value into one of the closed set of stages.
pub fn parse_stage(raw: &str) -> Result<DeploymentStage, ValidationError> {
    match raw {
        "dev" => Ok(DeploymentStage::Dev),
        "prod" => Ok(DeploymentStage::Prod),
        other => Err(ValidationError::InvalidStage {
            value: other.to_string(),
        }),
    }
}

/// Parses and normalizes a raw repository reference.
///
/// The name must hold exactly one `/` with non-empty owner and repo on either
/// side. Empty `branch` and `path` values are treated as unset.
pub fn parse_repository(raw: &RawRepository) -> Result<RepositoryReference, ValidationError> {
    if !repository_name_regex().is_match(&raw.name) {
        return Err(ValidationError::InvalidRepository {
            field: "name",
            value: raw.name.clone(),
            expected: REPOSITORY_NAME_EXPECTED,
        });
    }

    let (owner, repo) = raw
        .name
        .split_once('/')
        .ok_or_else(|| ValidationError::InvalidRepository {
            field: "name",
            value: raw.name.clone(),
            expected: REPOSITORY_NAME_EXPECTED,
        })?;

    let secret = non_empty(raw.secret.as_deref()).ok_or_else(|| {
        ValidationError::InvalidRepository {
            field: "secret",
            value: raw.secret.clone().unwrap_or_default(),
            expected: CREDENTIAL_EXPECTED,
        }
    })?;

    Ok(RepositoryReference {
        owner: owner.to_string(),
        repo: repo.to_string(),
        branch: non_empty(raw.branch.as_deref()),
        path: non_empty(raw.path.as_deref()),
        secret: CredentialRef::new(secret),
    })
}

/// Checks a pipeline resource name prefix such as the optional `name` field.
pub fn parse_resource_name(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    if !resource_name_regex().is_match(raw) {
        return Err(ValidationError::InvalidName {
            field,
            value: raw.to_string(),
            expected: RESOURCE_NAME_EXPECTED,
        });
    }
    Ok(raw.to_string())
}

/// Checks an image repository name against the registry's naming rules.
pub fn parse_image_repository_name(raw: &str) -> Result<String, ValidationError> {
    let len_ok = (2..=IMAGE_REPOSITORY_MAX_LEN).contains(&raw.len());
    if !len_ok || !image_repository_regex().is_match(raw) {
        return Err(ValidationError::InvalidName {
            field: "image_repository",
            value: raw.to_string(),
            expected: IMAGE_REPOSITORY_EXPECTED,
        });
    }
    Ok(raw.to_string())
}

/// Rejects a name declared both as a plain build variable and as a build secret.
pub fn check_build_variables(
    env: &OrderedVars,
    secrets: &OrderedVars,
) -> Result<(), ValidationError> {
    match secrets.keys().find(|name| env.contains_key(name)) {
        Some(name) => Err(ValidationError::ConflictingBuildVariable {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawRepository {
        RawRepository {
            name: name.to_string(),
            secret: Some("github-token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_stage_valid() {
        assert_eq!(parse_stage("dev").unwrap(), DeploymentStage::Dev);
        assert_eq!(parse_stage("prod").unwrap(), DeploymentStage::Prod);
        assert_eq!(parse_stage("dev").unwrap().as_str(), "dev");
    }

    #[test]
    fn test_parse_stage_is_case_sensitive() {
        let err = parse_stage("Prod").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidStage {
                value: "Prod".to_string()
            }
        );
        assert!(err.to_string().contains("dev, prod"));
    }

    #[test]
    fn test_stage_from_str() {
        let stage: DeploymentStage = "prod".parse().unwrap();
        assert_eq!(stage, DeploymentStage::Prod);
        assert!("staging".parse::<DeploymentStage>().is_err());
    }

    #[test]
    fn test_default_branch() {
        assert_eq!(DeploymentStage::Dev.default_branch(), "deploy/dev");
        assert_eq!(DeploymentStage::Prod.default_branch(), "deploy/prod");
    }

    #[test]
    fn test_parse_repository_splits_owner_and_repo() {
        let repo = parse_repository(&raw("RedType/tagbot")).unwrap();
        assert_eq!(repo.owner(), "RedType");
        assert_eq!(repo.repo(), "tagbot");
        assert_eq!(repo.name(), "RedType/tagbot");
        assert_eq!(repo.secret().secret_id(), "github-token");
    }

    #[test]
    fn test_parse_repository_rejects_bad_names() {
        for name in ["", "noslash", "/repo", "owner/", "/", "a/b/c"] {
            match parse_repository(&raw(name)) {
                Err(ValidationError::InvalidRepository { field, value, .. }) => {
                    assert_eq!(field, "name");
                    assert_eq!(value, name);
                }
                other => panic!("expected InvalidRepository for {:?}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_parse_repository_error_message_names_pattern() {
        let err = parse_repository(&raw("tagbot")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("\"tagbot\""));
        assert!(message.contains("<owner>/<repo>"));
    }

    #[test]
    fn test_parse_repository_requires_secret() {
        let mut input = raw("Org/Repo");
        input.secret = None;
        let err = parse_repository(&input).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidRepository { field: "secret", .. }
        ));

        input.secret = Some(String::new());
        assert!(parse_repository(&input).is_err());
    }

    #[test]
    fn test_empty_branch_and_path_normalize_to_none() {
        let mut input = raw("Org/Repo");
        input.branch = Some(String::new());
        input.path = Some(String::new());

        let repo = parse_repository(&input).unwrap();
        assert_eq!(repo.branch(), None);
        assert_eq!(repo.path(), None);
        assert_eq!(repo.branch_for(DeploymentStage::Dev), "deploy/dev");
    }

    #[test]
    fn test_explicit_branch_wins() {
        let mut input = raw("Org/Repo");
        input.branch = Some("main".to_string());
        input.path = Some("handler".to_string());

        let repo = parse_repository(&input).unwrap();
        assert_eq!(repo.branch_for(DeploymentStage::Prod), "main");
        assert_eq!(repo.path(), Some("handler"));
    }

    #[test]
    fn test_image_repository_name() {
        assert!(parse_image_repository_name("tagbot-handler").is_ok());
        assert!(parse_image_repository_name("team/tagbot.dev").is_ok());

        for bad in ["My Repo", "Tagbot", "a", "-lead", "trail-", "a//b", ""] {
            let err = parse_image_repository_name(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidName { field: "image_repository", .. }),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(parse_resource_name("name", "Tagbot_v2").unwrap(), "Tagbot_v2");

        let err = parse_resource_name("name", "tag bot").unwrap_err();
        assert!(err.to_string().contains("Invalid name: \"tag bot\""));
        assert!(parse_resource_name("name", "-tagbot").is_err());
    }

    #[test]
    fn test_build_variable_collision() {
        let env: OrderedVars = [("FOO", "bar"), ("API_KEY", "plain")].into_iter().collect();
        let secrets: OrderedVars = [("API_KEY", "secret-1")].into_iter().collect();
        assert_eq!(
            check_build_variables(&env, &secrets),
            Err(ValidationError::ConflictingBuildVariable {
                name: "API_KEY".to_string()
            })
        );

        let secrets: OrderedVars = [("BAZ", "secret-2")].into_iter().collect();
        assert!(check_build_variables(&env, &secrets).is_ok());
    }
}
