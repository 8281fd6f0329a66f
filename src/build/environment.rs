//! Plain (non-secret) build environment assembly

use super::vars::OrderedVars;
use crate::validation::DeploymentStage;
use serde::Serialize;
use tracing::{debug, warn};

pub const STAGE_VAR: &str = "STAGE";
pub const IMAGE_REPOSITORY_URI_VAR: &str = "ECR_REPOSITORY_URI";

/// Ordered plain build variables: baseline first, caller additions after.
///
/// Every entry becomes both a build project environment variable and a
/// literal `--build-arg`. Secrets never go here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildEnvironment(OrderedVars);

impl BuildEnvironment {
    /// Baseline variables every build receives
    pub fn baseline(stage: DeploymentStage, image_repository_uri: &str) -> Self {
        let mut vars = OrderedVars::new();
        vars.insert(STAGE_VAR, stage.as_str());
        vars.insert(IMAGE_REPOSITORY_URI_VAR, image_repository_uri);
        Self(vars)
    }

    /// Merges caller-supplied variables; later writes win.
    pub fn merge(mut self, additional: &OrderedVars) -> Self {
        for (key, value) in additional.iter() {
            if let Some(previous) = self.0.insert(key, value) {
                warn!(
                    key,
                    previous = %previous,
                    "Additional build variable overrides an existing value"
                );
            }
        }
        self
    }

    pub fn vars(&self) -> &OrderedVars {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds the final plain environment from the baseline and optional additions.
pub fn assemble(
    stage: DeploymentStage,
    image_repository_uri: &str,
    additional: Option<&OrderedVars>,
) -> BuildEnvironment {
    let env = BuildEnvironment::baseline(stage, image_repository_uri);
    let env = match additional {
        Some(extra) => env.merge(extra),
        None => env,
    };
    debug!(variables = env.len(), "Assembled build environment");
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/tagbot-dev";

    #[test]
    fn test_baseline_only() {
        let env = assemble(DeploymentStage::Dev, URI, None);
        assert_eq!(
            env.iter().collect::<Vec<_>>(),
            vec![(STAGE_VAR, "dev"), (IMAGE_REPOSITORY_URI_VAR, URI)]
        );
    }

    #[test]
    fn test_additional_vars_appended_in_order() {
        let extra: OrderedVars = [("FOO", "bar"), ("ALPHA", "1")].into_iter().collect();
        let env = assemble(DeploymentStage::Prod, URI, Some(&extra));

        let keys: Vec<_> = env.vars().keys().collect();
        assert_eq!(keys, vec![STAGE_VAR, IMAGE_REPOSITORY_URI_VAR, "FOO", "ALPHA"]);
        assert_eq!(env.get(STAGE_VAR), Some("prod"));
    }

    #[test]
    fn test_caller_overrides_baseline_in_place() {
        let extra: OrderedVars = [("FOO", "bar"), ("STAGE", "custom")].into_iter().collect();
        let env = assemble(DeploymentStage::Dev, URI, Some(&extra));

        assert_eq!(env.len(), 3);
        assert_eq!(env.get(STAGE_VAR), Some("custom"));
        assert_eq!(env.vars().keys().next(), Some(STAGE_VAR));
    }

    #[test]
    fn test_assemble_is_pure() {
        let extra: OrderedVars = [("FOO", "bar")].into_iter().collect();
        let first = assemble(DeploymentStage::Dev, URI, Some(&extra));
        let second = assemble(DeploymentStage::Dev, URI, Some(&extra));
        assert_eq!(first, second);
        assert_eq!(extra.len(), 1);
    }
}
