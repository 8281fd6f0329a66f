use crate::pipeline::definition::BuildProject;
use crate::validation::rules::{
    NoBlankCommandsRule, NonEmptyPhasesRule, PushesBothTagsRule, SecretsByReferenceRule,
    ValidationRule,
};
use anyhow::Result;

/// Safety checks run over every generated build project
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn validate(&self, project: &BuildProject) -> Result<()> {
        for rule in &self.rules {
            if let Err(e) = rule.validate(project) {
                anyhow::bail!("[{}] {}", rule.name(), e);
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(NoBlankCommandsRule),
                Box::new(NonEmptyPhasesRule),
                Box::new(SecretsByReferenceRule),
                Box::new(PushesBothTagsRule),
            ],
        }
    }
}
