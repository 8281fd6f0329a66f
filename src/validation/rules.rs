use crate::build::args::BuildArgument;
use crate::build::environment::IMAGE_REPOSITORY_URI_VAR;
use crate::build::phases::LATEST_TAG;
use crate::pipeline::definition::BuildProject;
use anyhow::Result;

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, project: &BuildProject) -> Result<()>;
}

pub struct NoBlankCommandsRule;

impl ValidationRule for NoBlankCommandsRule {
    fn name(&self) -> &'static str {
        "NoBlankCommands"
    }

    fn validate(&self, project: &BuildProject) -> Result<()> {
        for (phase, commands) in project.build_spec.phases.iter() {
            for (i, cmd) in commands.commands.iter().enumerate() {
                if cmd.trim().is_empty() {
                    anyhow::bail!("Phase {} command[{}] is blank", phase, i);
                }
            }
        }
        Ok(())
    }
}

pub struct NonEmptyPhasesRule;

impl ValidationRule for NonEmptyPhasesRule {
    fn name(&self) -> &'static str {
        "NonEmptyPhases"
    }

    fn validate(&self, project: &BuildProject) -> Result<()> {
        let phases = &project.build_spec.phases;
        if phases.pre_build.commands.is_empty() {
            anyhow::bail!("Pre-build commands cannot be empty");
        }
        if phases.build.commands.is_empty() {
            anyhow::bail!("Build commands cannot be empty");
        }
        if phases.post_build.commands.is_empty() {
            anyhow::bail!("Post-build commands cannot be empty");
        }
        Ok(())
    }
}

/// Secrets must reach the image build only through a local `$NAME` reference.
pub struct SecretsByReferenceRule;

impl ValidationRule for SecretsByReferenceRule {
    fn name(&self) -> &'static str {
        "SecretsByReference"
    }

    fn validate(&self, project: &BuildProject) -> Result<()> {
        let build_commands = project.build_spec.phases.build.commands.join("\n");

        for name in project.forwarded_secrets.names() {
            if project.environment.variables.get(name).is_some() {
                anyhow::bail!(
                    "Secret {} is also declared as a plain build variable; precedence between the two is undefined",
                    name
                );
            }

            let reference = BuildArgument::secret_reference(name).to_string();
            if !build_commands.contains(&reference) {
                anyhow::bail!("Secret {} is not passed as {}", name, reference);
            }

            let exported = format!("export {}", name);
            if project.build_spec.commands().any(|c| c.contains(&exported)) {
                anyhow::bail!("Secret {} must not be exported", name);
            }
        }
        Ok(())
    }
}

pub struct PushesBothTagsRule;

impl ValidationRule for PushesBothTagsRule {
    fn name(&self) -> &'static str {
        "PushesBothTags"
    }

    fn validate(&self, project: &BuildProject) -> Result<()> {
        let post_build = &project.build_spec.phases.post_build.commands;
        for tag in [LATEST_TAG, "$IMAGE_TAG"] {
            let push = format!("docker push \"${}:{}\"", IMAGE_REPOSITORY_URI_VAR, tag);
            if !post_build.iter().any(|c| *c == push) {
                anyhow::bail!("Post-build phase does not push tag {}", tag);
            }
        }
        Ok(())
    }
}
