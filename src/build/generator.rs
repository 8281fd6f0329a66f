use super::environment::BuildEnvironment;
use super::phases::{
    ImageBuildPhase, InstallPhase, PhaseContext, PostBuildPhase, PreBuildPhase, SpecPhase,
};
use super::secrets::{forward, BuildSecrets};
use crate::output::schema::{BuildPhases, BuildSpec, PhaseCommands};
use tracing::debug;

/// Inputs to build specification generation, all already validated
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInput<'a> {
    pub environment: &'a BuildEnvironment,
    pub secrets: &'a BuildSecrets,
    pub path: Option<&'a str>,
    pub account: &'a str,
    pub region: &'a str,
}

/// Composes the four-phase build specification.
///
/// Generation is infallible: every failure mode of the emitted commands
/// surfaces when the build runs, not here.
pub struct BuildSpecGenerator {
    install: Box<dyn SpecPhase>,
    pre_build: Box<dyn SpecPhase>,
    build: Box<dyn SpecPhase>,
    post_build: Box<dyn SpecPhase>,
}

impl Default for BuildSpecGenerator {
    fn default() -> Self {
        Self {
            install: Box::new(InstallPhase),
            pre_build: Box::new(PreBuildPhase),
            build: Box::new(ImageBuildPhase),
            post_build: Box::new(PostBuildPhase),
        }
    }
}

impl BuildSpecGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, input: &GeneratorInput<'_>) -> BuildSpec {
        let forwarded = forward(input.secrets);
        let context = PhaseContext {
            environment: input.environment,
            secrets: &forwarded,
            path: input.path,
            account: input.account,
            region: input.region,
        };

        let phases = BuildPhases {
            install: run_phase(self.install.as_ref(), &context),
            pre_build: run_phase(self.pre_build.as_ref(), &context),
            build: run_phase(self.build.as_ref(), &context),
            post_build: run_phase(self.post_build.as_ref(), &context),
        };

        BuildSpec::new(phases)
    }
}

fn run_phase(phase: &dyn SpecPhase, context: &PhaseContext<'_>) -> PhaseCommands {
    let commands: Vec<String> = phase
        .commands(context)
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();
    debug!("Phase {} emitted {} command(s)", phase.name(), commands.len());
    PhaseCommands::new(commands)
}
