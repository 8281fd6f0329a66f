use super::context::SynthContext;
use super::definition::{
    Action, BuildAction, BuildProject, ImageRepository, PipelineDefinition, PipelineStage,
    Principal, ProjectEnvironment, SourceAction, SourceTrigger, BUILD_STAGE, SOURCE_ARTIFACT,
    SOURCE_STAGE,
};
use crate::build::{assemble, BuildSpecGenerator, GeneratorInput};
use crate::error::SynthError;
use crate::validation::Validator;
use tracing::{debug, info, warn};

/// Wires the two-stage source -> build pipeline
pub struct PipelineAssembler {
    generator: BuildSpecGenerator,
    validator: Validator,
}

impl Default for PipelineAssembler {
    fn default() -> Self {
        Self::new(BuildSpecGenerator::new(), Validator::new())
    }
}

impl PipelineAssembler {
    pub fn new(generator: BuildSpecGenerator, validator: Validator) -> Self {
        Self {
            generator,
            validator,
        }
    }

    pub fn assemble(&self, ctx: &SynthContext) -> Result<PipelineDefinition, SynthError> {
        let target = &ctx.target;
        let image_repository =
            ImageRepository::new(&ctx.image_repository_name, &target.account, &target.region);
        debug!(uri = %image_repository.uri, "Defined output image repository");

        let source_stage = self.source_stage(ctx);

        let build_project = self.build_project(ctx, &image_repository)?;
        let grants = image_repository.grant_pull_push(&build_project.role);
        debug!(
            principal = %build_project.role,
            repository = %image_repository.name,
            "Granted pull/push on output image repository"
        );

        let build_stage = PipelineStage {
            name: BUILD_STAGE.to_string(),
            actions: vec![Action::CodeBuild(BuildAction {
                name: BUILD_STAGE.to_string(),
                project: build_project.name.clone(),
                input: SOURCE_ARTIFACT.to_string(),
                outputs: Vec::new(),
            })],
        };

        info!(
            "Synthesized pipeline {} ({} -> {})",
            ctx.name,
            ctx.repository.name(),
            image_repository.uri
        );

        Ok(PipelineDefinition {
            name: ctx.name.clone(),
            stage: ctx.stage,
            stages: vec![source_stage, build_stage],
            build_project,
            image_repository,
            grants,
        })
    }

    fn source_stage(&self, ctx: &SynthContext) -> PipelineStage {
        let repo = &ctx.repository;
        let branch = repo.branch_for(ctx.stage);
        debug!(owner = repo.owner(), repo = repo.repo(), %branch, "Defined source action");

        PipelineStage {
            name: SOURCE_STAGE.to_string(),
            actions: vec![Action::GithubSource(SourceAction {
                name: SOURCE_STAGE.to_string(),
                owner: repo.owner().to_string(),
                repo: repo.repo().to_string(),
                branch,
                oauth_token: repo.secret().clone(),
                trigger: SourceTrigger::Webhook,
                output: SOURCE_ARTIFACT.to_string(),
            })],
        }
    }

    fn build_project(
        &self,
        ctx: &SynthContext,
        image_repository: &ImageRepository,
    ) -> Result<BuildProject, SynthError> {
        let environment = assemble(ctx.stage, &image_repository.uri, Some(&ctx.additional_env));

        for name in ctx.secrets.names() {
            if environment.get(name).is_some() {
                warn!(name, "Build secret shares its name with a plain build variable");
            }
        }

        let build_spec = self.generator.generate(&GeneratorInput {
            environment: &environment,
            secrets: &ctx.secrets,
            path: ctx.repository.path(),
            account: &ctx.target.account,
            region: &ctx.target.region,
        });

        let name = format!("{}-build", ctx.name);
        let project = BuildProject {
            role: Principal::role(format!("{}-role", name)),
            name,
            environment: ProjectEnvironment::new(environment),
            forwarded_secrets: ctx.secrets.clone(),
            build_spec,
        };

        self.validator
            .validate(&project)
            .map_err(|e| SynthError::SpecCheck(e.to_string()))?;

        Ok(project)
    }
}
