use super::args::BuildArgument;
use super::environment::{BuildEnvironment, IMAGE_REPOSITORY_URI_VAR};
use super::secrets::ForwardedSecrets;

pub const LATEST_TAG: &str = "latest";
pub const COMMIT_TAG_LENGTH: usize = 7;
pub const RESOLVED_SOURCE_VERSION_VAR: &str = "CODEBUILD_RESOLVED_SOURCE_VERSION";

/// Everything a phase needs to emit its commands
pub struct PhaseContext<'a> {
    pub environment: &'a BuildEnvironment,
    pub secrets: &'a ForwardedSecrets,
    pub path: Option<&'a str>,
    pub account: &'a str,
    pub region: &'a str,
}

impl PhaseContext<'_> {
    /// Registry endpoint the image is pushed to
    pub fn registry_endpoint(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account, self.region)
    }

    /// Plain arguments first, in environment order, then secret references
    pub fn build_args(&self) -> Vec<BuildArgument> {
        self.environment
            .iter()
            .map(|(k, v)| BuildArgument::literal(k, v))
            .chain(self.secrets.build_args.iter().cloned())
            .collect()
    }
}

pub trait SpecPhase: Send + Sync {
    fn name(&self) -> &'static str;
    fn commands(&self, context: &PhaseContext<'_>) -> Vec<String>;
}

pub struct InstallPhase;

impl SpecPhase for InstallPhase {
    fn name(&self) -> &'static str {
        "install"
    }

    fn commands(&self, context: &PhaseContext<'_>) -> Vec<String> {
        vec![context.path.map(|p| format!("cd {}", p)).unwrap_or_default()]
    }
}

pub struct PreBuildPhase;

impl SpecPhase for PreBuildPhase {
    fn name(&self) -> &'static str {
        "pre_build"
    }

    fn commands(&self, context: &PhaseContext<'_>) -> Vec<String> {
        let mut commands = vec![
            "aws --version".to_string(),
            format!(
                "aws ecr get-login-password --region \"{}\" | docker login --username AWS --password-stdin   \"{}\"",
                context.region,
                context.registry_endpoint()
            ),
        ];
        commands.extend(context.secrets.fetch_commands.iter().cloned());
        commands.push(format!(
            "COMMIT_HASH=\"$(echo ${} | cut -c 1-{})\"",
            RESOLVED_SOURCE_VERSION_VAR, COMMIT_TAG_LENGTH
        ));
        commands.push(format!("IMAGE_TAG=\"${{COMMIT_HASH:={}}}\"", LATEST_TAG));
        commands
    }
}

pub struct ImageBuildPhase;

impl SpecPhase for ImageBuildPhase {
    fn name(&self) -> &'static str {
        "build"
    }

    fn commands(&self, context: &PhaseContext<'_>) -> Vec<String> {
        let args = context
            .build_args()
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        vec![
            format!(
                "docker build -t \"${uri}:{latest}\" {args} .",
                uri = IMAGE_REPOSITORY_URI_VAR,
                latest = LATEST_TAG,
                args = args
            ),
            format!(
                "docker tag \"${uri}:{latest}\" \"${uri}:$IMAGE_TAG\"",
                uri = IMAGE_REPOSITORY_URI_VAR,
                latest = LATEST_TAG
            ),
        ]
    }
}

pub struct PostBuildPhase;

impl SpecPhase for PostBuildPhase {
    fn name(&self) -> &'static str {
        "post_build"
    }

    fn commands(&self, _context: &PhaseContext<'_>) -> Vec<String> {
        vec![
            format!("docker push \"${}:{}\"", IMAGE_REPOSITORY_URI_VAR, LATEST_TAG),
            format!("docker push \"${}:$IMAGE_TAG\"", IMAGE_REPOSITORY_URI_VAR),
        ]
    }
}

/// Tag the build applies for `revision`; mirrors the `COMMIT_HASH`/`IMAGE_TAG`
/// shell logic emitted in the pre-build phase.
pub fn commit_tag(revision: &str) -> String {
    if revision.is_empty() {
        return LATEST_TAG.to_string();
    }
    revision.chars().take(COMMIT_TAG_LENGTH).collect()
}
