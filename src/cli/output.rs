//! Output formatting for synthesized pipelines
//!
//! JSON and YAML render the full definition (or just the build specification);
//! the human format is a short summary meant for terminals.

use anyhow::{Context, Result};

use crate::output::schema::BuildSpec;
use crate::pipeline::definition::{Action, PipelineDefinition};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (buildspec-compatible)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, pipeline: &PipelineDefinition) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(pipeline)
                .context("Failed to serialize pipeline definition to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(pipeline)
                .context("Failed to serialize pipeline definition to YAML"),
            OutputFormat::Human => Ok(self.format_human(pipeline)),
        }
    }

    pub fn format_build_spec(&self, spec: &BuildSpec) -> Result<String> {
        match self.format {
            OutputFormat::Json => spec.to_json(),
            OutputFormat::Yaml => spec.to_yaml(),
            OutputFormat::Human => Ok(spec.to_string()),
        }
    }

    fn format_human(&self, pipeline: &PipelineDefinition) -> String {
        let mut output = String::new();

        output.push_str(&format!("\u{2713} Pipeline {}\n", pipeline.name));
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");
        output.push_str(&format!("Stage:            {}\n", pipeline.stage));
        output.push_str(&format!(
            "Image repository: {}\n\n",
            pipeline.image_repository.uri
        ));

        output.push_str("Stages:\n");
        for (i, stage) in pipeline.stages.iter().enumerate() {
            let connector = if i == pipeline.stages.len() - 1 {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            let detail = stage
                .actions
                .iter()
                .map(describe_action)
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("{}\u{2500} {}: {}\n", connector, stage.name, detail));
        }
        output.push('\n');

        output.push_str(&format!(
            "Build project:    {} (role {})\n",
            pipeline.build_project.name, pipeline.build_project.role
        ));
        let secrets: Vec<&str> = pipeline.build_project.forwarded_secrets.names().collect();
        if !secrets.is_empty() {
            output.push_str(&format!("Forwarded secrets: {}\n", secrets.join(", ")));
        }
        output.push('\n');
        output.push_str(&pipeline.build_spec().to_string());

        output
    }
}

fn describe_action(action: &Action) -> String {
    match action {
        Action::GithubSource(a) => format!("{}/{}@{} (webhook)", a.owner, a.repo, a.branch),
        Action::CodeBuild(a) => format!("{} <- {}", a.project, a.input),
    }
}
