use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Synthesizes source-to-ECR container delivery pipelines
#[derive(Parser, Debug)]
#[command(
    name = "ecrpipe",
    about = "Synthesizes source-to-ECR container delivery pipelines",
    version,
    long_about = "ecrpipe turns a small pipeline input file (repository, stage, extra build \
                  variables and secrets) into a two-stage pipeline definition: a source \
                  stage and a container build/push stage with a generated buildspec."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Synthesize a pipeline definition",
        long_about = "Validates the pipeline input and prints the synthesized pipeline \
                      definition, or only its build specification.\n\n\
                      Examples:\n  \
                      ecrpipe synth pipeline.yaml\n  \
                      ecrpipe synth pipeline.yaml --format json\n  \
                      ecrpipe synth pipeline.yaml --buildspec -o buildspec.yml"
    )]
    Synth(SynthArgs),

    #[command(
        about = "Validate a pipeline input file",
        long_about = "Checks the stage and repository reference without synthesizing.\n\n\
                      Examples:\n  \
                      ecrpipe validate pipeline.yaml"
    )]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct SynthArgs {
    #[arg(value_name = "CONFIG", help = "Path to the pipeline input file")]
    pub config: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "yaml",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Print only the generated build specification")]
    pub buildspec: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "CONFIG", help = "Path to the pipeline input file")]
    pub config: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
