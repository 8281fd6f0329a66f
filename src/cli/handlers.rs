use super::commands::{SynthArgs, ValidateArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::{ConfigError, EcrpipeConfig, PipelineInput};
use crate::pipeline::{PipelineAssembler, SynthContext, ValidatedInput};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID_INPUT: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

fn config_exit_code(e: &ConfigError) -> i32 {
    match e {
        ConfigError::ReadError { .. } => EXIT_FAILURE,
        _ => EXIT_INVALID_INPUT,
    }
}

/// Loads the process config and the input file, then validates the input.
fn load_validated(path: &Path) -> Result<(EcrpipeConfig, PipelineInput, ValidatedInput), i32> {
    let config = EcrpipeConfig::default();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(config_exit_code(&e));
    }

    let input = PipelineInput::from_file(path).map_err(|e| {
        error!("{}", e);
        config_exit_code(&e)
    })?;

    let validated = ValidatedInput::from_input(&input).map_err(|e| {
        error!("{}", e);
        EXIT_INVALID_INPUT
    })?;

    Ok((config, input, validated))
}

pub fn handle_synth(args: &SynthArgs, quiet: bool) -> i32 {
    let (config, input, validated) = match load_validated(&args.config) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let target = match config.resolve_target(input.env.as_ref()) {
        Ok(target) => target,
        Err(e) => {
            error!("{}", e);
            return config_exit_code(&e);
        }
    };
    debug!(account = %target.account, region = %target.region, "Resolved deploy target");

    let ctx = SynthContext::from_validated(validated, target);
    let pipeline = match PipelineAssembler::default().assemble(&ctx) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("{}", e);
            return if e.is_validation() {
                EXIT_INVALID_INPUT
            } else {
                EXIT_FAILURE
            };
        }
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    let rendered = if args.buildspec {
        formatter.format_build_spec(pipeline.build_spec())
    } else {
        formatter.format(&pipeline)
    };

    let result = rendered.and_then(|text| match &args.output {
        Some(path) => fs::write(path, &text)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    });

    match result {
        Ok(()) => {
            if let (Some(path), false) = (&args.output, quiet) {
                info!("Wrote {}", path.display());
            }
            EXIT_OK
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_validate(args: &ValidateArgs, quiet: bool) -> i32 {
    let validated = match load_validated(&args.config) {
        Ok((_, _, validated)) => validated,
        Err(code) => return code,
    };

    if !quiet {
        println!(
            "\u{2713} {} is valid: {} on {} (branch {})",
            args.config.display(),
            validated.repository.name(),
            validated.stage,
            validated.repository.branch_for(validated.stage)
        );
    }
    EXIT_OK
}
