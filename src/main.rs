use ecrpipe::cli::commands::{CliArgs, Commands};
use ecrpipe::cli::handlers::{handle_synth, handle_validate};
use ecrpipe::util::logging::{config_from_env, init_logging, parse_level};
use ecrpipe::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("ecrpipe v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Synth(synth_args) => handle_synth(synth_args, args.quiet),
        Commands::Validate(validate_args) => handle_validate(validate_args, args.quiet),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        Some(parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    };

    init_logging(config_from_env(level));
}
