use anyhow::Context;
use clap::Parser;
use img_optimize::cli::Args;
use img_optimize::{batch, logger};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::init_tracing(args.verbose);

    let config = args.to_config();
    let summary = batch::run(&config)
        .with_context(|| format!("failed to optimize images in {}", config.directory.display()))?;

    if args.fail_on_error && summary.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
