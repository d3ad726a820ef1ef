mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::debug;

use cli::Cli;
use contour_overlap::config::PlotConfig;
use contour_overlap::pipeline;
use contour_overlap::Error;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let empty = err
                .downcast_ref::<Error>()
                .is_some_and(Error::is_empty_overlap);
            if empty {
                eprintln!("The overlap is empty! Exiting.");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => PlotConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PlotConfig::default(),
    };
    if log::log_enabled!(log::Level::Debug) {
        debug!("effective configuration: {}", serde_json::to_string(&config)?);
    }

    let report = pipeline::run(&config, &cli.output_dir)?;
    debug!(
        "outputs: {} ({}x{}), {}",
        report.raster.display(),
        report.raster_size.0,
        report.raster_size.1,
        report.vector.display()
    );
    Ok(())
}
