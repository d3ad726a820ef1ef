use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "contour-overlap",
    about = "Overlay density contours of solution sets on a log-log plot",
    version
)]
pub struct Cli {
    /// JSON configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory receiving the PNG and EPS files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}
