use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use qrlogo::{composite, Config, LogSink};

#[derive(Parser, Debug)]
#[command(
    name = "qrlogo",
    version,
    about = "Make a QR code with a logo in the middle",
    after_help = "Example: qrlogo octocat.svg \"https://github.com/\" github-qrcode.svg"
)]
struct Args {
    /// SVG logo to put in the center
    logo: PathBuf,

    /// URL to encode, or a file containing it
    url: String,

    /// Output file. Defaults to <logo>-qrcode.svg next to the logo
    output: Option<PathBuf>,

    /// Side of one module in pixels
    #[arg(long, default_value_t = qrlogo::config::MODULE_SIZE)]
    module_size: u32,

    /// Radius of the logo area in pixels. Defaults to 4 modules
    #[arg(long)]
    radius: Option<f64>,

    /// Color of dark modules
    #[arg(long, default_value = "black")]
    fill: String,

    /// Also write the QR code without logo area
    #[arg(long)]
    diagnostic: bool,

    /// Directory for the diagnostic file. Defaults to the temp directory
    #[arg(long, requires = "diagnostic")]
    diagnostic_dir: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default()
            .with_module_size(self.module_size)
            .with_fill(self.fill.clone());
        if let Some(radius) = self.radius {
            config = config.with_radius(radius);
        }
        if self.diagnostic {
            config = config.with_diagnostic_artifact(self.diagnostic_dir.clone());
        }
        config
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.level_filter())
        .parse_default_env()
        .init();

    composite(
        &args.logo,
        &args.url,
        args.output.as_deref(),
        &args.config(),
        &LogSink,
    )
    .with_context(|| format!("could not make QR code with logo {}", args.logo.display()))?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
