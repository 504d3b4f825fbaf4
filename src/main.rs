//! scrollstack - Entry Point

use clap::{Parser, ValueEnum};
use scrollstack::logging::LogTarget;
use scrollstack::model::AppError;
use scrollstack::scenario::{self, Scenario};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// scrollstack - run a layout scenario and print the resulting frames
#[derive(Parser, Debug)]
#[command(name = "scrollstack")]
#[command(version)]
#[command(about = "Stack scrollable regions into one surface and report their frames")]
pub struct Args {
    /// Path to scenario TOML file
    pub scenario: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Extra scroll offset to snapshot after the scenario's own steps (repeatable)
    #[arg(long = "offset", allow_negative_numbers = true)]
    pub offsets: Vec<f64>,

    /// Discardable rect height in viewport heights (overrides config)
    #[arg(long)]
    pub discardable_factor: Option<f64>,

    /// Valid rect growth in viewport heights (overrides config)
    #[arg(long)]
    pub valid_rect_buffer: Option<f64>,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = scrollstack::config::load_config_with_precedence(args.config.clone())?;
        let merged = scrollstack::config::merge_config(config_file);
        let with_env = scrollstack::config::apply_env_overrides(merged);
        scrollstack::config::apply_cli_overrides(
            with_env,
            args.discardable_factor,
            args.valid_rect_buffer,
        )
    };

    let log_target = if args.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file_path.clone())
    };
    scrollstack::logging::init(&log_target)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let scenario = Scenario::load(&args.scenario)?;
    let report = scenario::run(&scenario, config.engine, &args.offsets)?;

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Text => writeln!(stdout, "{report}")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
