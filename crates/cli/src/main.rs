// gridpad - terminal grid editor

mod logging;
mod tui;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gridpad_config::Settings;

/// Success - editor exited normally.
const EXIT_SUCCESS: u8 = 0;
/// General error - terminal setup or drawing failed.
const EXIT_ERROR: u8 = 1;

#[derive(Parser)]
#[command(name = "gridpad")]
#[command(about = "A 26x50 grid editor for the terminal")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (defaults to <config dir>/gridpad/settings.json)
    #[arg(long, env = "GRIDPAD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Log file (defaults to <cache dir>/gridpad/gridpad.log)
    #[arg(long, env = "GRIDPAD_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Disable mouse capture regardless of settings
    #[arg(long)]
    no_mouse: bool,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  gridpad-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  gridpad-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Held for the whole run so buffered log lines are flushed on exit
    let _log_guard = logging::setup_logging(cli.log_file.as_deref());

    let mut settings = match &cli.settings {
        Some(path) => Settings::load_or_default(path),
        None => Settings::load(),
    };
    if cli.no_mouse {
        settings.mouse = false;
    }
    log::info!("starting gridpad {} with {:?}", env!("CARGO_PKG_VERSION"), settings);

    match tui::run(settings) {
        Ok(()) => {
            log::info!("gridpad exited");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(message) => {
            log::error!("{}", message);
            eprintln!("error: {}", message);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
