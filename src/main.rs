mod abort;
mod config;
mod decoder;
mod executor;
mod predict;
mod radio;
mod report;
mod scheduler;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;

use crate::abort::AbortSignal;
use crate::config::{Config, Settings};
use crate::decoder::QsstvDecoder;
use crate::predict::TleLoader;
use crate::radio::RtlFmRecorder;
use crate::scheduler::{predict_passes, ArtifactsManager, Driver, Runner, SystemClock};

#[derive(Parser)]
#[command(name = "iss-o-mat")]
#[command(about = "Predicts ISS passes and records SSTV transmissions during them")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "iss-o-mat.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture daemon (default)
    Run,
    /// Validate the configuration file
    Validate,
    /// Predict and list upcoming passes once, without recording
    Passes {
        /// Print the pass list as JSON instead of the coloured table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = match load_settings(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error in {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Validate => validate(&settings),
        Commands::Passes { json } => passes(&settings, json),
        Commands::Run => run(&settings),
    }
}

fn load_settings(path: &Path) -> Result<Settings, config::ConfigError> {
    Config::from_file(path)?.resolve()
}

fn validate(settings: &Settings) -> ExitCode {
    println!("Configuration is valid");
    println!(
        "  station: {} ({:.4}, {:.4}, {} m)",
        settings.station_name.as_deref().unwrap_or("unnamed"),
        settings.station.latitude_deg,
        settings.station.longitude_deg,
        settings.station.altitude_m
    );
    println!("  timezone: {}", settings.timezone);
    println!("  satellite: {}", settings.satellite);
    println!(
        "  horizon: {} h, step: {} s",
        settings.horizon.num_hours(),
        settings.step.num_seconds()
    );
    ExitCode::SUCCESS
}

fn passes(settings: &Settings, json: bool) -> ExitCode {
    let loader = TleLoader::new(settings.tle_source.clone());
    match predict_passes(&loader, settings, Utc::now()) {
        Ok(passes) if json => match serde_json::to_string_pretty(&passes) {
            Ok(out) => {
                println!("{}", out);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize passes: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(passes) => {
            report::print_passes(&passes, settings.timezone);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Prediction failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> ExitCode {
    let artifacts = match ArtifactsManager::create(&settings.paths) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to create output directories: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (abort_tx, abort_rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = abort_tx.send(AbortSignal::new("interrupted"));
    }) {
        log::warn!("Failed to install interrupt handler: {}", e);
    }

    let clock = SystemClock::new(abort_rx);
    let loader = TleLoader::new(settings.tle_source.clone());
    let recorder = RtlFmRecorder::new(settings.radio.clone(), settings.paths.log_dir.clone());
    let decoder = QsstvDecoder::new(settings.decoder.clone(), settings.paths.log_dir.clone());
    let driver = Driver {
        settings,
        provider: &loader,
        clock: &clock,
        runner: Runner {
            clock: &clock,
            capture: &recorder,
            decode: &decoder,
            artifacts: &artifacts,
            decode_policy: settings.decode_policy,
            timezone: settings.timezone,
        },
    };

    log::info!(
        "Starting daemon for {} at ({:.4}, {:.4})",
        settings.satellite,
        settings.station.latitude_deg,
        settings.station.longitude_deg
    );
    let signal = driver.run_forever();
    log::info!("Stopped: {}", signal);
    ExitCode::SUCCESS
}
