use std::path::PathBuf;

use anyhow::Context;
use sftpmirror_core::backends::ssh::SshConnector;
use sftpmirror_core::config::MirrorConfig;
use sftpmirror_core::sync::SyncDriver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Usage: sftpmirror --config <file> [--once]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>  JSON mirror configuration");
    eprintln!("  --once           Run a single sync pass and exit");
    eprintln!("  --version        Print version and exit");
    eprintln!("  --help           Print this help message");
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run { config: PathBuf, once: bool },
    Version,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config = None;
    let mut once = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" => return Ok(Command::Version),
            "--help" => return Ok(Command::Help),
            "--once" => once = true,
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| "--config requires a file path".to_string())?;
                config = Some(PathBuf::from(path));
            }
            other => return Err(format!("Unknown option: {other}")),
        }
    }

    match config {
        Some(config) => Ok(Command::Run { config, once }),
        None => Err("Missing --config <file>".to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (config_path, once) = match parse_args(&args) {
        Ok(Command::Version) => {
            println!("sftpmirror {}", VERSION);
            return Ok(());
        }
        Ok(Command::Help) => {
            print_usage();
            return Ok(());
        }
        Ok(Command::Run { config, once }) => (config, once),
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = MirrorConfig::load(&config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    info!("sftpmirror {} starting", VERSION);

    let driver = SyncDriver::new(
        SshConnector::new(config.ssh.clone()),
        config.remote_root.clone(),
        &config.local_root,
    )
    .with_options(config.sync_options())
    .with_retry_interval(config.retry_interval())
    .with_poll_interval(config.poll_interval());

    if once {
        let report = tokio::task::spawn_blocking(move || driver.attempt())
            .await
            .context("Sync task panicked")??;
        info!("Sync pass complete: {report}");
        if !report.is_clean() {
            anyhow::bail!("{} file(s) failed to sync", report.failed);
        }
        return Ok(());
    }

    let worker = tokio::task::spawn_blocking(move || {
        driver.run();
    });

    tokio::select! {
        joined = worker => {
            joined.context("Sync driver stopped unexpectedly")?;
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for Ctrl-C: {e}");
            }
            info!("Interrupted, shutting down");
            // The blocking driver thread cannot be joined; leave without
            // waiting for the runtime to drain it.
            std::process::exit(130);
        }
    }
}
