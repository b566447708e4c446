use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mediascan::logging::{init_tracing, init_tracing_json};
use mediascan::{ChannelObserver, ScanConfig, Scanner, Upload};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mediascan", about = "Scan media files for manipulation", version)]
struct Cli {
    /// JSON configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Skip real model loading
    #[arg(long, global = true)]
    lite: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan one or more files and print the response envelopes
    Scan {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the service health report
    Health,
}

fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    if cli.lite {
        config.detector.lite_mode = true;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    let config = load_config(&cli)?;
    let scanner = Scanner::from_config(config);

    match &cli.command {
        Command::Health => {
            println!("{}", serde_json::to_string_pretty(&scanner.health())?);
        }
        Command::Scan { files } => {
            // Console observer: alerts are printed to stderr as they arrive.
            let (observer, mut alerts) = ChannelObserver::pair();
            scanner.notifier().connect(Arc::new(observer));

            let mut failures = 0usize;
            for file in files {
                let bytes = tokio::fs::read(file)
                    .await
                    .with_context(|| format!("reading {}", file.display()))?;
                let upload = Upload::new(file.to_string_lossy(), bytes);

                match scanner.handle_scan(upload).await {
                    Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                    Err(e) => {
                        failures += 1;
                        println!("{}", serde_json::to_string_pretty(&e.to_response())?);
                    }
                }
                while let Ok(alert) = alerts.try_recv() {
                    eprintln!("ALERT {alert}");
                }
            }

            if failures > 0 {
                anyhow::bail!("{failures} of {} uploads could not be stored", files.len());
            }
        }
    }
    Ok(())
}
