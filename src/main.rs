use std::process;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use syncthing_monitor::config::{Config, JsonSettingsStore, SettingsStore};
use syncthing_monitor::syncthing_client::helpers::{
    format_bytes, format_duration, format_rate, format_relative_time,
};
use syncthing_monitor::syncthing_client::{SyncthingClient, SyncthingData};
use syncthing_monitor::types::MonitorError;
use syncthing_monitor::watchdog::{Detection, LifecycleController, WatchdogClient};

#[derive(Debug, Parser)]
#[command(
    name = "syncthing-monitor",
    version,
    about = "Watch and control a Syncthing daemon"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classified snapshot of folders and devices (default)
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the watchdog's lifecycle state
    State,
    /// Start Syncthing and wait until it answers
    Start,
    /// Stop Syncthing
    Stop,
    /// Stop when running, start otherwise
    Toggle,
    /// Auto-detect GUI port, API key and basic auth user
    Detect,
    /// Reload watchdog settings and check Syncthing could start with them
    SetupCheck,
    /// Persist one setting to config.json
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = ?err, "Command failed");
        eprintln!("Error: {err}");
        if let MonitorError::StartFailed {
            details: Some(details),
            ..
        } = &err
        {
            eprintln!("{details}");
        }
        process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), MonitorError> {
    let command = cli.command.unwrap_or(Command::Status { json: false });
    debug!(command = ?command, "Dispatching command");

    if let Command::Set { key, value } = &command {
        let store = JsonSettingsStore::at_default_location()?;
        // Accept bare JSON literals, fall back to a plain string.
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
        store.set(key, value).await?;
        println!("Saved {key} to {}", store.path().display());
        return Ok(());
    }

    let config = Config::load().await;
    let controller = LifecycleController::new(
        WatchdogClient::from_config(&config)?,
        config.start_policy(),
    );

    match command {
        Command::Status { json } => {
            let client = SyncthingClient::from_config(&config)?;
            let data = client.compose_payload().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_status(&data);
            }
        }
        Command::State => {
            println!("{}", controller.refresh_state().await?);
        }
        Command::Start => {
            controller.start().await?;
            println!("{}", controller.state());
        }
        Command::Stop => {
            println!("{}", controller.stop().await?);
        }
        Command::Toggle => {
            println!("{}", controller.toggle().await?);
        }
        Command::Detect => detect(controller.watchdog()).await?,
        Command::SetupCheck => {
            controller.setup_check().await?;
            println!("Syncthing can be started with the current settings");
        }
        Command::Set { .. } => {}
    }
    Ok(())
}

async fn detect(watchdog: &WatchdogClient) -> Result<(), MonitorError> {
    let (port, api_key, basic_auth) = tokio::join!(
        watchdog.check_scan_port(),
        watchdog.check_scan_apikey(),
        watchdog.check_scan_basic_auth(),
    );

    print_detection("port", port?);
    print_detection("api_key", api_key?);
    print_detection("basic_auth_user", basic_auth?);
    Ok(())
}

fn print_detection<T: std::fmt::Display>(name: &str, detection: Detection<T>) {
    match detection {
        Detection::Found(value) => println!("{name}: {value}"),
        Detection::NeedsManualInput { reason } => {
            println!("{name}: needs manual input ({reason})")
        }
        Detection::Failed { error } => println!("{name}: detection failed ({error})"),
    }
}

fn print_status(data: &SyncthingData) {
    let now = Utc::now();
    let overview = &data.overview;
    println!(
        "Syncthing {} on {}",
        overview.version.as_deref().unwrap_or("(unknown version)"),
        overview.my_id.as_deref().unwrap_or("(unknown device)"),
    );
    if let Some(uptime) = overview.uptime_seconds {
        println!("Up for {}", format_duration(uptime as u64));
    }
    println!(
        "Transfer: down {}  up {}",
        format_rate(data.total.in_bps.unwrap_or(0.0)),
        format_rate(data.total.out_bps.unwrap_or(0.0)),
    );

    println!("\nFolders:");
    for folder in &data.folders {
        let counters = &folder.record.counters;
        println!(
            "  {:<24} {:<18} {} of {}  watcher {:?}",
            folder.record.label,
            folder.status.label(),
            format_bytes(counters.local_bytes),
            format_bytes(counters.global_bytes),
            folder.watcher,
        );
    }

    println!("\nDevices:");
    for device in &data.devices {
        let seen = device
            .record
            .last_seen
            .map(|t| format_relative_time(t, now))
            .unwrap_or_else(|| "never".to_string());
        let rates = device
            .connection
            .as_ref()
            .filter(|c| c.connected)
            .map(|c| {
                format!(
                    "  down {} up {}",
                    format_rate(c.in_bps.unwrap_or(0.0)),
                    format_rate(c.out_bps.unwrap_or(0.0))
                )
            })
            .unwrap_or_default();
        println!(
            "  {:<24} {:<24} {:>3}%  seen {}{}",
            device.record.display_name(),
            device.status.label(),
            device.completion.total,
            seen,
            rates,
        );
    }
}
