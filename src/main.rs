//! mixer-sync CLI
//!
//! Connects to a console, mirrors its state and prints or follows it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixer_sync::config::{AppConfig, ConfigWatcher};
use mixer_sync::{Mixer, MixerValue, StateUpdate, UpdateCallback};

/// mixer-sync - Mirror and control an X32/XAir console over OSC
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Console ip, overriding the config file
    #[arg(long, env = "MIXER_IP")]
    ip: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the console identity
    Info,
    /// Load the full state and print it as JSON
    Dump,
    /// Subscribe and print every change until Ctrl+C
    Watch,
    /// Set one parameter by state key, e.g. `/ch/1/mix_fader_db -6`
    Set { key: String, value: String },
    /// Recall a scene and print the reloaded state
    Scene { index: i32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting mixer-sync...");
    info!("Configuration file: {}", args.config);

    let (config, config_watcher) = if matches!(args.command, Command::Watch) {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded with hot-reload enabled");
        (config, Some(watcher))
    } else {
        (AppConfig::load(&args.config).await?, None)
    };

    let mixer = start_mixer(&config, args.ip.as_deref()).await?;
    run_command(&mixer, args.command, config, config_watcher).await?;
    mixer.shutdown().await?;

    info!("mixer-sync shutdown complete");
    Ok(())
}

async fn start_mixer(config: &AppConfig, ip: Option<&str>) -> Result<Mixer> {
    let mut settings = config.to_settings();
    if let Some(ip) = ip {
        settings.ip = ip.to_string();
    }

    let mixer = Mixer::connect(settings, config.device_profile()).context("Failed to create mixer client")?;
    if !mixer.startup().await? {
        anyhow::bail!(
            "No reply from {}:{}, check the console ip",
            mixer.settings().ip,
            mixer.settings().port
        );
    }
    Ok(mixer)
}

async fn run_command(
    mixer: &Mixer,
    command: Command,
    config: AppConfig,
    config_watcher: Option<ConfigWatcher>,
) -> Result<()> {
    match command {
        Command::Info => {
            if let Some(info) = mixer.info() {
                println!("\n{}", "=== Console ===".bold().cyan());
                println!("  Name:     {}", info.name.green());
                println!("  Model:    {}", info.model.green());
                println!("  Firmware: {}", info.firmware.green());
                println!("  IP:       {}", info.ip.green());
                println!("  Profile:  {}", mixer.profile().name.yellow());
            }
        }
        Command::Dump => {
            load_and_settle(mixer, None).await?;
            print_state(mixer)?;
        }
        Command::Set { key, value } => {
            let value: MixerValue = value.parse().unwrap_or_else(|never| match never {});
            mixer.set_value(&key, value).await?;
            match mixer.state(&key) {
                Some(confirmed) => println!("{} = {}", key.yellow(), confirmed.to_string().green()),
                None => println!("{} {}", key.yellow(), "(no readback)".red()),
            }
        }
        Command::Scene { index } => {
            load_and_settle(mixer, Some(index)).await?;
            print_state(mixer)?;
        }
        Command::Watch => {
            let config_watcher = config_watcher.context("Config watcher not started")?;
            run_watch(mixer, config, config_watcher, shutdown_signal()).await?;
        }
    }
    Ok(())
}

/// Reload (or recall a scene) and give the last replies time to arrive
async fn load_and_settle(mixer: &Mixer, scene: Option<i32>) -> Result<()> {
    match scene {
        Some(index) => mixer.load_scene(index).await?,
        None => mixer.reload().await?,
    }
    tokio::time::sleep(mixer.settings().query_timeout).await;
    Ok(())
}

fn print_state(mixer: &Mixer) -> Result<()> {
    let json = serde_json::to_string_pretty(&mixer.state_snapshot()).context("Failed to serialize state")?;
    println!("{}", json);
    Ok(())
}

async fn run_watch(
    mixer: &Mixer,
    mut config: AppConfig,
    mut config_watcher: ConfigWatcher,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    load_and_settle(mixer, None).await?;
    info!("Loaded {} state keys", mixer.state_snapshot().len());

    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<StateUpdate>();
    let callback: UpdateCallback = Arc::new(move |update: &StateUpdate| {
        let _ = update_tx.send(update.clone());
    });
    mixer.subscribe(callback).await?;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(update) = update_rx.recv() => {
                println!("{} {}", update.property.yellow(), update.value.to_string().green());
            }

            Some(new_config) = config_watcher.next_config() => {
                info!("📝 Configuration file changed, reloading...");
                let profile = new_config.device_profile();
                if profile != config.device_profile() {
                    match mixer.apply_profile(profile).await {
                        Ok(()) => info!("✅ Device profile applied"),
                        Err(e) => warn!("⚠️  Failed to apply profile: {}", e),
                    }
                }
                config = new_config;
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
