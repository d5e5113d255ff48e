//! obae - Download osu! beatmap sets and extract their background artwork
//!
//! Thin caller around the ops crate: validates the input, runs one
//! orchestration and writes the artwork it returns.

mod cli;
mod error;
mod logging;
mod output;

use crate::cli::Cli;
use crate::error::CliError;
use clap::Parser;
use obae_config::Config;
use obae_errors::InputError;
use obae_events::EventReceiver;
use obae_ops::{OpsContextBuilder, OpsCtx};
use obae_types::{BeatmapId, OrchestrationResult, SessionCredential};
use std::path::PathBuf;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    init_tracing(json_mode, cli.debug);

    if let Err(e) = run(cli, json_mode).await {
        error!("Application error: {}", e);
        if json_mode {
            println!(
                "{}",
                serde_json::json!({ "success": false, "message": e.to_string() })
            );
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli, json_mode: bool) -> Result<(), CliError> {
    info!("Starting obae v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);
    config.validate()?;

    // Invalid input never reaches the orchestrator
    let id = parse_input(&config, &cli.input)?;
    let credential = cli.cookie.clone().and_then(SessionCredential::new);

    let (event_sender, event_receiver) = obae_events::channel();
    let ctx = OpsContextBuilder::new()
        .with_config(config.clone())
        .with_event_sender(event_sender)
        .build()?;

    let result = download_with_events(ctx, id, credential, event_receiver).await;

    match result {
        OrchestrationResult::Success { name, images } => {
            let output_dir = config.general.output_dir();
            let written = output::write_images(&output_dir, &name, &images).await?;
            render_success(&name, &written, json_mode);
            info!("Command completed successfully");
            Ok(())
        }
        OrchestrationResult::Failure { message } => Err(CliError::Download(message)),
    }
}

fn parse_input(config: &Config, input: &str) -> Result<BeatmapId, InputError> {
    if input.trim().is_empty() {
        return Err(InputError::Empty);
    }
    config
        .identifier
        .policy
        .parse(input)
        .ok_or_else(|| InputError::InvalidIdentifier {
            input: input.to_string(),
        })
}

/// Run the download while logging events as they arrive
async fn download_with_events(
    ctx: OpsCtx,
    id: BeatmapId,
    credential: Option<SessionCredential>,
    mut event_receiver: EventReceiver,
) -> OrchestrationResult {
    let mut download = Box::pin(async move { ctx.download(&id, credential.as_ref()).await });

    loop {
        select! {
            result = &mut download => {
                while let Ok(message) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&message);
                }
                return result;
            }

            message = event_receiver.recv() => {
                if let Some(message) = message {
                    logging::log_event_with_tracing(&message);
                }
            }
        }
    }
}

fn render_success(name: &str, written: &[PathBuf], json_mode: bool) {
    if json_mode {
        let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        println!(
            "{}",
            serde_json::json!({ "success": true, "name": name, "images": files })
        );
        return;
    }

    if written.is_empty() {
        println!("{name}: no artwork found in the beatmap set");
        return;
    }
    println!("{name}: saved {} image(s)", written.len());
    for path in written {
        println!("  {}", path.display());
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "debug"
    } else {
        "info,obae=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // Logs go to stderr so stdout carries only the result
    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if !cli.mirrors.is_empty() {
        config.mirrors.order.clone_from(&cli.mirrors);
    }
    if let Some(secs) = cli.timeout {
        config.mirrors.per_mirror_timeout_secs = secs;
    }
    if let Some(dir) = &cli.working_dir {
        config.general.working_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.general.output_dir = Some(dir.clone());
    }
}
