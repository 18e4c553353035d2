use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gateway_radio::logging::init_logging;
use gateway_radio::{ActionOutcome, GatewayRadio, PlaybackState, RadioPlayer};
use tokio::signal;
use tracing::info;

mod args;

use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.logging_mode()) {
        eprintln!("Warning: {}", e);
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = args.resolve_config()?;
    let radio = GatewayRadio::setup(config)
        .await
        .context("Failed to set up the gateway radio")?;
    let player = radio.player();

    let code = match args.command {
        Command::Info => {
            print_info(&player);
            ExitCode::SUCCESS
        }
        Command::Status => report(player.update().await),
        Command::On => report(player.turn_on().await),
        Command::Off => report(player.turn_off().await),
        Command::Volume { level } => report(player.set_volume_level(level).await),
        Command::Up => step(&player, true).await,
        Command::Down => step(&player, false).await,
        Command::Mute => report(player.mute_volume(true).await),
        Command::Unmute => report(player.mute_volume(false).await),
        Command::Next => report(player.media_next_track().await),
        Command::Watch { .. } => {
            watch(&radio).await;
            ExitCode::SUCCESS
        }
    };

    radio.unload().await;
    Ok(code)
}

/// Refresh first so the step starts from the device's actual volume
async fn step(player: &RadioPlayer, up: bool) -> ExitCode {
    let refreshed = player.update().await;
    if !refreshed.is_success() {
        return report(refreshed);
    }

    if up {
        report(player.volume_up().await)
    } else {
        report(player.volume_down().await)
    }
}

async fn watch(radio: &GatewayRadio) {
    radio.start_polling();
    let Some(mut states) = radio.subscribe() else {
        return;
    };

    info!(
        "Watching {} every {}s, press Ctrl+C to stop",
        radio.player().name(),
        radio.config().poll_interval_secs
    );

    let mut shutdown = Box::pin(signal::ctrl_c());
    let mut last: Option<PlaybackState> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal, stopping");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                if last != Some(state) {
                    print_state(&state);
                    last = Some(state);
                }
            }
        }
    }
}

fn report(outcome: ActionOutcome) -> ExitCode {
    match &outcome.error {
        None => {
            print_state(&outcome.state);
            ExitCode::SUCCESS
        }
        Some(error) => {
            eprintln!("{}: {}", outcome.action.failure_message(), error);
            ExitCode::FAILURE
        }
    }
}

fn print_state(state: &PlaybackState) {
    println!(
        "power: {:<8} volume: {:>3}%  muted: {:<5}  {}",
        state.power.to_string(),
        state.volume_units(),
        state.muted,
        if state.is_available() { "available" } else { "unavailable" }
    );
}

fn print_info(player: &RadioPlayer) {
    let identity = player.identity();
    println!("{}", player.name());
    println!("  unique id:  {}", player.unique_id());
    println!("  model:      {}", identity.model());
    println!("  firmware:   {}", identity.firmware_version());
    println!("  hardware:   {}", identity.hardware_version());
    println!("  mac:        {}", identity.mac_address());
    println!("  features:   {:?}", player.supported_features());

    match serde_json::to_string_pretty(&player.extra_state_attributes()) {
        Ok(attributes) => println!("  attributes: {}", attributes),
        Err(e) => eprintln!("Could not render attributes: {}", e),
    }
}
