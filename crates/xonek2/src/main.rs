use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use xonek2_core::{
    AsyncModule, ConfigManager, ModuleEvent, ModuleMessage, SessionCommand, SessionState,
};
use xonek2_surface::K2SurfaceModule;

/// Xone:K2 control surface driver.
///
/// Connects to the hardware over MIDI and drives a loopback session, so the
/// surface can be exercised end-to-end without a host attached.
#[derive(Parser, Debug)]
#[command(name = "xonek2")]
#[command(about = "Xone:K2 control surface driver")]
struct Args {
    /// Substring to match the K2's MIDI port names
    #[arg(long)]
    device: Option<String>,

    /// Zero-indexed MIDI channel (hardware default is channel 15, i.e. 14)
    #[arg(long)]
    channel: Option<u8>,

    /// Path to the settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut config = ConfigManager::new(args.config).context("loading settings")?;
    if let Some(device) = args.device {
        config.settings_mut().midi_device = device;
    }
    if let Some(channel) = args.channel {
        anyhow::ensure!(channel <= 15, "midi channel {channel} out of range (0-15)");
        config.settings_mut().midi_channel = channel;
    }
    let settings = config.settings().clone();
    tracing::info!(
        "Using device '{}' on channel {}",
        settings.midi_device,
        settings.midi_channel
    );

    let mut session = SessionState::with_eq_devices(settings.visible_tracks);

    let mut module = K2SurfaceModule::new(settings);
    module
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("surface initialization failed: {e}"))?;

    let (event_tx, event_rx) = mpsc::channel(1000);
    let (message_tx, mut message_rx) = mpsc::channel(1000);

    let handle = tokio::spawn(async move {
        let result = module.run(event_rx, message_tx).await;
        (module, result)
    });

    // Sync the LEDs to the session's current state before any input arrives.
    for event in session.snapshot_events() {
        event_tx
            .send(ModuleEvent::Session(event))
            .await
            .context("seeding surface state")?;
    }

    loop {
        tokio::select! {
            Some(message) = message_rx.recv() => match message {
                ModuleMessage::Command(command) => {
                    tracing::debug!("Surface command: {command:?}");
                    if !forward_command(&mut session, &command, &event_tx).await {
                        tracing::warn!("Surface stopped accepting events");
                        break;
                    }
                }
                ModuleMessage::Status(status) => tracing::info!("Surface status: {status}"),
                ModuleMessage::Error(error) => tracing::warn!("Surface error: {error}"),
            },

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    let _ = event_tx.send(ModuleEvent::Shutdown).await;
    let (mut module, result) = handle.await.context("joining surface task")?;
    if let Err(e) = result {
        tracing::error!("Surface run loop failed: {e}");
    }
    module
        .shutdown()
        .await
        .map_err(|e| anyhow::anyhow!("surface shutdown failed: {e}"))?;

    Ok(())
}

/// Applies one surface command to the session and forwards the resulting
/// events back. Returns false once the surface stops accepting events.
async fn forward_command(
    session: &mut SessionState,
    command: &SessionCommand,
    event_tx: &mpsc::Sender<ModuleEvent>,
) -> bool {
    for event in session.apply(command) {
        if event_tx.send(ModuleEvent::Session(event)).await.is_err() {
            return false;
        }
    }
    true
}
