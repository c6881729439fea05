//! Spooldesk Display - terminal readout for a spool-scale device.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spooldesk_display::application::parse_console_command;
use spooldesk_display::infrastructure::CommandBus;
use spooldesk_display::{
    ConnectionManager, ConsoleSurface, Dispatcher, DisplayConfig, LivenessEmitter,
    TungsteniteConnector,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spooldesk_display=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DisplayConfig::from_env()?;
    tracing::info!(
        endpoint = %config.endpoint(),
        reconnect_ms = config.reconnect_delay.as_millis() as u64,
        heartbeat_ms = config.heartbeat_interval.as_millis() as u64,
        "Starting Spooldesk display"
    );

    let manager = ConnectionManager::new(
        TungsteniteConnector::new(),
        config.endpoint(),
        config.reconnect_delay,
        Dispatcher::new(ConsoleSurface::stdout()),
    );

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        ctrl_c.cancel();
    });

    spawn_console_reader(manager.command_bus());

    manager
        .run(LivenessEmitter::new(config.heartbeat_interval), shutdown)
        .await;

    tracing::info!("Spooldesk display stopped");
    Ok(())
}

/// Forward operator commands typed on stdin to the device.
///
/// Runs on its own thread so a pending read never holds up shutdown.
fn spawn_console_reader(commands: CommandBus) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to read console input: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_console_command(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                None => tracing::warn!("Unknown command: {}", line.trim()),
            }
        }
    });
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let _ = dotenvy::from_filename(filename);
    }
}
