use anyhow::Context;
use futures::StreamExt;
use rallywire::{ListenerConfig, OverlayFrame, TelemetryListener, UpdateRate, shutdown_signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Frames per second pushed to the overlay.
const OVERLAY_RATE: UpdateRate = UpdateRate::Max(30);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ListenerConfig::load().context("loading listener configuration")?;
    let mut listener = TelemetryListener::start(&config)
        .await
        .with_context(|| format!("starting telemetry listener on {}", config.addr))?;

    let mut frames = listener.subscribe_with_rate(OVERLAY_RATE);
    let printer = tokio::spawn(async move {
        while let Some(sample) = frames.next().await {
            match OverlayFrame::from(&sample).to_json() {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Dropping overlay frame: {}", e),
            }
        }
    });

    let stats = listener.run_until(shutdown_signal()).await?;
    printer.await.context("overlay printer task")?;

    if let Some(stats) = stats {
        info!(
            datagrams = stats.datagrams,
            published = stats.published,
            decode_failures = stats.decode_failures,
            receive_errors = stats.receive_errors,
            "Shut down cleanly"
        );
    }
    Ok(())
}
