pub mod config;
pub mod hw;
pub mod input;

use crate::config::Config;
use crate::hw::{ButtonLines, Mcp3208};
use crate::input::InputSystemHandle;
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = Config::load_or_default()?;
    info!("Input configuration: {:?}", config);

    // Engine event queue. Nothing consumes it here yet; the drain task below
    // logs the stream so the wiring can be exercised on real hardware.
    let (event_tx, mut event_rx) = mpsc::channel(config.sampling.engine_queue_depth);
    let (line_tx, line_rx) = mpsc::channel(config.sampling.line_queue_depth);

    info!("Bringing up joystick ADC and button lines");
    let adc = Mcp3208::open(config.horizontal.channel, config.vertical.channel)?;
    let mut lines = ButtonLines::claim(&config.buttons)?;
    lines.watch(line_tx)?;

    let input =
        InputSystemHandle::spawn(&config, Box::new(adc), Box::new(lines), line_rx, event_tx)?;

    let drain = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!("Input event: {:?} {:?}", event.kind, event.key);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    input.shutdown().await;
    let _ = drain.await;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
