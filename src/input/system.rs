//! Unified handle for the complete input system.

use crate::config::{Config, ConfigError};
use crate::input::buttons::ButtonDispatcher;
use crate::input::consumer::{ConsumerError, ConsumerHandle};
use crate::input::sampler::{SamplerError, SamplerHandle, SamplerSettings};
use crate::input::source::{AxisSource, LevelSource};
use crate::input::{InputEvent, LineId, StrafeMode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Input system errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Sampler error: {0}")]
    SamplerError(#[from] SamplerError),

    #[error("Consumer error: {0}")]
    ConsumerError(#[from] ConsumerError),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

/// Public handle for the complete input system.
///
/// Owns the shared strafe flag and the shutdown token for both tasks. The
/// line notification queue is created by the embedder so its sender can be
/// hooked to the interrupt source before the consumer starts.
pub struct InputSystemHandle {
    strafe: StrafeMode,
    cancel: CancellationToken,
    sampler: SamplerHandle,
    consumer: ConsumerHandle,
}

impl InputSystemHandle {
    // Spawn both sampler and consumer
    pub fn spawn(
        config: &Config,
        axis_source: Box<dyn AxisSource>,
        level_source: Box<dyn LevelSource>,
        line_rx: mpsc::Receiver<LineId>,
        event_tx: mpsc::Sender<InputEvent>,
    ) -> Result<Self, InputError> {
        info!("Initializing input system");
        config.validate()?;

        let strafe = StrafeMode::new();
        let cancel = CancellationToken::new();
        let (horizontal, vertical) = config.translators();
        debug!(
            "Axis translators ready: {:?}, {:?}",
            horizontal.axis(),
            vertical.axis()
        );

        let sampler = SamplerHandle::spawn(
            Some(SamplerSettings {
                sample_interval_ms: config.sampling.interval_ms,
            }),
            axis_source,
            horizontal,
            vertical,
            strafe.clone(),
            event_tx.clone(),
            cancel.clone(),
        )?;

        let dispatcher = ButtonDispatcher::new(config.buttons.clone(), strafe.clone());
        let consumer =
            ConsumerHandle::spawn(line_rx, level_source, dispatcher, event_tx, cancel.clone())?;

        info!("Input system initialized successfully");
        Ok(Self {
            strafe,
            cancel,
            sampler,
            consumer,
        })
    }

    /// Handle to the shared strafe-mode flag.
    pub fn strafe_mode(&self) -> StrafeMode {
        self.strafe.clone()
    }

    /// Cancels both tasks and waits for them to finish.
    pub async fn shutdown(self) {
        info!("Stopping input system");
        self.cancel.cancel();
        self.sampler.join().await;
        self.consumer.join().await;
        info!("Input system stopped");
    }
}
