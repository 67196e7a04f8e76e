//! Button line-change consumer task.
//!
//! Interrupt callbacks only push a line id into a bounded queue; this task
//! drains it, re-reads the settled level, and dispatches the outcome.

use crate::input::buttons::ButtonDispatcher;
use crate::input::source::LevelSource;
use crate::input::{InputEvent, LineId};
use statum::{machine, state};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Consumer errors
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("Line notification queue closed")]
    QueueClosed,

    #[error("Engine event queue closed")]
    SinkClosed,
}

// Define consumer states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum ConsumeState {
    Initializing,
    Consuming,
}

#[machine]
pub struct LineConsumer<S: ConsumeState> {
    // Bounded queue fed by the interrupt callbacks
    line_rx: mpsc::Receiver<LineId>,

    // Level re-read backend
    levels: Box<dyn LevelSource>,

    // Static binding table plus the strafe flag
    dispatcher: ButtonDispatcher,

    // Engine event queue
    event_tx: mpsc::Sender<InputEvent>,

    // Cooperative shutdown signal
    cancel: CancellationToken,
}

// Implementation for Initializing state
impl LineConsumer<Initializing> {
    pub fn create(
        line_rx: mpsc::Receiver<LineId>,
        levels: Box<dyn LevelSource>,
        dispatcher: ButtonDispatcher,
        event_tx: mpsc::Sender<InputEvent>,
        cancel: CancellationToken,
    ) -> Self {
        debug!("Creating line consumer");
        Self::new(line_rx, levels, dispatcher, event_tx, cancel)
    }

    // Transition to the Consuming state
    pub fn initialize(self) -> LineConsumer<Consuming> {
        info!("Line consumer initialized, transitioning to Consuming state");
        self.transition()
    }
}

// Implementation for Consuming state
impl LineConsumer<Consuming> {
    /// Blocks on the line queue until cancelled.
    pub async fn run_consume_loop(&mut self) -> Result<(), ConsumerError> {
        info!("Starting line consumer loop");

        loop {
            let line = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Line consumer stopping");
                    return Ok(());
                }
                line = self.line_rx.recv() => match line {
                    Some(line) => line,
                    None => {
                        error!("Line notification queue closed");
                        return Err(ConsumerError::QueueClosed);
                    }
                }
            };

            self.handle_line(line)?;
        }
    }

    // The level is re-read here rather than taken from the edge that raised
    // the interrupt; a line that bounces back before this task runs is seen
    // at its settled level and the intermediate edge is lost.
    fn handle_line(&mut self, line: LineId) -> Result<(), ConsumerError> {
        let level = match self.levels.read_level(line) {
            Ok(level) => level,
            Err(e) => {
                warn!("Level read failed for line {}: {}", line, e);
                return Ok(());
            }
        };
        debug!("Line {} settled at {:?}", line, level);

        for event in self.dispatcher.on_line_change(line, level) {
            match self.event_tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    warn!("Engine event queue full, dropping {:?}", event);
                }
                Err(TrySendError::Closed(_)) => {
                    error!("Engine event queue closed, stopping consumer");
                    return Err(ConsumerError::SinkClosed);
                }
            }
        }

        Ok(())
    }
}

// Public interface for spawning and running the consumer
pub struct ConsumerHandle {
    task: tokio::task::JoinHandle<()>,
}

impl ConsumerHandle {
    // Create a new consumer and spawn it as a tokio task
    pub fn spawn(
        line_rx: mpsc::Receiver<LineId>,
        levels: Box<dyn LevelSource>,
        dispatcher: ButtonDispatcher,
        event_tx: mpsc::Sender<InputEvent>,
        cancel: CancellationToken,
    ) -> Result<Self, ConsumerError> {
        info!("Spawning line consumer");

        let consumer = LineConsumer::create(line_rx, levels, dispatcher, event_tx, cancel);

        let task = tokio::spawn(async move {
            let mut consuming = consumer.initialize();
            if let Err(e) = consuming.run_consume_loop().await {
                error!("Consumer task terminated with error: {}", e);
            }
        });

        info!("Line consumer successfully started");
        Ok(Self { task })
    }

    /// Waits for the consumer task to finish after cancellation.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Consumer task panicked: {}", e);
        }
    }
}
