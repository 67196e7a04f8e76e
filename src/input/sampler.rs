//! Periodic joystick sampling task.

use crate::input::axis::AxisTranslator;
use crate::input::source::AxisSource;
use crate::input::{AxisKind, InputEvent, StrafeMode};
use chrono::Local;
use statum::{machine, state};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Sampler settings
#[derive(Clone, Debug)]
pub struct SamplerSettings {
    pub sample_interval_ms: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 50,
        }
    }
}

/// Sampler errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Failed to initialize sampler: {0}")]
    InitializationError(String),

    #[error("Engine event queue closed")]
    SinkClosed,
}

// Define sampler states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum SamplingState {
    Initializing,
    Sampling,
}

#[machine]
pub struct JoystickSampler<S: SamplingState> {
    // Sampler settings
    settings: SamplerSettings,

    // Raw sample source (ADC backend or a test double)
    source: Box<dyn AxisSource>,

    // Per-axis hysteresis translators
    horizontal: AxisTranslator,
    vertical: AxisTranslator,

    // Shared strafe-mode flag, read at the top of each cycle
    strafe: StrafeMode,

    // Engine event queue
    event_tx: mpsc::Sender<InputEvent>,

    // Cooperative shutdown signal
    cancel: CancellationToken,
}

// Implementation for Initializing state
impl JoystickSampler<Initializing> {
    pub fn create(
        settings: Option<SamplerSettings>,
        source: Box<dyn AxisSource>,
        horizontal: AxisTranslator,
        vertical: AxisTranslator,
        strafe: StrafeMode,
        event_tx: mpsc::Sender<InputEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating joystick sampler with settings: {:?}", settings);

        Self::new(
            settings, source, horizontal, vertical, strafe, event_tx, cancel,
        )
    }

    // Transition to the Sampling state
    pub fn initialize(self) -> JoystickSampler<Sampling> {
        info!(
            "Joystick sampler initialized ({} ms interval), transitioning to Sampling state",
            self.settings.sample_interval_ms
        );
        self.transition()
    }
}

// Implementation for Sampling state
impl JoystickSampler<Sampling> {
    /// Runs until cancelled or the engine queue goes away.
    pub async fn run_sampling_loop(&mut self) -> Result<(), SamplerError> {
        info!("Starting joystick sampling loop");

        let mut ticker = tokio::time::interval(tokio::time::Duration::from_millis(
            self.settings.sample_interval_ms,
        ));

        // For performance monitoring
        let mut sample_count: u64 = 0;
        let mut event_count: u64 = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(30);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Joystick sampler stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            event_count += self.sample_once()? as u64;
            sample_count += 1;

            // Log performance stats periodically
            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Sampler stats: {} samples, {} events in last {} seconds",
                    sample_count,
                    event_count,
                    (now - last_log_time).num_seconds()
                );
                sample_count = 0;
                event_count = 0;
                last_log_time = now;
            }
        }
    }

    // Read both axes once and post whatever edges they produce. A failed
    // axis read skips that axis for the cycle; the loop keeps running.
    fn sample_once(&mut self) -> Result<usize, SamplerError> {
        let strafe = self.strafe.engaged();
        let mut emitted = 0;

        for axis in [AxisKind::Horizontal, AxisKind::Vertical] {
            let raw = match self.source.read_axis(axis) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Axis {:?} read failed: {}", axis, e);
                    continue;
                }
            };

            let translator = match axis {
                AxisKind::Horizontal => &mut self.horizontal,
                AxisKind::Vertical => &mut self.vertical,
            };

            for event in translator.feed(raw, strafe) {
                match self.event_tx.try_send(event) {
                    Ok(()) => emitted += 1,
                    Err(TrySendError::Full(event)) => {
                        warn!("Engine event queue full, dropping {:?}", event);
                    }
                    Err(TrySendError::Closed(_)) => {
                        error!("Engine event queue closed, stopping sampler");
                        return Err(SamplerError::SinkClosed);
                    }
                }
            }
        }

        Ok(emitted)
    }
}

// Public interface for spawning and running the sampler
pub struct SamplerHandle {
    task: tokio::task::JoinHandle<()>,
}

impl SamplerHandle {
    // Create a new sampler and spawn it as a tokio task
    pub fn spawn(
        settings: Option<SamplerSettings>,
        source: Box<dyn AxisSource>,
        horizontal: AxisTranslator,
        vertical: AxisTranslator,
        strafe: StrafeMode,
        event_tx: mpsc::Sender<InputEvent>,
        cancel: CancellationToken,
    ) -> Result<Self, SamplerError> {
        info!("Spawning joystick sampler with settings: {:?}", settings);

        let sampler = JoystickSampler::create(
            settings, source, horizontal, vertical, strafe, event_tx, cancel,
        );

        let task = tokio::spawn(async move {
            let mut sampling = sampler.initialize();
            if let Err(e) = sampling.run_sampling_loop().await {
                error!("Sampler task terminated with error: {}", e);
            }
        });

        info!("Joystick sampler successfully started");
        Ok(Self { task })
    }

    /// Waits for the sampler task to finish after cancellation.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Sampler task panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::axis::{AxisConfig, AxisKeymap};
    use crate::input::source::SourceError;
    use crate::input::{EdgeKind, LogicalKey};
    use std::collections::VecDeque;

    // Replays a scripted sequence of (horizontal, vertical) sample pairs,
    // holding the last pair once the script runs out.
    struct ScriptedAxes {
        script: VecDeque<(u16, u16)>,
        last: (u16, u16),
    }

    impl ScriptedAxes {
        fn new(script: &[(u16, u16)]) -> Self {
            Self {
                script: script.to_vec().into(),
                last: *script.last().unwrap(),
            }
        }
    }

    impl AxisSource for ScriptedAxes {
        fn read_axis(&mut self, axis: AxisKind) -> Result<u16, SourceError> {
            if let AxisKind::Horizontal = axis {
                if let Some(pair) = self.script.pop_front() {
                    self.last = pair;
                }
            }
            Ok(match axis {
                AxisKind::Horizontal => self.last.0,
                AxisKind::Vertical => self.last.1,
            })
        }
    }

    fn translators() -> (AxisTranslator, AxisTranslator) {
        let config = AxisConfig::new(2048, 600, 200).unwrap();
        (
            AxisTranslator::new(AxisKind::Horizontal, config, AxisKeymap::horizontal()),
            AxisTranslator::new(AxisKind::Vertical, config, AxisKeymap::vertical()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_sweep_reaches_engine_queue() {
        let source = ScriptedAxes::new(&[(2048, 2048), (1300, 2048), (1300, 2048), (2048, 2048)]);
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (horizontal, vertical) = translators();
        let strafe = StrafeMode::new();
        let cancel = CancellationToken::new();

        let handle = SamplerHandle::spawn(
            None,
            Box::new(source),
            horizontal,
            vertical,
            strafe,
            event_tx,
            cancel.clone(),
        )
        .unwrap();

        let press = event_rx.recv().await.unwrap();
        assert_eq!(press.kind, EdgeKind::Pressed);
        assert_eq!(press.key, LogicalKey::MoveLeft);

        let release = event_rx.recv().await.unwrap();
        assert_eq!(release.kind, EdgeKind::Released);
        assert_eq!(release.key, LogicalKey::MoveLeft);

        cancel.cancel();
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn both_axes_report_in_one_cycle() {
        // Both axes pushed past their entry bounds from the first sample.
        let source = ScriptedAxes::new(&[(1300, 3000)]);
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (horizontal, vertical) = translators();
        let cancel = CancellationToken::new();

        let handle = SamplerHandle::spawn(
            None,
            Box::new(source),
            horizontal,
            vertical,
            StrafeMode::new(),
            event_tx,
            cancel.clone(),
        )
        .unwrap();

        let first = event_rx.recv().await.unwrap();
        let second = event_rx.recv().await.unwrap();
        assert_eq!(first, InputEvent::pressed(LogicalKey::MoveLeft));
        assert_eq!(second, InputEvent::pressed(LogicalKey::MoveDown));

        cancel.cancel();
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_stops_on_cancellation() {
        let source = ScriptedAxes::new(&[(2048, 2048)]);
        let (event_tx, _event_rx) = mpsc::channel(16);
        let (horizontal, vertical) = translators();
        let cancel = CancellationToken::new();

        let handle = SamplerHandle::spawn(
            None,
            Box::new(source),
            horizontal,
            vertical,
            StrafeMode::new(),
            event_tx,
            cancel.clone(),
        )
        .unwrap();

        cancel.cancel();
        handle.join().await;
    }
}
