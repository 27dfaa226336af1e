use crate::capture::gamepad::{GamepadAdapter, GamepadPoll};
use crate::capture::{hook, CaptureError};
use crate::config::TrackerConfig;
use crate::cue;
use crate::stats::SessionStats;
use crate::storage::recorder::{RecorderError, RecorderHandle};
use crate::storage::sqlite::SqliteStore;
use crate::storage::StoreError;
use crate::summary::{CategoryCounts, Presenter};
use statum::{machine, state, transition};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Session lifecycle. The whole process runs exactly one pass through
/// these states; gamepad disconnection only toggles a tracking flag
/// inside `Running` and never transitions the session.
#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[machine]
pub struct Session<SessionState> {
    config: TrackerConfig,
    recorder: RecorderHandle<SqliteStore>,
    accepting: Arc<AtomicBool>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
    started_at: Instant,
    gamepad: Option<GamepadAdapter>,
    gamepad_tracking: bool,
    stats: Option<SessionStats>,
    counts: Option<CategoryCounts>,
}

/// Forwards one interrupt delivery onto the shutdown watch.
///
/// Registered once at session start; both the hook thread and this task
/// hold the same sender, so either stop path lands on the watch the run
/// loop observes.
async fn forward_interrupt<F>(signal: F, shutdown: Arc<watch::Sender<bool>>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Interrupt received, ending session");
            let _ = shutdown.send(true);
        }
        Err(e) => warn!("Failed to listen for interrupt: {}", e),
    }
}

/// Tracking follows device presence, not event volume: an empty but
/// successful probe still means a device is attached.
fn device_available(poll: &GamepadPoll) -> bool {
    matches!(poll, GamepadPoll::Events(_))
}

impl Session<Idle> {
    /// Opens the event store and spawns the recorder; nothing is
    /// captured until [`start`](Self::start).
    pub fn create(config: TrackerConfig) -> Result<Self, SessionError> {
        let store = SqliteStore::open(&config.database_path)?;
        let recorder = RecorderHandle::spawn(store);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self::builder()
            .config(config)
            .recorder(recorder)
            .accepting(Arc::new(AtomicBool::new(true)))
            .shutdown_tx(Arc::new(shutdown_tx))
            .shutdown_rx(shutdown_rx)
            .started_at(Instant::now())
            .gamepad_tracking(false)
            .build())
    }
}

#[transition]
impl Session<Idle> {
    /// Installs the pointer/key hook and the interrupt listener, probes
    /// for a gamepad once and records the session start instant.
    pub fn start(mut self) -> Result<Session<Running>, SessionError> {
        cue::play(self.config.start_sound.as_ref());

        hook::spawn_listener(
            self.recorder.clone(),
            self.config.ender(),
            self.accepting.clone(),
            self.shutdown_tx.clone(),
        )?;
        tokio::spawn(forward_interrupt(
            tokio::signal::ctrl_c(),
            self.shutdown_tx.clone(),
        ));

        match GamepadAdapter::new(self.config.cooldown()) {
            Ok(adapter) => {
                self.gamepad_tracking = adapter.connected();
                if !self.gamepad_tracking {
                    info!("No gamepad found, gamepad tracking is disabled");
                }
                self.gamepad = Some(adapter);
            }
            Err(e) => {
                // Recoverable: the session runs on pointer/key capture alone.
                warn!("Gamepad interface unavailable: {}", e);
            }
        }

        self.started_at = Instant::now();
        info!(
            "Session started; press {} to stop",
            self.config.ender_key.to_uppercase()
        );
        Ok(self.transition())
    }
}

#[transition]
impl Session<Running> {
    /// Drives the gamepad poll loop until the shutdown watch fires,
    /// either from the ender key on the hook thread or from the
    /// interrupt task. Pointer/key events arrive independently on the
    /// hook thread the whole time.
    pub async fn run(mut self) -> Result<Session<Stopping>, SessionError> {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            // Back off to the retry interval while no device is attached
            // instead of busy-probing.
            let idle = if self.gamepad_tracking {
                self.config.input_delay()
            } else {
                self.config.gamepad_retry()
            };

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(idle) => {
                    self.poll_gamepad();
                }
            }
        }
        Ok(self.transition())
    }
}

impl Session<Running> {
    fn poll_gamepad(&mut self) {
        let Some(adapter) = self.gamepad.as_mut() else {
            return;
        };
        let poll = adapter.poll();

        let available = device_available(&poll);
        if available && !self.gamepad_tracking {
            info!("Gamepad found, tracking enabled");
        }
        if !available && self.gamepad_tracking {
            warn!("Gamepad disconnected, disabling gamepad tracking");
        }
        self.gamepad_tracking = available;

        if let GamepadPoll::Events(events) = poll {
            for event in events {
                if let Err(e) = self.recorder.record(event) {
                    warn!("Dropping gamepad event: {}", e);
                }
            }
        }
    }
}

#[transition]
impl Session<Stopping> {
    /// Stops the sources, drains the recorder and derives the final
    /// statistics. Statistics are computed only after the drain ack, so
    /// no summary ever races an in-flight write.
    pub async fn finish(mut self) -> Result<Session<Stopped>, SessionError> {
        self.accepting.store(false, Ordering::SeqCst);
        debug!("Sources stopped, draining recorder");

        let store = self.recorder.clone().shutdown().await?;
        let elapsed = self.started_at.elapsed();
        let stats = SessionStats::derive(self.recorder.count(), elapsed);
        let counts = CategoryCounts::from_store(&store)?;

        info!(
            "Session stopped: {} events in {:.2}s",
            stats.total_events,
            elapsed.as_secs_f64()
        );
        cue::play(self.config.end_sound.as_ref());

        self.stats = Some(stats);
        self.counts = Some(counts);
        Ok(self.transition())
    }
}

impl Session<Stopped> {
    /// Hands the aggregates to the presentation collaborator, once.
    pub fn present(&self, presenter: &dyn Presenter) {
        if let (Some(stats), Some(counts)) = (&self.stats, &self.counts) {
            presenter.show_summary(stats, counts);
        }
    }
}
