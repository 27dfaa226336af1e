use super::{EventStore, StoreError};
use crate::event::InputEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Headroom for burst input; producers never block on a healthy writer.
const QUEUE_CAPACITY: usize = 1024;

/// Insert attempts before the writer gives up.
const WRITE_ATTEMPTS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Recorder queue full, event not accepted")]
    QueueFull,

    #[error("Recorder is no longer running")]
    Closed,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

enum RecorderCommand<S> {
    Record(InputEvent),
    Shutdown { ack: oneshot::Sender<S> },
}

/// Handle to the single-writer recording sink.
///
/// All source adapters converge here. Events are enqueued onto a FIFO
/// channel and drained by one blocking writer task that owns the store,
/// so two concurrent `record` calls never interleave partial writes and
/// arrival order at the queue is the persisted order. The running count
/// is incremented atomically with a successful enqueue; because the
/// writer retries failed inserts and a writer failure is fatal to the
/// session, the count equals the persisted rows whenever a summary is
/// produced.
pub struct RecorderHandle<S: EventStore> {
    sender: mpsc::Sender<RecorderCommand<S>>,
    count: Arc<AtomicU64>,
}

impl<S: EventStore> Clone for RecorderHandle<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            count: self.count.clone(),
        }
    }
}

impl<S: EventStore> RecorderHandle<S> {
    /// Takes ownership of the store and spawns the writer task.
    pub fn spawn(mut store: S) -> Self {
        let (sender, mut receiver) = mpsc::channel::<RecorderCommand<S>>(QUEUE_CAPACITY);
        let count = Arc::new(AtomicU64::new(0));

        tokio::task::spawn_blocking(move || {
            info!("Recorder writer started");
            while let Some(command) = receiver.blocking_recv() {
                match command {
                    RecorderCommand::Record(event) => {
                        if let Err(e) = write_with_retry(&mut store, &event) {
                            error!("Giving up on persistence after retries: {}", e);
                            // Dropping the receiver makes every further
                            // record() surface RecorderError::Closed.
                            return;
                        }
                    }
                    RecorderCommand::Shutdown { ack } => {
                        debug!("Recorder queue drained, handing store back");
                        if ack.send(store).is_err() {
                            warn!("Shutdown requester went away before drain completed");
                        }
                        return;
                    }
                }
            }
            info!("Recorder writer finished");
        });

        Self { sender, count }
    }

    /// Accepts an event for persistence. Never blocks the caller; callable
    /// from both tokio tasks and plain OS threads (the rdev hook thread).
    pub fn record(&self, event: InputEvent) -> Result<(), RecorderError> {
        match self.sender.try_send(RecorderCommand::Record(event)) {
            Ok(()) => {
                self.count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(RecorderError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(RecorderError::Closed),
        }
    }

    /// Events accepted so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Drains the queue and returns the store once every accepted event
    /// is persisted. The FIFO channel guarantees the shutdown command is
    /// seen only after all prior records, so the ack is the join point
    /// summaries wait on.
    pub async fn shutdown(self) -> Result<S, RecorderError> {
        let (ack, drained) = oneshot::channel();
        self.sender
            .send(RecorderCommand::Shutdown { ack })
            .await
            .map_err(|_| RecorderError::Closed)?;
        drained.await.map_err(|_| RecorderError::Closed)
    }
}

fn write_with_retry<S: EventStore>(store: &mut S, event: &InputEvent) -> Result<(), StoreError> {
    let mut last_err = None;
    for attempt in 1..=WRITE_ATTEMPTS {
        match store.insert(event) {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(
                    "Insert attempt {}/{} failed: {}",
                    attempt, WRITE_ATTEMPTS, e
                );
                last_err = Some(e);
                std::thread::sleep(std::time::Duration::from_millis(50 * attempt as u64));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| StoreError::Insert("unknown".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, InputEvent};
    use crate::storage::sqlite::SqliteStore;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_yield_exact_rows() {
        let store = SqliteStore::open_in_memory().expect("open");
        let recorder = RecorderHandle::spawn(store);

        const PRODUCERS: usize = 8;
        const EVENTS_EACH: usize = 50;

        let mut tasks = Vec::new();
        for producer in 0..PRODUCERS {
            let handle = recorder.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..EVENTS_EACH {
                    handle
                        .record(InputEvent::new(
                            EventCategory::Key,
                            format!("Key Pressed: p{}e{}", producer, i),
                        ))
                        .expect("record");
                    // Yield to force interleavings between producers.
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.expect("producer task");
        }

        let expected = (PRODUCERS * EVENTS_EACH) as u64;
        assert_eq!(recorder.count(), expected);

        let store = recorder.shutdown().await.expect("drain");
        assert_eq!(store.count(None).expect("count"), expected);
    }

    #[tokio::test]
    async fn per_source_order_is_preserved() {
        let store = SqliteStore::open_in_memory().expect("open");
        let recorder = RecorderHandle::spawn(store);

        for i in 0..10 {
            recorder
                .record(InputEvent::new(
                    EventCategory::Key,
                    format!("Key Pressed: {}", i),
                ))
                .expect("record");
        }

        let store = recorder.shutdown().await.expect("drain");
        let details = store.details_in_order().expect("rows");
        let expected: Vec<String> = (0..10).map(|i| format!("Key Pressed: {}", i)).collect();
        assert_eq!(details, expected);
    }

    #[tokio::test]
    async fn shutdown_waits_for_the_queue_to_drain() {
        let store = SqliteStore::open_in_memory().expect("open");
        let recorder = RecorderHandle::spawn(store);

        for i in 0..200 {
            recorder
                .record(InputEvent::new(
                    EventCategory::Gamepad,
                    format!("Gamepad Button: South pressed #{}", i),
                ))
                .expect("record");
        }
        // Returned store must already contain every enqueued event.
        let store = recorder.shutdown().await.expect("drain");
        assert_eq!(store.count(Some(EventCategory::Gamepad)).unwrap(), 200);
    }

    #[tokio::test]
    async fn record_after_shutdown_is_rejected() {
        let store = SqliteStore::open_in_memory().expect("open");
        let recorder = RecorderHandle::spawn(store);
        let survivor = recorder.clone();

        recorder.shutdown().await.expect("drain");
        // The writer exited; leftover handles cannot enqueue anymore.
        let err = survivor
            .record(InputEvent::new(EventCategory::Key, "Key Pressed: z"))
            .expect_err("writer is gone");
        assert!(matches!(err, RecorderError::Closed));
    }
}
