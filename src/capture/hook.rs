use super::keyboard::KeyAdapter;
use super::{pointer, CaptureError};
use crate::storage::recorder::RecorderHandle;
use crate::storage::EventStore;
use rdev::{EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Routes raw hook events to the pointer and keyboard translators.
///
/// rdev exposes a single global stream for mouse and keyboard, so one
/// dispatcher serves both push-model adapters. It tracks the cursor
/// from move events (presses report no position of their own), honours
/// the `accepting` flag once shutdown begins, and fires the shutdown
/// watch after the ender keypress has been recorded.
pub struct HookDispatcher<S: EventStore> {
    recorder: RecorderHandle<S>,
    keys: KeyAdapter,
    accepting: Arc<AtomicBool>,
    shutdown: Arc<watch::Sender<bool>>,
    cursor: (f64, f64),
}

impl<S: EventStore> HookDispatcher<S> {
    pub fn new(
        recorder: RecorderHandle<S>,
        ender: Key,
        accepting: Arc<AtomicBool>,
        shutdown: Arc<watch::Sender<bool>>,
    ) -> Self {
        Self {
            recorder,
            keys: KeyAdapter::new(ender),
            accepting,
            shutdown,
            cursor: (0.0, 0.0),
        }
    }

    pub fn dispatch(&mut self, event: rdev::Event) {
        if let EventType::MouseMove { x, y } = event.event_type {
            self.cursor = (x, y);
            return;
        }
        if !self.accepting.load(Ordering::SeqCst) {
            return;
        }

        match event.event_type {
            EventType::ButtonPress(button) => {
                let (x, y) = self.cursor;
                debug!("Mouse clicked at ({}, {}) with {:?}", x, y, button);
                self.record(pointer::translate_press(button, x, y));
            }
            EventType::KeyPress(key) => {
                let translated = self.keys.translate(key, event.name.as_deref());
                debug!("{}", translated.event.description);
                // The terminating press is part of the log: record first,
                // then stop accepting and signal shutdown.
                self.record(translated.event);
                if translated.is_ender {
                    info!("{:?} pressed, ending session", key);
                    self.accepting.store(false, Ordering::SeqCst);
                    if self.shutdown.send(true).is_err() {
                        debug!("Session already gone, shutdown signal unheard");
                    }
                }
            }
            // Releases and wheel motion carry no click/press semantics.
            _ => {}
        }
    }

    fn record(&self, event: crate::event::InputEvent) {
        if let Err(e) = self.recorder.record(event) {
            warn!("Dropping hook event: {}", e);
        }
    }
}

/// Spawns the OS hook listener on a dedicated thread.
///
/// `rdev::listen` blocks its thread for the process lifetime and cannot
/// be uninstalled; cooperative shutdown happens through the `accepting`
/// flag instead, after which the thread keeps draining raw notifications
/// without forwarding them.
pub fn spawn_listener<S: EventStore>(
    recorder: RecorderHandle<S>,
    ender: Key,
    accepting: Arc<AtomicBool>,
    shutdown: Arc<watch::Sender<bool>>,
) -> Result<(), CaptureError> {
    let mut dispatcher = HookDispatcher::new(recorder, ender, accepting, shutdown);
    std::thread::Builder::new()
        .name("input-hook".into())
        .spawn(move || {
            info!("Input hook listener started");
            if let Err(e) = rdev::listen(move |event| dispatcher.dispatch(event)) {
                error!("Input hook listener failed: {:?}", e);
            }
        })
        .map_err(|e| CaptureError::HookInstall(e.to_string()))?;
    Ok(())
}
