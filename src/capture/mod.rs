//! Capture subsystem: source adapters feeding the recorder
//!
//! Three adapters normalize raw device notifications into
//! [`crate::event::InputEvent`]s:
//!
//! 1. [`pointer`] - mouse button presses with cursor coordinates
//! 2. [`keyboard`] - key presses, including the session ender key
//! 3. [`gamepad`] - polled gilrs events, debounced per [`debounce`]
//!
//! # Architecture
//!
//! ```text
//! rdev hook thread ──► pointer/keyboard translators ──► Recorder
//! gilrs poll loop  ──► gamepad adapter (+ debounce)  ──► Recorder
//! ```
//!
//! Pointer and keyboard share one OS hook stream owned by [`hook`];
//! the gamepad is pulled by the session loop at its poll interval.

pub mod debounce;
pub mod gamepad;
pub mod hook;
pub mod keyboard;
pub mod pointer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to install input hook: {0}")]
    HookInstall(String),

    #[error("Failed to initialize gamepad interface: {0}")]
    GamepadInit(String),
}
