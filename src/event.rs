use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Which class of device produced an event.
///
/// The storage encoding matches the category strings the summary
/// queries filter on, so they are part of the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Pointer,
    Key,
    Gamepad,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Pointer => "mouse",
            EventCategory::Key => "keyboard",
            EventCategory::Gamepad => "gamepad",
        }
    }
}

/// A single normalized input occurrence, the unit of record.
///
/// Constructed by a source adapter at the moment the raw device event
/// is observed and immutable afterwards. Coordinates are only present
/// for pointer events; the store persists `None` as NULL.
#[derive(Debug, Clone)]
pub struct InputEvent {
    pub category: EventCategory,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub description: String,
    pub timestamp: DateTime<Local>,
}

impl InputEvent {
    /// Event with no coordinates (keys, gamepad).
    pub fn new(category: EventCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            x: None,
            y: None,
            description: description.into(),
            timestamp: Local::now(),
        }
    }

    /// Pointer event carrying the press location.
    pub fn at(category: EventCategory, x: f64, y: f64, description: impl Into<String>) -> Self {
        Self {
            category,
            x: Some(x),
            y: Some(y),
            description: description.into(),
            timestamp: Local::now(),
        }
    }
}
