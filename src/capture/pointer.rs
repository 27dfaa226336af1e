use crate::event::{EventCategory, InputEvent};
use rdev::Button;

/// Normalizes a mouse button press at the tracked cursor position.
///
/// Only presses are recorded; releases carry no click semantics and are
/// ignored by the dispatcher before it gets here.
pub fn translate_press(button: Button, x: f64, y: f64) -> InputEvent {
    InputEvent::at(
        EventCategory::Pointer,
        x,
        y,
        format!("Mouse {} Pressed", button_name(button)),
    )
}

fn button_name(button: Button) -> String {
    match button {
        Button::Left => "Left".to_string(),
        Button::Right => "Right".to_string(),
        Button::Middle => "Middle".to_string(),
        Button::Unknown(code) => format!("Button{}", code),
    }
}
