use super::debounce::{Channel, DebounceSet};
use super::CaptureError;
use crate::event::{EventCategory, InputEvent};
use gilrs::{Axis, Button, EventType, Gilrs};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of one non-blocking poll pass.
///
/// Device absence is an expected condition, not an error, so it gets
/// its own arm instead of travelling through `Result`.
#[derive(Debug)]
pub enum GamepadPoll {
    Events(Vec<InputEvent>),
    Unavailable,
}

/// A raw gamepad occurrence, one step before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPadEvent {
    Axis(Axis, f32),
    Pressed(Button),
    Released(Button),
    Connected,
    Disconnected,
}

/// Platform seam the adapter pulls raw events from.
///
/// Hot-plug is only discovered while events are being processed, so
/// `next_raw` must keep being drained even while `connected` reports
/// false; a newly attached device announces itself through the queue.
pub trait PadSource {
    fn next_raw(&mut self) -> Option<RawPadEvent>;
    fn connected(&self) -> bool;
}

/// gilrs-backed source used by the real session.
pub struct GilrsSource {
    gilrs: Gilrs,
}

impl GilrsSource {
    fn new() -> Result<Self, CaptureError> {
        info!("Initializing gilrs gamepad interface");
        let gilrs = Gilrs::new().map_err(|e| CaptureError::GamepadInit(e.to_string()))?;
        for (id, gamepad) in gilrs.gamepads() {
            info!("Found gamepad [{}]: {}", id, gamepad.name());
        }
        Ok(Self { gilrs })
    }
}

impl PadSource for GilrsSource {
    fn next_raw(&mut self) -> Option<RawPadEvent> {
        while let Some(gilrs::Event { event, .. }) = self.gilrs.next_event() {
            let raw = match event {
                EventType::AxisChanged(axis, value, _) => RawPadEvent::Axis(axis, value),
                EventType::ButtonPressed(button, _) => RawPadEvent::Pressed(button),
                EventType::ButtonReleased(button, _) => RawPadEvent::Released(button),
                EventType::Connected => RawPadEvent::Connected,
                EventType::Disconnected => RawPadEvent::Disconnected,
                // Repeats and anything unrecognized are not distinct inputs.
                _ => continue,
            };
            return Some(raw);
        }
        None
    }

    fn connected(&self) -> bool {
        self.gilrs.gamepads().next().is_some()
    }
}

/// Pull-model gamepad adapter.
///
/// The session loop calls [`GamepadAdapter::poll`] at its input delay;
/// each pass drains whatever the source has queued, classifies every
/// raw event by its physical source and throttles the four analog
/// channels through the shared [`DebounceSet`].
pub struct GamepadAdapter<P: PadSource = GilrsSource> {
    source: P,
    debounce: DebounceSet,
}

impl GamepadAdapter<GilrsSource> {
    pub fn new(cooldown: Duration) -> Result<Self, CaptureError> {
        Ok(Self::with_source(GilrsSource::new()?, cooldown))
    }
}

impl<P: PadSource> GamepadAdapter<P> {
    fn with_source(source: P, cooldown: Duration) -> Self {
        Self {
            source,
            debounce: DebounceSet::new(cooldown),
        }
    }

    pub fn connected(&self) -> bool {
        self.source.connected()
    }

    pub fn poll(&mut self) -> GamepadPoll {
        // Drain before deciding availability: connection state only
        // moves while queued events are consumed, so skipping the drain
        // while disconnected would make a re-probe read stale state
        // forever.
        let mut events = Vec::new();
        while let Some(raw) = self.source.next_raw() {
            match raw {
                RawPadEvent::Axis(axis, value) => {
                    if let Some(ev) = classify_axis(&mut self.debounce, axis, value, Instant::now())
                    {
                        debug!("{}", ev.description);
                        events.push(ev);
                    }
                }
                RawPadEvent::Pressed(button) => events.push(button_event(button, true)),
                RawPadEvent::Released(button) => events.push(button_event(button, false)),
                RawPadEvent::Connected => info!("Gamepad connected"),
                RawPadEvent::Disconnected => warn!("Gamepad disconnected"),
            }
        }
        // Events observed before a disconnect are still delivered; the
        // following poll reports the absence.
        if events.is_empty() && !self.source.connected() {
            return GamepadPoll::Unavailable;
        }
        GamepadPoll::Events(events)
    }
}

/// Maps an axis event to a normalized event, or `None` when the axis is
/// unsupported or suppressed by its channel cooldown.
///
/// The D-pad reports through the same axis family as the sticks but is
/// directional and discrete, so it bypasses debouncing; continuous axes
/// (sticks, analog shoulders) are throttled.
fn classify_axis(
    debounce: &mut DebounceSet,
    axis: Axis,
    value: f32,
    now: Instant,
) -> Option<InputEvent> {
    let (channel, label) = match axis {
        Axis::LeftStickX | Axis::LeftStickY => (Channel::LeftStick, "Left Stick Moved"),
        Axis::RightStickX | Axis::RightStickY => (Channel::RightStick, "Right Stick Moved"),
        Axis::LeftZ => (Channel::LeftShoulder, "Left Shoulder Moved"),
        Axis::RightZ => (Channel::RightShoulder, "Right Shoulder Moved"),
        Axis::DPadX | Axis::DPadY => return Some(dpad_event(axis, value)),
        _ => return None,
    };

    debounce
        .should_accept(channel, now)
        .then(|| InputEvent::new(EventCategory::Gamepad, format!("{}: {:?}", label, axis)))
}

fn dpad_event(axis: Axis, value: f32) -> InputEvent {
    // Direction from the sign of the reported state; gilrs uses
    // positive y for up.
    let direction = match axis {
        Axis::DPadX if value < -0.5 => "left",
        Axis::DPadX if value > 0.5 => "right",
        Axis::DPadY if value > 0.5 => "up",
        Axis::DPadY if value < -0.5 => "down",
        _ => "centered",
    };
    InputEvent::new(
        EventCategory::Gamepad,
        format!("Gamepad D-pad: {:?} -> {}", axis, direction),
    )
}

fn button_event(button: Button, pressed: bool) -> InputEvent {
    InputEvent::new(
        EventCategory::Gamepad,
        format!(
            "Gamepad Button: {:?} {}",
            button,
            if pressed { "pressed" } else { "released" }
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn debounce() -> DebounceSet {
        DebounceSet::new(Duration::from_secs(1))
    }

    struct FakeSource {
        connected: bool,
        queue: VecDeque<RawPadEvent>,
    }

    impl PadSource for FakeSource {
        fn next_raw(&mut self) -> Option<RawPadEvent> {
            self.queue.pop_front()
        }

        fn connected(&self) -> bool {
            self.connected
        }
    }

    fn adapter(source: FakeSource) -> GamepadAdapter<FakeSource> {
        GamepadAdapter::with_source(source, Duration::from_secs(1))
    }

    #[test]
    fn unavailable_while_no_device_is_attached() {
        let mut a = adapter(FakeSource {
            connected: false,
            queue: VecDeque::new(),
        });
        assert!(matches!(a.poll(), GamepadPoll::Unavailable));
    }

    #[test]
    fn hotplug_is_observed_by_a_later_probe() {
        let mut a = adapter(FakeSource {
            connected: false,
            queue: VecDeque::new(),
        });
        assert!(matches!(a.poll(), GamepadPoll::Unavailable));

        // Device attached between probes: the queued announcement must
        // be consumed by the next drain, flipping availability.
        a.source.connected = true;
        a.source.queue.push_back(RawPadEvent::Connected);
        a.source.queue.push_back(RawPadEvent::Pressed(Button::South));

        match a.poll() {
            GamepadPoll::Events(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].description, "Gamepad Button: South pressed");
            }
            GamepadPoll::Unavailable => panic!("probe after hotplug must see the device"),
        }
    }

    #[test]
    fn queue_is_drained_even_while_unavailable() {
        let mut a = adapter(FakeSource {
            connected: false,
            queue: VecDeque::from([RawPadEvent::Connected, RawPadEvent::Disconnected]),
        });
        assert!(matches!(a.poll(), GamepadPoll::Unavailable));
        assert!(a.source.queue.is_empty());
    }

    #[test]
    fn events_before_a_disconnect_are_still_delivered() {
        let mut a = adapter(FakeSource {
            connected: false,
            queue: VecDeque::from([
                RawPadEvent::Pressed(Button::East),
                RawPadEvent::Disconnected,
            ]),
        });
        match a.poll() {
            GamepadPoll::Events(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].description, "Gamepad Button: East pressed");
            }
            GamepadPoll::Unavailable => panic!("buffered events must not be dropped"),
        }
        assert!(matches!(a.poll(), GamepadPoll::Unavailable));
    }

    #[test]
    fn stick_axes_collapse_within_the_cooldown_window() {
        let mut d = debounce();
        let t0 = Instant::now();
        // t = 0.0, 0.3, 0.9 inside one window, t = 1.1 outside.
        assert!(classify_axis(&mut d, Axis::LeftStickX, 0.4, t0).is_some());
        assert!(classify_axis(&mut d, Axis::LeftStickX, 0.5, t0 + Duration::from_millis(300)).is_none());
        assert!(classify_axis(&mut d, Axis::LeftStickY, 0.6, t0 + Duration::from_millis(900)).is_none());
        assert!(classify_axis(&mut d, Axis::LeftStickX, 0.7, t0 + Duration::from_millis(1100)).is_some());
    }

    #[test]
    fn stick_and_shoulder_channels_debounce_independently() {
        let mut d = debounce();
        let t0 = Instant::now();
        assert!(classify_axis(&mut d, Axis::LeftStickX, 0.4, t0).is_some());
        assert!(classify_axis(&mut d, Axis::RightStickY, 0.4, t0).is_some());
        assert!(classify_axis(&mut d, Axis::LeftZ, 0.4, t0).is_some());
        assert!(classify_axis(&mut d, Axis::RightZ, 0.4, t0).is_some());
        // Each channel is now cooling down on its own timer.
        assert!(classify_axis(&mut d, Axis::RightStickX, 0.5, t0 + Duration::from_millis(10)).is_none());
        assert!(classify_axis(&mut d, Axis::LeftZ, 0.5, t0 + Duration::from_millis(10)).is_none());
    }

    #[test]
    fn shoulder_descriptions_name_the_axis() {
        let mut d = debounce();
        let ev = classify_axis(&mut d, Axis::RightZ, 0.9, Instant::now()).unwrap();
        assert_eq!(ev.description, "Right Shoulder Moved: RightZ");
        assert_eq!(ev.category, EventCategory::Gamepad);
    }

    #[test]
    fn dpad_is_never_debounced() {
        let mut d = debounce();
        let t0 = Instant::now();
        // 5 events within 0.1s, all recorded.
        for i in 0..5 {
            let t = t0 + Duration::from_millis(i * 20);
            assert!(classify_axis(&mut d, Axis::DPadX, 1.0, t).is_some());
        }
    }

    #[test]
    fn dpad_direction_follows_the_sign_of_the_state() {
        let mut d = debounce();
        let t = Instant::now();
        let left = classify_axis(&mut d, Axis::DPadX, -1.0, t).unwrap();
        assert_eq!(left.description, "Gamepad D-pad: DPadX -> left");
        let centered = classify_axis(&mut d, Axis::DPadX, 0.0, t).unwrap();
        assert_eq!(centered.description, "Gamepad D-pad: DPadX -> centered");
        let up = classify_axis(&mut d, Axis::DPadY, 1.0, t).unwrap();
        assert_eq!(up.description, "Gamepad D-pad: DPadY -> up");
        let down = classify_axis(&mut d, Axis::DPadY, -1.0, t).unwrap();
        assert_eq!(down.description, "Gamepad D-pad: DPadY -> down");
    }

    #[test]
    fn unsupported_axes_are_ignored() {
        let mut d = debounce();
        assert!(classify_axis(&mut d, Axis::Unknown, 0.3, Instant::now()).is_none());
    }

    #[test]
    fn buttons_report_press_and_release() {
        let press = button_event(Button::South, true);
        assert_eq!(press.description, "Gamepad Button: South pressed");
        let release = button_event(Button::South, false);
        assert_eq!(release.description, "Gamepad Button: South released");
    }
}
