use std::time::{Duration, Instant};
use tracing::trace;

/// The four analog input paths that are throttled.
///
/// Digital inputs (buttons, D-pad, keys, mouse clicks) never pass
/// through here; every discrete press is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::LeftStick => 0,
            Channel::RightStick => 1,
            Channel::LeftShoulder => 2,
            Channel::RightShoulder => 3,
        }
    }
}

/// Per-channel cooldown timers for analog gamepad inputs.
///
/// A held or jittering stick emits near-duplicate axis samples at high
/// frequency; without throttling they would dominate the log. Each
/// channel keeps its own timer, reset on every accepted event, and a
/// suppressed event is dropped silently.
#[derive(Debug)]
pub struct DebounceSet {
    cooldown: Duration,
    last_fired_at: [Option<Instant>; 4],
}

impl DebounceSet {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired_at: [None; 4],
        }
    }

    /// True iff the channel has been quiet for a full cooldown window.
    /// Accepting resets the channel timer to `now`.
    pub fn should_accept(&mut self, channel: Channel, now: Instant) -> bool {
        let slot = &mut self.last_fired_at[channel.index()];
        let accept = match *slot {
            None => true,
            Some(last) => now.duration_since(last) >= self.cooldown,
        };
        if accept {
            *slot = Some(now);
        } else {
            trace!("Suppressed {:?} event within cooldown", channel);
        }
        accept
    }
}
