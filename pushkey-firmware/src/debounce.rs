//! Debounce and auto-repeat state machine for a single push-button.
//!
//! The machine is a pure function of sampled pin state and time; it owns all
//! press-tracking timestamps so no global timer state exists. Timestamps are
//! monotonic milliseconds in `u32` with wrapping subtraction, which is safe at
//! any realistic uptime.

/// How long the raw signal must be continuously high before a press counts.
pub const DEBOUNCE_DELAY_MS: u32 = 100;

/// Hold time before auto-repeat kicks in.
pub const REPEAT_DELAY_MS: u32 = 600;

/// Cadence of repeated keystrokes while held.
pub const REPEAT_INTERVAL_MS: u32 = 30;

/// A clean logical key action, consumed immediately by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    InitialPress,
    RepeatPress,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub debounce_ms: u32,
    pub repeat_delay_ms: u32,
    pub repeat_interval_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_DELAY_MS,
            repeat_delay_ms: REPEAT_DELAY_MS,
            repeat_interval_ms: REPEAT_INTERVAL_MS,
        }
    }
}

/// Per-button debouncer/repeater. One instance, owned by the polling task.
pub struct Debouncer {
    timing: Timing,

    /// Last raw sample, used to spot transitions.
    raw: bool,

    /// Latched logical state; only set once a press survives the debounce
    /// window, cleared on the first released sample.
    pressed: bool,

    /// When the raw signal last changed, in ms. Each bounce restarts the
    /// debounce window from here.
    last_transition: u32,

    /// When the current press was reported, in ms.
    press_start: u32,

    /// When the last event was emitted, in ms; spaces out repeats.
    last_emit: u32,
}

impl Debouncer {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            raw: false,
            pressed: false,
            last_transition: 0,
            press_start: 0,
            last_emit: 0,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample taken at `now` (ms). Returns at most one event.
    ///
    /// A press is reported once the signal has been continuously high for the
    /// debounce window since the last recorded transition. Release is not
    /// debounced; a single low sample clears the latch immediately.
    pub fn poll(&mut self, raw: bool, now: u32) -> Option<KeyEvent> {
        if raw != self.raw {
            self.raw = raw;
            self.last_transition = now;
        }

        if !raw {
            self.pressed = false;
            return None;
        }

        if !self.pressed {
            if now.wrapping_sub(self.last_transition) >= self.timing.debounce_ms {
                self.pressed = true;
                self.press_start = now;
                self.last_emit = now;
                return Some(KeyEvent::InitialPress);
            }
            return None;
        }

        if now.wrapping_sub(self.press_start) >= self.timing.repeat_delay_ms
            && now.wrapping_sub(self.last_emit) >= self.timing.repeat_interval_ms
        {
            self.last_emit = now;
            return Some(KeyEvent::RepeatPress);
        }

        None
    }
}

#[cfg(test)]
#[path = "debounce_test.rs"]
mod test;
