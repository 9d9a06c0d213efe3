//! Scanner input discriminator.
//!
//! A keyboard-wedge barcode scanner types its code as a fast burst of characters followed
//! by Enter. [`ScanAccumulator`] tells that burst apart from a person typing by the time
//! between keystrokes: a pause of at least `gap` starts a new candidate code. It is a pure
//! state machine fed with timestamps, so it works under any UI toolkit and in tests.
//! Nothing confirms the input really came from a scanner.

use std::time::{Duration, Instant};

/// Default pause that separates two candidate codes.
pub const DEFAULT_SCAN_GAP: Duration = Duration::from_millis(80);

/// A keystroke as delivered by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    /// A single character key
    Char(char),
    /// Enter / Return
    Enter,
    /// Any other control key (arrows, Tab, Shift, ...)
    Other,
}

/// Which element had focus when the key arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    /// The scanner's own input, or nothing in particular
    Scanner,
    /// A different manual-entry field; its typing is not hijacked
    ManualEntry,
}

/// Time-windowed keystroke accumulator.
#[derive(Clone, Debug)]
pub struct ScanAccumulator {
    gap: Duration,
    buffer: String,
    last_key_at: Option<Instant>,
}

impl Default for ScanAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_GAP)
    }
}

impl ScanAccumulator {
    /// Accumulator that resets after pauses of `gap` or longer.
    #[must_use]
    pub const fn new(gap: Duration) -> Self {
        Self {
            gap,
            buffer: String::new(),
            last_key_at: None,
        }
    }

    /// Characters collected for the current candidate.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Feeds one keystroke received at `at`. Returns the completed code on Enter.
    pub fn feed(&mut self, key: KeyEvent, at: Instant, focus: Focus) -> Option<String> {
        if focus == Focus::ManualEntry {
            return None;
        }

        if let Some(previous) = self.last_key_at {
            if at.saturating_duration_since(previous) >= self.gap {
                self.buffer.clear();
            }
        }
        self.last_key_at = Some(at);

        match key {
            KeyEvent::Char(c) if !c.is_control() => {
                self.buffer.push(c);
                None
            }
            KeyEvent::Enter => {
                let code = self.buffer.trim().to_string();
                self.buffer.clear();
                (!code.is_empty()).then_some(code)
            }
            KeyEvent::Char(_) | KeyEvent::Other => None,
        }
    }

    /// Drops any partial input.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }
}
