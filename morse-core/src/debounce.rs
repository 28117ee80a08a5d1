//! Time-window switch debouncer

use crate::hal::{Duration, Instant};

/// Debounced level change
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Activated,
    Deactivated,
}

/// Follows a raw switch level once it has held steady for the debounce
/// window. Every raw transition restarts the window.
#[derive(Copy, Clone, Debug)]
pub struct Debouncer {
    window: Duration,
    raw: bool,
    stable: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    /// New debouncer, inactive on both levels
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            raw: false,
            stable: false,
            last_change: None,
        }
    }

    /// Feed one raw sample. Returns the edge on the poll where the
    /// debounced level changes.
    pub fn update(&mut self, raw: bool, now: Instant) -> Option<Edge> {
        if raw != self.raw {
            self.raw = raw;
            self.last_change = Some(now);
        }

        if self.raw == self.stable {
            return None;
        }

        let changed_at = self.last_change?;
        if now.saturating_duration_since(changed_at) < self.window {
            return None;
        }

        self.stable = self.raw;
        Some(if self.stable {
            Edge::Activated
        } else {
            Edge::Deactivated
        })
    }

    /// Current debounced level
    pub fn is_active(&self) -> bool {
        self.stable
    }

    /// Last raw level seen
    pub fn raw(&self) -> bool {
        self.raw
    }

    /// When the raw level last changed
    pub fn last_change(&self) -> Option<Instant> {
        self.last_change
    }
}
