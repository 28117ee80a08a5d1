//! Transmit mode selection with mutual exclusion

use heapless::Vec;

use crate::debounce::Debouncer;
use crate::hal::{Duration, Instant};
use crate::types::{Channel, TransmitMode};

/// Mode transition reported to the controller
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeChange {
    Activated(Channel),
    Deactivated(Channel),
}

impl ModeChange {
    pub const fn channel(&self) -> Channel {
        match self {
            ModeChange::Activated(channel) | ModeChange::Deactivated(channel) => *channel,
        }
    }
}

/// At most two changes per poll: one channel dropping out and the other
/// taking over.
pub type ModeChanges = Vec<ModeChange, 2>;

/// Debounces both transmit switches and keeps at most one mode active
#[derive(Copy, Clone, Debug)]
pub struct ModeSelector {
    switches: [Debouncer; 2],
    mode: TransmitMode,
}

impl ModeSelector {
    pub const fn new(debounce: Duration) -> Self {
        Self {
            switches: [Debouncer::new(debounce), Debouncer::new(debounce)],
            mode: TransmitMode::None,
        }
    }

    /// Current mode
    pub fn mode(&self) -> TransmitMode {
        self.mode
    }

    /// Debounced level of a switch
    pub fn switch_active(&self, channel: Channel) -> bool {
        self.switches[Self::index(channel)].is_active()
    }

    /// Feed raw switch levels (true = closed) and apply any transitions.
    ///
    /// Levels are evaluated every poll, not just on edges: a switch held
    /// closed while the other channel is active takes over as soon as that
    /// channel drops out.
    pub fn update(&mut self, raw_one: bool, raw_two: bool, now: Instant) -> ModeChanges {
        self.switches[0].update(raw_one, now);
        self.switches[1].update(raw_two, now);

        let mut changes = ModeChanges::new();
        if let Some(active) = self.mode.channel() {
            if !self.switch_active(active) {
                self.mode = TransmitMode::None;
                changes.push(ModeChange::Deactivated(active)).ok();
            }
        }

        if self.mode == TransmitMode::None {
            // Channel one wins a tie
            if let Some(channel) = [Channel::One, Channel::Two]
                .into_iter()
                .find(|channel| self.switch_active(*channel))
            {
                self.mode = channel.mode();
                changes.push(ModeChange::Activated(channel)).ok();
            }
        }
        changes
    }

    const fn index(channel: Channel) -> usize {
        match channel {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
}
