//! Finite State Machine for decoding a hand-keyed Morse signal

use heapless::Vec;

use crate::hal::{Duration, Instant};
use crate::table::{lookup, SymbolSequence};
use crate::types::{KeyPhase, Symbol, TimingProfile};

/// Characters per transcript line before a line break
pub const MAX_LINE_LENGTH: u8 = 20;

/// Output of one decoder poll
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecoderEvent {
    /// Key went down. `clear_display` is set on the first press after a
    /// mode change.
    PressStarted { clear_display: bool },
    /// Key release accepted and classified
    Released { symbol: Symbol, press: Duration },
    /// Letter boundary reached; `matched` is false for `?`
    Letter { ch: char, matched: bool },
    /// Word boundary reached
    WordBreak,
    /// Transcript line is full
    LineBreak,
}

/// Events from a single poll, in emission order
pub type DecoderEvents = Vec<DecoderEvent, 4>;

/// Press and release timestamps
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct DecoderTimers {
    /// Start of the press being captured, or of the last one
    pub press_start: Option<Instant>,
    /// Accepted release of the last press; origin of every gap measurement
    pub last_release: Option<Instant>,
}

impl DecoderTimers {
    /// Silence since the last release
    pub fn gap(&self, now: Instant) -> Option<Duration> {
        self.last_release
            .map(|release| now.saturating_duration_since(release))
    }
}

/// Keying decoder FSM.
///
/// Polled once per main loop tick with the OR of both key inputs. A press
/// moves Idle -> KeyDown; an open key moves to Settling, and once it has
/// stayed open for the settle time the press is classified and the FSM
/// returns to Idle. Letter and word boundaries are only evaluated in Idle.
pub struct KeyingDecoder {
    phase: KeyPhase,
    timing: TimingProfile,
    settle: Duration,
    timers: DecoderTimers,
    sequence: SymbolSequence,
    letter_pending: bool,
    word_pending: bool,
    line_length: u8,
    clear_on_press: bool,
}

impl KeyingDecoder {
    /// Create new decoder with given timing
    pub fn new(timing: TimingProfile, settle: Duration) -> Self {
        Self {
            phase: KeyPhase::Idle,
            timing,
            settle,
            timers: DecoderTimers::default(),
            sequence: SymbolSequence::new(),
            letter_pending: false,
            word_pending: false,
            line_length: 0,
            clear_on_press: false,
        }
    }

    /// Advance the FSM by one poll
    pub fn update(&mut self, key_active: bool, now: Instant) -> DecoderEvents {
        let mut events = DecoderEvents::new();

        match self.phase {
            KeyPhase::Idle => {
                if key_active {
                    self.start_press(now, &mut events);
                }
                // Gaps run from the last accepted release, so a press on
                // this poll still closes out the previous letter
                self.resolve_boundaries(now, &mut events);
            }

            KeyPhase::KeyDown { since } => {
                if !key_active {
                    self.phase = KeyPhase::Settling {
                        since,
                        released_at: now,
                    };
                }
            }

            KeyPhase::Settling { since, released_at } => {
                if key_active {
                    // Contact bounce: the press goes on
                    self.phase = KeyPhase::KeyDown { since };
                } else if now.saturating_duration_since(released_at) >= self.settle {
                    self.finish_press(since, now, &mut events);
                }
            }
        }

        events
    }

    /// Handle a key going down
    fn start_press(&mut self, now: Instant, events: &mut DecoderEvents) {
        let clear_display = core::mem::replace(&mut self.clear_on_press, false);
        self.timers.press_start = Some(now);
        self.phase = KeyPhase::KeyDown { since: now };
        events.push(DecoderEvent::PressStarted { clear_display }).ok();
    }

    /// Classify a completed press and arm both boundary detectors
    fn finish_press(&mut self, since: Instant, now: Instant, events: &mut DecoderEvents) {
        let press = now.saturating_duration_since(since);
        let symbol = self.timing.classify(press);

        if !self.sequence.push(symbol) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Symbol buffer full, letter will decode as '?'");
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("{:?} ({} ms)", symbol, press.as_millis());

        self.letter_pending = true;
        self.word_pending = true;
        self.timers.last_release = Some(now);
        self.phase = KeyPhase::Idle;
        events.push(DecoderEvent::Released { symbol, press }).ok();
    }

    /// Emit letter, word and line boundaries due at `now`
    fn resolve_boundaries(&mut self, now: Instant, events: &mut DecoderEvents) {
        let Some(gap) = self.timers.gap(now) else {
            return;
        };

        if self.letter_pending && gap >= self.timing.letter_gap {
            let found = if self.sequence.is_overflowed() {
                None
            } else {
                lookup(self.sequence.symbols())
            };
            let ch = self.sequence.resolve();

            #[cfg(feature = "defmt")]
            defmt::info!("Letter '{}' after {} ms gap", ch, gap.as_millis());

            self.sequence.clear();
            self.letter_pending = false;
            self.line_length += 1;
            events
                .push(DecoderEvent::Letter {
                    ch,
                    matched: found.is_some(),
                })
                .ok();
        }

        if self.word_pending && gap >= self.timing.word_threshold() {
            #[cfg(feature = "defmt")]
            defmt::info!("Word break after {} ms gap", gap.as_millis());

            self.word_pending = false;
            self.line_length += 1;
            events.push(DecoderEvent::WordBreak).ok();
        }

        if self.line_length >= MAX_LINE_LENGTH {
            self.line_length = 0;
            events.push(DecoderEvent::LineBreak).ok();
        }
    }

    /// Wipe the display on the next key press
    pub fn mark_mode_change(&mut self) {
        self.clear_on_press = true;
    }

    /// True if the next press will request a display clear
    pub fn clear_on_press(&self) -> bool {
        self.clear_on_press
    }

    /// Get current FSM state
    pub fn phase(&self) -> KeyPhase {
        self.phase
    }

    pub fn timers(&self) -> &DecoderTimers {
        &self.timers
    }

    /// Symbols of the letter being keyed
    pub fn sequence(&self) -> &SymbolSequence {
        &self.sequence
    }

    pub fn letter_pending(&self) -> bool {
        self.letter_pending
    }

    pub fn word_pending(&self) -> bool {
        self.word_pending
    }

    /// Characters on the current transcript line
    pub fn line_length(&self) -> u8 {
        self.line_length
    }

    pub fn timing(&self) -> &TimingProfile {
        &self.timing
    }

    /// Reset FSM to initial state
    pub fn reset(&mut self) {
        self.phase = KeyPhase::Idle;
        self.timers = DecoderTimers::default();
        self.sequence.clear();
        self.letter_pending = false;
        self.word_pending = false;
        self.line_length = 0;
        self.clear_on_press = false;
    }
}
