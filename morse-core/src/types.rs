//! Core data types for the Morse decoder

use crate::hal::{Duration, Instant};

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// Short press
    Dot,
    /// Long press
    Dash,
}

impl Symbol {
    /// Nominal length of this element in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Symbol::Dot => 1,
            Symbol::Dash => 3,
        }
    }

    /// Transcript notation (`.` or `-`)
    pub const fn as_char(&self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }

    /// Parse transcript notation
    pub const fn from_char(ch: char) -> Option<Symbol> {
        match ch {
            '.' => Some(Symbol::Dot),
            '-' => Some(Symbol::Dash),
            _ => None,
        }
    }
}

/// Transmit channel: selects a mode switch and its indicator
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    /// Returns the other channel
    pub const fn other(&self) -> Channel {
        match self {
            Channel::One => Channel::Two,
            Channel::Two => Channel::One,
        }
    }

    /// 1-based channel number as printed on the front panel
    pub const fn number(&self) -> u8 {
        match self {
            Channel::One => 1,
            Channel::Two => 2,
        }
    }

    /// Banner shown on the display while this channel transmits
    pub const fn banner(&self) -> &'static str {
        match self {
            Channel::One => "Transmit 1",
            Channel::Two => "Transmit 2",
        }
    }

    /// Transmit mode selected by this channel
    pub const fn mode(&self) -> TransmitMode {
        match self {
            Channel::One => TransmitMode::Transmit1,
            Channel::Two => TransmitMode::Transmit2,
        }
    }
}

/// Active transmit mode. A single value, so both modes can never be on.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitMode {
    #[default]
    None,
    Transmit1,
    Transmit2,
}

impl TransmitMode {
    /// Channel driving this mode, if any
    pub const fn channel(&self) -> Option<Channel> {
        match self {
            TransmitMode::None => None,
            TransmitMode::Transmit1 => Some(Channel::One),
            TransmitMode::Transmit2 => Some(Channel::Two),
        }
    }

    /// Returns true if `channel` is the active transmitter
    pub fn is_active(&self, channel: Channel) -> bool {
        self.channel() == Some(channel)
    }
}

/// Key capture state of the decoder FSM
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeyPhase {
    /// Key up, boundary timers running
    Idle,
    /// Key held since the given instant
    KeyDown { since: Instant },
    /// Key read open at `released_at`, waiting out the settle time
    Settling { since: Instant, released_at: Instant },
}

impl KeyPhase {
    /// Returns true while a press is being captured
    pub const fn is_capturing(&self) -> bool {
        !matches!(self, KeyPhase::Idle)
    }
}

/// Fixed durations that make up the Morse timing grammar
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TimingProfile {
    /// Dot length
    pub unit: Duration,
    /// Dash length (3 units)
    pub dash: Duration,
    /// Silence ending a letter (3 units)
    pub letter_gap: Duration,
    /// Silence ending a word (7 units)
    pub word_gap: Duration,
}

impl TimingProfile {
    /// Build the standard 1:3:3:7 profile from a unit length
    pub const fn from_unit_millis(unit_ms: u64) -> Self {
        Self {
            unit: Duration::from_millis(unit_ms),
            dash: Duration::from_millis(unit_ms * 3),
            letter_gap: Duration::from_millis(unit_ms * 3),
            word_gap: Duration::from_millis(unit_ms * 7),
        }
    }

    /// Longest press still read as a dot (1.5 units)
    pub fn dot_threshold(&self) -> Duration {
        self.unit * 3 / 2
    }

    /// Silence after which a word break is emitted (1.5 word gaps)
    pub fn word_threshold(&self) -> Duration {
        self.word_gap * 3 / 2
    }

    /// Classify a press duration
    pub fn classify(&self, press: Duration) -> Symbol {
        if press <= self.dot_threshold() {
            Symbol::Dot
        } else {
            Symbol::Dash
        }
    }

    /// Check the ordering the decoder relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit.as_millis() == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        if self.dash <= self.unit {
            return Err(ConfigError::DashNotLongerThanUnit);
        }
        if self.letter_gap < self.dash || self.word_gap <= self.letter_gap {
            return Err(ConfigError::GapOrdering);
        }
        Ok(())
    }
}

/// Configuration validation failures
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unit length is zero
    ZeroUnit,
    /// Dash is not longer than a unit
    DashNotLongerThanUnit,
    /// Gaps are not ordered dash <= letter gap < word gap
    GapOrdering,
    /// Debounce window outside 1..=500 ms
    DebounceOutOfRange,
    /// Poll interval is not shorter than the dot threshold
    PollTooSlow,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroUnit => write!(f, "unit duration must be non-zero"),
            ConfigError::DashNotLongerThanUnit => write!(f, "dash must be longer than a unit"),
            ConfigError::GapOrdering => write!(f, "gaps must satisfy dash <= letter gap < word gap"),
            ConfigError::DebounceOutOfRange => write!(f, "debounce must be between 1 and 500 ms"),
            ConfigError::PollTooSlow => write!(f, "poll interval must be shorter than the dot threshold"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Decoder configuration parameters
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DecoderConfig {
    /// Morse timing grammar
    pub timing: TimingProfile,
    /// Mode switch debounce window
    pub debounce: Duration,
    /// Minimum open time before a key release is accepted
    pub settle: Duration,
    /// Main loop period
    pub poll_interval: Duration,
    /// Sidetone while the key is held
    pub sidetone_hz: u32,
    /// Tone for an unknown sequence
    pub error_tone_hz: u32,
    /// Length of the error tone
    pub error_tone: Duration,
}

impl DecoderConfig {
    /// Board defaults: 240 ms unit (5 WPM), 50 ms debounce
    pub const DEFAULT: DecoderConfig = DecoderConfig {
        timing: TimingProfile::from_unit_millis(240),
        debounce: Duration::from_millis(50),
        settle: Duration::from_millis(30),
        poll_interval: Duration::from_millis(10),
        sidetone_hz: 1000,
        error_tone_hz: 100,
        error_tone: Duration::from_millis(500),
    };

    /// Check every derived threshold
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        let debounce_ms = self.debounce.as_millis();
        if debounce_ms == 0 || debounce_ms > 500 {
            return Err(ConfigError::DebounceOutOfRange);
        }
        if self.poll_interval >= self.timing.dot_threshold() {
            return Err(ConfigError::PollTooSlow);
        }
        Ok(())
    }

    /// Words per minute implied by the unit (PARIS: 1200 / unit ms)
    pub fn wpm(&self) -> u32 {
        (1200 / self.timing.unit.as_millis().max(1) as u32).max(1)
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
