#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Morse Core
//!
//! Hand-keyed Morse decoder logic for embedded systems.
//! Captures key presses, classifies dots and dashes, resolves letters and
//! words from the gaps between them, and drives a 20x4 character display
//! alongside a mutually exclusive pair of transmit mode switches.

pub mod types;
pub mod table;
pub mod debounce;
pub mod mode;
pub mod display;
pub mod fsm;
pub mod controller;
pub mod hal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use table::{code_for, lookup, SymbolSequence, MAX_SYMBOLS, SYMBOL_TABLE, UNKNOWN};
pub use debounce::{Debouncer, Edge};
pub use mode::{ModeChange, ModeChanges, ModeSelector};
pub use display::{CursorPosition, DisplayCursor, COLUMNS, ROWS};
pub use fsm::*;
pub use controller::*;
pub use hal::{*, Instant, Duration};

/// Decoder library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 240 ms unit (5 WPM), 50 ms switch debounce
pub fn default_config() -> DecoderConfig {
    DecoderConfig::DEFAULT
}
