//! Host-based integration tests for the Morse decoder
//!
//! Everything runs against the mock board on simulated time: a scripted
//! operator keys text at the board's speed and the decoder is polled every
//! 10 ms, exactly as the firmware main loop does.

use morse_core::test_utils::{KeyScript, Simulation};
use morse_core::{ControllerError, DecoderConfig};

/// Unit length of the default configuration, in ms
pub const UNIT_MS: u64 = 240;

/// Script for `text` keyed at the default speed
pub fn script(text: &str) -> KeyScript {
    KeyScript::new(UNIT_MS).text(text)
}

/// Fresh simulation with the default configuration
pub fn simulation() -> Simulation {
    Simulation::with_config(DecoderConfig::DEFAULT)
}

/// Key `text` on a fresh board and return the serial transcript
pub fn decode(text: &str) -> Result<String, ControllerError> {
    let mut sim = simulation();
    sim.play(&script(text))?;
    Ok(sim.transcript)
}

#[cfg(test)]
mod decoding_tests;
#[cfg(test)]
mod display_tests;
#[cfg(test)]
mod mode_behavior_tests;
#[cfg(test)]
mod pin_tests;
#[cfg(test)]
mod property_tests;
