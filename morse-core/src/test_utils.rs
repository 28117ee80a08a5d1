//! Test utilities: mock board, scripted operator and a poll-loop simulator

pub use self::key_script::KeyScript;
pub use self::mock_board::MockBoard;
pub use self::simulation::Simulation;

pub mod mock_board {
    //! Whole-board mock built from the HAL mocks

    use crate::hal::mock::{MockDisplay, MockOutput, MockSwitch, MockTone};
    use crate::hal::{DecoderHal, HalError};
    use crate::types::Channel;

    /// Every board peripheral, inspectable from tests
    #[derive(Default)]
    pub struct MockBoard {
        pub key1: MockSwitch,
        pub key2: MockSwitch,
        pub switch1: MockSwitch,
        pub switch2: MockSwitch,
        pub indicator1: MockOutput,
        pub indicator2: MockOutput,
        pub status_led: MockOutput,
        pub tone: MockTone,
        pub display: MockDisplay,
        initialized: bool,
    }

    impl MockBoard {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn initialized(&self) -> bool {
            self.initialized
        }
    }

    impl DecoderHal for MockBoard {
        type Key = MockSwitch;
        type ModeSwitch = MockSwitch;
        type Indicator = MockOutput;
        type Tone = MockTone;
        type Display = MockDisplay;

        fn initialize(&mut self) -> Result<(), HalError> {
            self.initialized = true;
            Ok(())
        }

        fn key1(&mut self) -> &mut MockSwitch {
            &mut self.key1
        }

        fn key2(&mut self) -> &mut MockSwitch {
            &mut self.key2
        }

        fn mode_switch(&mut self, channel: Channel) -> &mut MockSwitch {
            match channel {
                Channel::One => &mut self.switch1,
                Channel::Two => &mut self.switch2,
            }
        }

        fn mode_indicator(&mut self, channel: Channel) -> &mut MockOutput {
            match channel {
                Channel::One => &mut self.indicator1,
                Channel::Two => &mut self.indicator2,
            }
        }

        fn status_led(&mut self) -> &mut MockOutput {
            &mut self.status_led
        }

        fn tone(&mut self) -> &mut MockTone {
            &mut self.tone
        }

        fn display(&mut self) -> &mut MockDisplay {
            &mut self.display
        }

        fn shutdown(&mut self) -> Result<(), HalError> {
            self.initialized = false;
            Ok(())
        }
    }
}

pub mod key_script {
    //! Scripted key presses for a simulated operator

    use std::vec::Vec;

    use crate::table::code_for;
    use crate::types::Symbol;

    /// Silence after a letter, in units. The decoder measures gaps from the
    /// settled release, so the textbook 3 units would land just short.
    pub const LETTER_SPACE_UNITS: u64 = 4;

    /// Silence after a word, in units. Word breaks need 1.5 word gaps
    /// (10.5 units) of silence.
    pub const WORD_SPACE_UNITS: u64 = 12;

    /// Timeline of key closures, in milliseconds from the script start
    #[derive(Clone, Debug)]
    pub struct KeyScript {
        unit_ms: u64,
        presses: Vec<(u64, u64)>,
        cursor_ms: u64,
    }

    impl KeyScript {
        pub fn new(unit_ms: u64) -> Self {
            Self {
                unit_ms,
                presses: Vec::new(),
                cursor_ms: 0,
            }
        }

        /// Close the key for `hold_ms`
        pub fn press(mut self, hold_ms: u64) -> Self {
            self.presses.push((self.cursor_ms, self.cursor_ms + hold_ms));
            self.cursor_ms += hold_ms;
            self
        }

        /// Leave the key open for `ms`
        pub fn pause(mut self, ms: u64) -> Self {
            self.cursor_ms += ms;
            self
        }

        /// One element followed by the inter-element gap
        pub fn symbol(self, symbol: Symbol) -> Self {
            let unit = self.unit_ms;
            self.press(unit * symbol.duration_units() as u64).pause(unit)
        }

        /// Dot/dash notation followed by a letter space
        pub fn code(mut self, code: &str) -> Self {
            for ch in code.chars() {
                if let Some(symbol) = Symbol::from_char(ch) {
                    self = self.symbol(symbol);
                }
            }
            let unit = self.unit_ms;
            // One unit of the letter space came with the last element
            self.pause(unit * (LETTER_SPACE_UNITS - 1))
        }

        /// Key a table character; unknown characters are skipped
        pub fn letter(self, ch: char) -> Self {
            match code_for(ch) {
                Some(code) => self.code(code),
                None => self,
            }
        }

        /// Extend the silence after a letter into a word space
        pub fn word_space(self) -> Self {
            let unit = self.unit_ms;
            self.pause(unit * (WORD_SPACE_UNITS - LETTER_SPACE_UNITS))
        }

        /// Key a phrase; spaces become word spaces
        pub fn text(mut self, text: &str) -> Self {
            for ch in text.chars() {
                self = if ch == ' ' {
                    self.word_space()
                } else {
                    self.letter(ch)
                };
            }
            self
        }

        /// Key state at `ms`
        pub fn is_pressed(&self, ms: u64) -> bool {
            self.presses
                .iter()
                .any(|(start, end)| ms >= *start && ms < *end)
        }

        /// End of the script, trailing silence included
        pub fn end(&self) -> u64 {
            self.cursor_ms
        }

        pub fn presses(&self) -> &[(u64, u64)] {
            &self.presses
        }
    }
}

pub mod simulation {
    //! Drives a controller against a mock board at the configured poll rate

    use std::string::String;

    use super::{KeyScript, MockBoard};
    use crate::controller::{Controller, ControllerError};
    use crate::hal::Instant;
    use crate::types::{Channel, DecoderConfig};

    pub struct Simulation {
        pub controller: Controller,
        pub board: MockBoard,
        pub transcript: String,
        now_ms: u64,
        poll_ms: u64,
    }

    impl Simulation {
        /// Started controller with the default configuration and an empty
        /// transcript (start-up banner discarded)
        pub fn new() -> Self {
            Self::with_config(DecoderConfig::DEFAULT)
        }

        pub fn with_config(config: DecoderConfig) -> Self {
            let mut sim = Self {
                controller: Controller::new(config),
                board: MockBoard::new(),
                transcript: String::new(),
                now_ms: 0,
                poll_ms: config.poll_interval.as_millis().max(1),
            };
            sim.controller
                .start(&mut sim.board, &mut sim.transcript)
                .expect("mock board start-up cannot fail");
            sim.transcript.clear();
            sim
        }

        /// Current simulated time in ms
        pub fn now(&self) -> u64 {
            self.now_ms
        }

        /// One poll at the current time, then advance one poll period
        pub fn step(&mut self) -> Result<(), ControllerError> {
            let now = Instant::from_millis(self.now_ms);
            self.controller
                .poll(&mut self.board, &mut self.transcript, now)?;
            self.now_ms += self.poll_ms;
            Ok(())
        }

        /// Key the script on key 1, starting now
        pub fn play(&mut self, script: &KeyScript) -> Result<(), ControllerError> {
            let start = self.now_ms;
            while self.now_ms < start + script.end() {
                self.board
                    .key1
                    .set_active(script.is_pressed(self.now_ms - start));
                self.step()?;
            }
            self.board.key1.set_active(false);
            Ok(())
        }

        /// Poll with nothing changing for `ms`
        pub fn idle(&mut self, ms: u64) -> Result<(), ControllerError> {
            let end = self.now_ms + ms;
            while self.now_ms < end {
                self.step()?;
            }
            Ok(())
        }

        /// Set a raw mode switch level
        pub fn set_switch(&mut self, channel: Channel, closed: bool) {
            match channel {
                Channel::One => self.board.switch1.set_active(closed),
                Channel::Two => self.board.switch2.set_active(closed),
            }
        }
    }

    impl Default for Simulation {
        fn default() -> Self {
            Self::new()
        }
    }
}
