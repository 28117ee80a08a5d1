//! Hardware Abstraction Layer for the decoder board

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Millisecond instant used when building without embassy-time.
    /// Callers always pass the current time in explicitly.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Instant(u64);

    impl Instant {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }

        pub fn duration_since(&self, earlier: Instant) -> Duration {
            Duration(self.0 - earlier.0)
        }

        pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
            Duration(self.0.saturating_sub(earlier.0))
        }
    }

    impl core::ops::Add<Duration> for Instant {
        type Output = Instant;

        fn add(self, rhs: Duration) -> Instant {
            Instant(self.0 + rhs.0)
        }
    }

    /// Millisecond duration
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Add for Duration {
        type Output = Duration;

        fn add(self, rhs: Duration) -> Duration {
            Duration(self.0 + rhs.0)
        }
    }

    impl core::ops::Div<u32> for Duration {
        type Output = Duration;

        fn div(self, rhs: u32) -> Duration {
            Duration(self.0 / rhs as u64)
        }
    }

    impl core::ops::Mul<u32> for Duration {
        type Output = Duration;

        fn mul(self, rhs: u32) -> Duration {
            Duration(self.0 * rhs as u64)
        }
    }
}

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Tone generator operation failed
    ToneError,
    /// Character display operation failed
    DisplayError,
    /// Hardware not initialized
    NotInitialized,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::ToneError => write!(f, "Tone generator operation failed"),
            HalError::DisplayError => write!(f, "Display operation failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Digital switch input: Morse keys and transmit mode switches
pub trait InputSwitch {
    /// True while the switch is closed (pin pulled low)
    fn is_active(&mut self) -> Result<bool, HalError>;

    /// Re-enable the idle pull-up on the switch pin.
    ///
    /// Boards wired with the mode switches cross-coupled use this to lock
    /// out the other transmitter; plain inputs ignore it. A switch that is
    /// held closed must keep reading closed afterwards.
    fn release(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

/// On/off output: status LED and transmit mode indicators
pub trait OutputLine {
    /// Set output state (true = lit)
    fn set_state(&mut self, state: bool) -> Result<(), HalError>;

    /// Get current output state
    fn get_state(&self) -> Result<bool, HalError>;

    /// Toggle output state
    fn toggle(&mut self) -> Result<(), HalError> {
        let current = self.get_state()?;
        self.set_state(!current)
    }
}

/// Audio tone generator
pub trait ToneOutput {
    /// Start a tone. With a duration the generator stops by itself,
    /// otherwise it sounds until [`ToneOutput::stop`].
    fn play(&mut self, freq_hz: u32, duration: Option<Duration>) -> Result<(), HalError>;

    /// Silence the generator
    fn stop(&mut self) -> Result<(), HalError>;
}

/// Fixed-grid character display addressed by (column, row)
pub trait CharDisplay {
    /// Blank every cell
    fn clear(&mut self) -> Result<(), HalError>;

    /// Move the hardware cursor
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), HalError>;

    /// Write one character at the hardware cursor and advance it
    fn write_char(&mut self, ch: char) -> Result<(), HalError>;

    /// Write a string at the hardware cursor
    fn write_str(&mut self, text: &str) -> Result<(), HalError> {
        for ch in text.chars() {
            self.write_char(ch)?;
        }
        Ok(())
    }
}

/// Complete decoder board interface
pub trait DecoderHal {
    type Key: InputSwitch;
    type ModeSwitch: InputSwitch;
    type Indicator: OutputLine;
    type Tone: ToneOutput;
    type Display: CharDisplay;

    /// Initialize hardware
    fn initialize(&mut self) -> Result<(), HalError>;

    /// Primary Morse key
    fn key1(&mut self) -> &mut Self::Key;

    /// Secondary Morse key, OR'd with the primary
    fn key2(&mut self) -> &mut Self::Key;

    /// Transmit mode switch 1 or 2
    fn mode_switch(&mut self, channel: crate::types::Channel) -> &mut Self::ModeSwitch;

    /// Transmit mode indicator 1 or 2
    fn mode_indicator(&mut self, channel: crate::types::Channel) -> &mut Self::Indicator;

    /// Keying status LED
    fn status_led(&mut self) -> &mut Self::Indicator;

    /// Sidetone / error tone generator
    fn tone(&mut self) -> &mut Self::Tone;

    /// Character display
    fn display(&mut self) -> &mut Self::Display;

    /// Shutdown hardware
    fn shutdown(&mut self) -> Result<(), HalError>;
}

/// Generic implementation for embedded-hal compatible input pins
pub struct EmbeddedHalSwitch<P> {
    pin: P,
}

impl<P> EmbeddedHalSwitch<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give back the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> InputSwitch for EmbeddedHalSwitch<P>
where
    P: InputPin,
{
    fn is_active(&mut self) -> Result<bool, HalError> {
        // Active low (pulled up, grounded when closed)
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalOutput<P> {
    pin: P,
    inverted: bool,
    state: bool,
}

impl<P> EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            state: false,
        }
    }

    /// Give back the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputLine for EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    fn set_state(&mut self, state: bool) -> Result<(), HalError> {
        let output_state = if self.inverted { !state } else { state };
        if output_state {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.state = state;
        Ok(())
    }

    fn get_state(&self) -> Result<bool, HalError> {
        // embedded-hal output pins are write-only, so report the last level set
        Ok(self.state)
    }
}

/// HD44780 character LCD behind a PCF8574 I2C backpack, driven in 4-bit mode.
///
/// Expander bits: P0 = RS, P1 = RW, P2 = EN, P3 = backlight, P4..P7 = D4..D7.
/// Every byte goes out as two nibbles, each latched by an EN pulse.
pub struct Pcf8574Lcd<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    rows: u8,
    columns: u8,
}

impl<I, D> Pcf8574Lcd<I, D>
where
    I: I2c,
    D: DelayNs,
{
    const RS: u8 = 0x01;
    const EN: u8 = 0x04;
    const BACKLIGHT: u8 = 0x08;

    const CMD_CLEAR: u8 = 0x01;
    const CMD_ENTRY_INCREMENT: u8 = 0x06;
    const CMD_DISPLAY_ON: u8 = 0x0C;
    const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
    const CMD_SET_DDRAM: u8 = 0x80;

    /// DDRAM address of the first cell of each row on 20x4 modules
    const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

    pub fn new(i2c: I, delay: D, address: u8, columns: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            rows,
            columns,
        }
    }

    /// Power-on initialization into 4-bit, two-line mode with the display on
    pub fn init(&mut self) -> Result<(), HalError> {
        self.delay.delay_ms(50);

        // Three 8-bit function sets resynchronize the controller, then 4-bit
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;

        self.command(Self::CMD_FUNCTION_4BIT_2LINE)?;
        self.command(Self::CMD_DISPLAY_ON)?;
        self.clear_screen()?;
        self.command(Self::CMD_ENTRY_INCREMENT)
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, value: u8) -> Result<(), HalError> {
        self.send(value, 0)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), HalError> {
        self.send(Self::CMD_CLEAR, 0)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), HalError> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble((value << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), HalError> {
        let byte = nibble | mode | Self::BACKLIGHT;
        self.i2c
            .write(self.address, &[byte | Self::EN, byte])
            .map_err(|_| HalError::DisplayError)
    }
}

impl<I, D> CharDisplay for Pcf8574Lcd<I, D>
where
    I: I2c,
    D: DelayNs,
{
    fn clear(&mut self) -> Result<(), HalError> {
        self.clear_screen()
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), HalError> {
        if col >= self.columns || row >= self.rows || row as usize >= Self::ROW_OFFSETS.len() {
            return Err(HalError::DisplayError);
        }
        self.command(Self::CMD_SET_DDRAM | (Self::ROW_OFFSETS[row as usize] + col))
    }

    fn write_char(&mut self, ch: char) -> Result<(), HalError> {
        // The character ROM only covers ASCII reliably
        let code = if ch.is_ascii() { ch as u8 } else { b'?' };
        self.send(code, Self::RS)?;
        self.delay.delay_us(50);
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::RefCell;

    #[derive(Default)]
    pub struct MockSwitch {
        active: RefCell<bool>,
        faulty: RefCell<bool>,
        releases: RefCell<u32>,
    }

    impl MockSwitch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_active(&self, active: bool) {
            *self.active.borrow_mut() = active;
        }

        /// Make every read fail with `GpioError`
        pub fn set_fault(&self, faulty: bool) {
            *self.faulty.borrow_mut() = faulty;
        }

        /// Number of times the pin was driven back to its disabled level
        pub fn release_count(&self) -> u32 {
            *self.releases.borrow()
        }
    }

    impl InputSwitch for MockSwitch {
        fn is_active(&mut self) -> Result<bool, HalError> {
            if *self.faulty.borrow() {
                return Err(HalError::GpioError);
            }
            Ok(*self.active.borrow())
        }

        fn release(&mut self) -> Result<(), HalError> {
            *self.releases.borrow_mut() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockOutput {
        state: RefCell<bool>,
    }

    impl MockOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_active(&self) -> bool {
            *self.state.borrow()
        }
    }

    impl OutputLine for MockOutput {
        fn set_state(&mut self, state: bool) -> Result<(), HalError> {
            *self.state.borrow_mut() = state;
            Ok(())
        }

        fn get_state(&self) -> Result<bool, HalError> {
            Ok(*self.state.borrow())
        }
    }

    /// Tone request as seen by the generator
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum ToneEvent {
        Play { freq_hz: u32, duration: Option<Duration> },
        Stop,
    }

    #[derive(Default)]
    pub struct MockTone {
        events: std::vec::Vec<ToneEvent>,
        sounding: Option<u32>,
    }

    impl MockTone {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every play/stop request so far, oldest first
        pub fn events(&self) -> &[ToneEvent] {
            &self.events
        }

        /// Frequency of a continuous tone currently sounding
        pub fn sounding(&self) -> Option<u32> {
            self.sounding
        }

        pub fn clear(&mut self) {
            self.events.clear();
        }
    }

    impl ToneOutput for MockTone {
        fn play(&mut self, freq_hz: u32, duration: Option<Duration>) -> Result<(), HalError> {
            self.events.push(ToneEvent::Play { freq_hz, duration });
            if duration.is_none() {
                self.sounding = Some(freq_hz);
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HalError> {
            self.events.push(ToneEvent::Stop);
            self.sounding = None;
            Ok(())
        }
    }

    /// In-memory 20x4 character grid
    pub struct MockDisplay {
        cells: [[char; crate::display::COLUMNS as usize]; crate::display::ROWS as usize],
        cursor: (u8, u8),
        clears: u32,
    }

    impl Default for MockDisplay {
        fn default() -> Self {
            Self {
                cells: [[' '; crate::display::COLUMNS as usize]; crate::display::ROWS as usize],
                cursor: (0, 0),
                clears: 0,
            }
        }
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Character at (col, row)
        pub fn cell(&self, col: u8, row: u8) -> char {
            self.cells[row as usize][col as usize]
        }

        /// One row of the grid, trailing blanks included
        pub fn row(&self, row: u8) -> std::string::String {
            self.cells[row as usize].iter().collect()
        }

        /// Number of full-grid clears so far
        pub fn clear_count(&self) -> u32 {
            self.clears
        }

        pub fn hardware_cursor(&self) -> (u8, u8) {
            self.cursor
        }
    }

    impl CharDisplay for MockDisplay {
        fn clear(&mut self) -> Result<(), HalError> {
            for row in self.cells.iter_mut() {
                row.fill(' ');
            }
            self.cursor = (0, 0);
            self.clears += 1;
            Ok(())
        }

        fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), HalError> {
            if col >= crate::display::COLUMNS || row >= crate::display::ROWS {
                return Err(HalError::DisplayError);
            }
            self.cursor = (col, row);
            Ok(())
        }

        fn write_char(&mut self, ch: char) -> Result<(), HalError> {
            let (col, row) = self.cursor;
            if col >= crate::display::COLUMNS || row >= crate::display::ROWS {
                return Err(HalError::DisplayError);
            }
            self.cells[row as usize][col as usize] = ch;
            // HD44780-style: the hardware cursor runs on along the row
            self.cursor = (col + 1, row);
            Ok(())
        }
    }
}
