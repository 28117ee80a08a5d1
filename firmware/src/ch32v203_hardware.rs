//! CH32V203 Hardware Implementation
//!
//! 64KB Flash / 20KB RAM - Embassy-optimized implementation.
//! Key and switch levels are latched by EXTI handlers into atomics; the
//! decoder task only ever reads the latched levels.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use embassy_time::{Delay, Duration, Instant};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use static_cell::StaticCell;

use morse_core::{Channel, CharDisplay, DecoderHal, HalError, InputSwitch, OutputLine, Pcf8574Lcd, ToneOutput};

use crate::pins;

/// Latched input levels, true = closed (pin pulled low)
static KEY1_CLOSED: AtomicBool = AtomicBool::new(false);
static KEY2_CLOSED: AtomicBool = AtomicBool::new(false);
static SWITCH1_CLOSED: AtomicBool = AtomicBool::new(false);
static SWITCH2_CLOSED: AtomicBool = AtomicBool::new(false);

/// Tone generator state shared with the tone task
static TONE_HZ: AtomicU32 = AtomicU32::new(0);
/// Milliseconds since boot at which a timed tone ends, 0 for none
static TONE_STOP_AT_MS: AtomicU32 = AtomicU32::new(0);

/// LCD on I2C1 behind a PCF8574 backpack
pub type Lcd = Pcf8574Lcd<I2c1, Delay>;

/// CH32V203 hardware abstraction layer implementation
pub struct Ch32v203DecoderHal {
    key1: SwitchInputPin,
    key2: SwitchInputPin,
    switch1: SwitchInputPin,
    switch2: SwitchInputPin,
    indicator1: LedOutputPin,
    indicator2: LedOutputPin,
    status_led: LedOutputPin,
    tone: SidetonePwm,
    display: Lcd,
}

impl Ch32v203DecoderHal {
    /// Initialize CH32V203 hardware
    pub fn new() -> Self {
        Self {
            key1: SwitchInputPin::new(&KEY1_CLOSED, pins::KEY1_PIN),
            key2: SwitchInputPin::new(&KEY2_CLOSED, pins::KEY2_PIN),
            switch1: SwitchInputPin::new(&SWITCH1_CLOSED, pins::SWITCH1_PIN),
            switch2: SwitchInputPin::new(&SWITCH2_CLOSED, pins::SWITCH2_PIN),
            indicator1: LedOutputPin::new(pins::INDICATOR1_PIN),
            indicator2: LedOutputPin::new(pins::INDICATOR2_PIN),
            status_led: LedOutputPin::new(pins::STATUS_LED_PIN),
            tone: SidetonePwm::new(),
            display: Pcf8574Lcd::new(
                I2c1::new(),
                Delay,
                pins::LCD_ADDRESS,
                pins::LCD_COLUMNS,
                pins::LCD_ROWS,
            ),
        }
    }
}

impl Default for Ch32v203DecoderHal {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderHal for Ch32v203DecoderHal {
    type Key = SwitchInputPin;
    type ModeSwitch = SwitchInputPin;
    type Indicator = LedOutputPin;
    type Tone = SidetonePwm;
    type Display = Lcd;

    fn initialize(&mut self) -> Result<(), HalError> {
        // GPIO initialization
        self.key1.init()?;
        self.key2.init()?;
        self.switch1.init()?;
        self.switch2.init()?;
        self.indicator1.init()?;
        self.indicator2.init()?;
        self.status_led.init()?;
        self.tone.init()?;
        self.display.init()?;

        #[cfg(feature = "defmt")]
        defmt::info!("CH32V203 HAL initialized");

        Ok(())
    }

    fn key1(&mut self) -> &mut SwitchInputPin {
        &mut self.key1
    }

    fn key2(&mut self) -> &mut SwitchInputPin {
        &mut self.key2
    }

    fn mode_switch(&mut self, channel: Channel) -> &mut SwitchInputPin {
        match channel {
            Channel::One => &mut self.switch1,
            Channel::Two => &mut self.switch2,
        }
    }

    fn mode_indicator(&mut self, channel: Channel) -> &mut LedOutputPin {
        match channel {
            Channel::One => &mut self.indicator1,
            Channel::Two => &mut self.indicator2,
        }
    }

    fn status_led(&mut self) -> &mut LedOutputPin {
        &mut self.status_led
    }

    fn tone(&mut self) -> &mut SidetonePwm {
        &mut self.tone
    }

    fn display(&mut self) -> &mut Lcd {
        &mut self.display
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        self.tone.stop()?;
        self.display.clear()?;

        #[cfg(feature = "defmt")]
        defmt::info!("CH32V203 HAL shutdown");

        Ok(())
    }
}

/// Pulled-up input (keys and transmit switches), level latched by EXTI
pub struct SwitchInputPin {
    closed: &'static AtomicBool,
    pin: u8,
}

impl SwitchInputPin {
    fn new(closed: &'static AtomicBool, pin: u8) -> Self {
        Self { closed, pin }
    }

    fn init(&self) -> Result<(), HalError> {
        // Configure the pin as input with pull-up (active-low)
        // Enable its EXTI line on both edges
        self.closed.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl InputSwitch for SwitchInputPin {
    fn is_active(&mut self) -> Result<bool, HalError> {
        Ok(self.closed.load(Ordering::Relaxed))
    }
}

/// Push-pull LED output
pub struct LedOutputPin {
    state: AtomicBool,
    pin: u8,
}

impl LedOutputPin {
    fn new(pin: u8) -> Self {
        Self {
            state: AtomicBool::new(false),
            pin,
        }
    }

    fn init(&self) -> Result<(), HalError> {
        // Configure as push-pull output, driven low
        self.state.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl OutputLine for LedOutputPin {
    fn set_state(&mut self, state: bool) -> Result<(), HalError> {
        self.state.store(state, Ordering::Relaxed);
        #[cfg(feature = "defmt")]
        defmt::trace!("LED P{}: {}", self.pin, state);
        Ok(())
    }

    fn get_state(&self) -> Result<bool, HalError> {
        Ok(self.state.load(Ordering::Relaxed))
    }
}

/// TIM2 PWM tone output on the buzzer pin
pub struct SidetonePwm;

impl SidetonePwm {
    fn new() -> Self {
        Self
    }

    fn init(&self) -> Result<(), HalError> {
        TONE_HZ.store(0, Ordering::Relaxed);
        TONE_STOP_AT_MS.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Frequency currently sounding, 0 when silent
    pub fn frequency() -> u32 {
        TONE_HZ.load(Ordering::Relaxed)
    }

    /// End a timed tone once its deadline passes
    pub fn service(now: Instant) {
        let stop_at = TONE_STOP_AT_MS.load(Ordering::Relaxed);
        if stop_at != 0 && now.as_millis() as u32 >= stop_at {
            TONE_STOP_AT_MS.store(0, Ordering::Relaxed);
            TONE_HZ.store(0, Ordering::Relaxed);
        }
    }
}

impl ToneOutput for SidetonePwm {
    fn play(&mut self, freq_hz: u32, duration: Option<Duration>) -> Result<(), HalError> {
        if freq_hz == 0 {
            return Err(HalError::ToneError);
        }
        let stop_at = duration
            .map(|d| ((Instant::now() + d).as_millis() as u32).max(1))
            .unwrap_or(0);
        TONE_STOP_AT_MS.store(stop_at, Ordering::Relaxed);
        TONE_HZ.store(freq_hz, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        TONE_STOP_AT_MS.store(0, Ordering::Relaxed);
        TONE_HZ.store(0, Ordering::Relaxed);
        Ok(())
    }
}

/// I2C1 master (PB6 SCL / PB7 SDA, 100 kHz)
pub struct I2c1 {
    _private: (),
}

impl I2c1 {
    fn new() -> Self {
        Self { _private: () }
    }
}

impl ErrorType for I2c1 {
    type Error = ErrorKind;
}

impl I2c for I2c1 {
    fn transaction(&mut self, _address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        // Register-level transfer goes here once a CH32 HAL crate is wired in
        for operation in operations {
            if let Operation::Read(buffer) = operation {
                buffer.fill(0);
            }
        }
        Ok(())
    }
}

/// Global hardware instance for the decoder task
static CH32V203_HAL: StaticCell<Ch32v203DecoderHal> = StaticCell::new();

/// Initialize global hardware instance
pub fn init_global_hal() -> &'static mut Ch32v203DecoderHal {
    CH32V203_HAL.init(Ch32v203DecoderHal::new())
}

/// EXTI handler for the key and switch lines: latch the raw level of `pin`
pub fn handle_input_interrupt(pin: u8, level_high: bool) {
    let closed = !level_high;
    let latch = match pin {
        pins::KEY1_PIN => &KEY1_CLOSED,
        pins::KEY2_PIN => &KEY2_CLOSED,
        pins::SWITCH1_PIN => &SWITCH1_CLOSED,
        pins::SWITCH2_PIN => &SWITCH2_CLOSED,
        _ => return,
    };
    latch.store(closed, Ordering::Relaxed);
}
