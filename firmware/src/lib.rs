#![no_std]

//! Firmware library: CH32V203 board support, serial transcript and tasks

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;
pub use static_cell::StaticCell;

pub use morse_core::*;

// Re-export hardware implementations
pub use crate::ch32v203_hardware::*;
pub use crate::tasks::*;
pub use crate::transcript::DefmtTranscript;

/// CH32V203 pin assignment
pub mod pins {
    /// Morse key 1 (PA0, EXTI0)
    pub const KEY1_PIN: u8 = 0;

    /// Morse key 2 (PA1, EXTI1)
    pub const KEY2_PIN: u8 = 1;

    /// Transmit mode switch 1 (PA4, EXTI4)
    pub const SWITCH1_PIN: u8 = 4;

    /// Transmit mode switch 2 (PA5, EXTI5)
    pub const SWITCH2_PIN: u8 = 5;

    /// Transmit mode 1 indicator LED (PB0)
    pub const INDICATOR1_PIN: u8 = 16;

    /// Transmit mode 2 indicator LED (PB1)
    pub const INDICATOR2_PIN: u8 = 17;

    /// Keying status LED (PB2)
    pub const STATUS_LED_PIN: u8 = 18;

    /// Buzzer, TIM2 CH3 PWM (PA2)
    pub const BUZZER_PIN: u8 = 2;

    /// PCF8574 backpack address of the 20x4 LCD
    pub const LCD_ADDRESS: u8 = 0x3F;

    pub const LCD_COLUMNS: u8 = 20;
    pub const LCD_ROWS: u8 = 4;
}

pub mod transcript {
    //! Serial transcript sink: buffers a line, then emits it over defmt

    use core::fmt;
    use heapless::String;

    /// Characters buffered before a forced flush
    pub const LINE_CAPACITY: usize = 64;

    /// `fmt::Write` sink that forwards complete lines to the debug probe
    #[derive(Default)]
    pub struct DefmtTranscript {
        line: String<LINE_CAPACITY>,
    }

    impl DefmtTranscript {
        pub const fn new() -> Self {
            Self { line: String::new() }
        }

        /// Emit whatever is buffered
        pub fn flush(&mut self) {
            #[cfg(feature = "defmt")]
            defmt::println!("{=str}", self.line.as_str());
            self.line.clear();
        }

        /// Text waiting for the end of its line
        pub fn pending(&self) -> &str {
            &self.line
        }
    }

    impl fmt::Write for DefmtTranscript {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for ch in s.chars() {
                if ch == '\n' {
                    self.flush();
                    continue;
                }
                if self.line.push(ch).is_err() {
                    self.flush();
                    self.line.push(ch).map_err(|_| fmt::Error)?;
                }
            }
            Ok(())
        }
    }
}

// Embassy tasks module
pub mod tasks {
    use super::*;
    use embassy_time::{Instant, Timer};

    /// Decoder main loop on the board hardware
    #[embassy_executor::task]
    pub async fn decoder_task_wrapper(hal: &'static mut Ch32v203DecoderHal, config: DecoderConfig) {
        #[cfg(feature = "defmt")]
        defmt::info!("Decoder task started");

        let mut transcript = DefmtTranscript::new();
        morse_core::controller::decoder_task(hal, &mut transcript, config).await
    }

    /// Ends timed tones (the error tone) on schedule
    #[embassy_executor::task]
    pub async fn tone_task() {
        loop {
            SidetonePwm::service(Instant::now());
            Timer::after(Duration::from_millis(5)).await;
        }
    }
}

// CH32V203 hardware module
pub mod ch32v203_hardware;

// Time driver for embassy
pub mod time_driver;
