//! Main loop body: ties switches, key, display and transcript together

use core::fmt::Write;

use crate::display::DisplayCursor;
use crate::fsm::{DecoderEvent, KeyingDecoder};
use crate::hal::{DecoderHal, HalError, InputSwitch, Instant, OutputLine, ToneOutput};
use crate::mode::{ModeChange, ModeSelector};
use crate::types::{Channel, DecoderConfig, TransmitMode};

/// Text shown on the display at power-up
pub const SPLASH: &str = "Morse Code";

/// Failure inside one controller step
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// Board I/O failed
    Hal(HalError),
    /// Transcript sink refused a write
    Transcript,
}

impl From<HalError> for ControllerError {
    fn from(error: HalError) -> Self {
        ControllerError::Hal(error)
    }
}

impl From<core::fmt::Error> for ControllerError {
    fn from(_: core::fmt::Error) -> Self {
        ControllerError::Transcript
    }
}

#[cfg(feature = "std")]
impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControllerError::Hal(error) => write!(f, "hardware error: {}", error),
            ControllerError::Transcript => write!(f, "transcript write failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}

/// Owns every piece of decoder state; one `poll` is one main loop pass.
pub struct Controller {
    config: DecoderConfig,
    modes: ModeSelector,
    decoder: KeyingDecoder,
    cursor: DisplayCursor,
}

impl Controller {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            modes: ModeSelector::new(config.debounce),
            decoder: KeyingDecoder::new(config.timing, config.settle),
            cursor: DisplayCursor::new(),
        }
    }

    /// Power-up: splash screen, serial banner, every output off
    pub fn start<H, W>(&mut self, hal: &mut H, transcript: &mut W) -> Result<(), ControllerError>
    where
        H: DecoderHal,
        W: Write,
    {
        hal.initialize()?;

        self.cursor.reset(hal.display())?;
        // Left up until the first letter writes over it
        self.cursor.banner(hal.display(), SPLASH)?;

        hal.status_led().set_state(false)?;
        hal.mode_indicator(Channel::One).set_state(false)?;
        hal.mode_indicator(Channel::Two).set_state(false)?;
        hal.tone().stop()?;

        writeln!(transcript)?;
        writeln!(transcript, "Morse Code decoder")?;
        writeln!(transcript, "-------------------------------")?;
        writeln!(transcript, "Key in Morse Code to decode:")?;
        writeln!(transcript, "-------------------------------")?;

        #[cfg(feature = "defmt")]
        defmt::info!("Decoder started, {} WPM", self.config.wpm());

        Ok(())
    }

    /// One main loop pass: mode switches, then key capture, then letter and
    /// word boundaries.
    pub fn poll<H, W>(&mut self, hal: &mut H, transcript: &mut W, now: Instant) -> Result<(), ControllerError>
    where
        H: DecoderHal,
        W: Write,
    {
        let raw_one = hal.mode_switch(Channel::One).is_active()?;
        let raw_two = hal.mode_switch(Channel::Two).is_active()?;
        for change in self.modes.update(raw_one, raw_two, now) {
            self.apply_mode_change(hal, transcript, change)?;
        }

        let key1 = hal.key1().is_active()?;
        let key2 = hal.key2().is_active()?;
        for event in self.decoder.update(key1 || key2, now) {
            self.apply_event(hal, transcript, event)?;
        }

        Ok(())
    }

    fn apply_mode_change<H, W>(&mut self, hal: &mut H, transcript: &mut W, change: ModeChange) -> Result<(), ControllerError>
    where
        H: DecoderHal,
        W: Write,
    {
        let channel = change.channel();
        match change {
            ModeChange::Activated(_) => {
                hal.mode_indicator(channel).set_state(true)?;
                hal.mode_indicator(channel.other()).set_state(false)?;
                hal.mode_switch(channel.other()).release()?;
                self.cursor.reset(hal.display())?;
                self.cursor.banner(hal.display(), channel.banner())?;
                writeln!(transcript, "Transmit switch {} activated.", channel.number())?;
            }
            ModeChange::Deactivated(_) => {
                hal.mode_indicator(channel).set_state(false)?;
                self.cursor.reset(hal.display())?;
                writeln!(transcript, "Transmit switch {} deactivated.", channel.number())?;
            }
        }
        self.decoder.mark_mode_change();

        #[cfg(feature = "defmt")]
        defmt::info!("{:?}", change);

        Ok(())
    }

    fn apply_event<H, W>(&mut self, hal: &mut H, transcript: &mut W, event: DecoderEvent) -> Result<(), ControllerError>
    where
        H: DecoderHal,
        W: Write,
    {
        match event {
            DecoderEvent::PressStarted { clear_display } => {
                if clear_display {
                    self.cursor.reset(hal.display())?;
                }
                hal.status_led().set_state(true)?;
                hal.tone().play(self.config.sidetone_hz, None)?;
            }
            DecoderEvent::Released { .. } => {
                hal.status_led().set_state(false)?;
                hal.tone().stop()?;
            }
            DecoderEvent::Letter { ch, matched } => {
                transcript.write_char(ch)?;
                if !matched {
                    hal.tone()
                        .play(self.config.error_tone_hz, Some(self.config.error_tone))?;
                }
                self.cursor.write(hal.display(), ch)?;
            }
            DecoderEvent::WordBreak => {
                transcript.write_char('_')?;
                self.cursor.write(hal.display(), ' ')?;
            }
            DecoderEvent::LineBreak => {
                writeln!(transcript)?;
            }
        }
        Ok(())
    }

    /// Active transmit mode
    pub fn mode(&self) -> TransmitMode {
        self.modes.mode()
    }

    pub fn decoder(&self) -> &KeyingDecoder {
        &self.decoder
    }

    pub fn cursor(&self) -> &DisplayCursor {
        &self.cursor
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

/// Async main loop: poll the controller every `poll_interval`, forever.
#[cfg(feature = "embassy-time")]
pub async fn decoder_task<H, W>(hal: &mut H, transcript: &mut W, config: DecoderConfig) -> !
where
    H: DecoderHal,
    W: Write,
{
    use embassy_time::Timer;

    let mut controller = Controller::new(config);
    if let Err(_error) = controller.start(hal, transcript) {
        #[cfg(feature = "defmt")]
        defmt::error!("Start-up failed: {:?}", _error);
    }

    loop {
        if let Err(_error) = controller.poll(hal, transcript, Instant::now()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Poll failed: {:?}", _error);
        }

        Timer::after(config.poll_interval).await;
    }
}
