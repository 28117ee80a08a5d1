//! embedded-hal adapters against embedded-hal-mock pins and buses

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use morse_core::{
    CharDisplay, EmbeddedHalOutput, EmbeddedHalSwitch, HalError, InputSwitch, OutputLine, Pcf8574Lcd,
};

const LCD_ADDRESS: u8 = 0x3F;

#[test]
fn test_switch_reads_active_low() {
    let pin = PinMock::new(&[
        PinTransaction::get(PinState::Low),
        PinTransaction::get(PinState::High),
    ]);
    let mut key = EmbeddedHalSwitch::new(pin);
    assert!(key.is_active().unwrap());
    assert!(!key.is_active().unwrap());
    key.into_inner().done();
}

#[test]
fn test_indicator_drives_pin() {
    let pin = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let mut led = EmbeddedHalOutput::new(pin, false);
    led.set_state(true).unwrap();
    led.toggle().unwrap();
    assert!(!led.get_state().unwrap());
    led.into_inner().done();
}

#[test]
fn test_inverted_indicator() {
    let pin = PinMock::new(&[PinTransaction::set(PinState::Low)]);
    let mut led = EmbeddedHalOutput::new(pin, true);
    led.set_state(true).unwrap();
    assert!(led.get_state().unwrap());
    led.into_inner().done();
}

/// The two I2C writes that latch one nibble with the backlight on
fn nibble(value: u8, rs: bool) -> [I2cTransaction; 1] {
    let byte = (value & 0xF0) | 0x08 | u8::from(rs);
    [I2cTransaction::write(LCD_ADDRESS, vec![byte | 0x04, byte])]
}

fn byte(value: u8, rs: bool) -> Vec<I2cTransaction> {
    let mut transactions = Vec::new();
    transactions.extend(nibble(value, rs));
    transactions.extend(nibble(value << 4, rs));
    transactions
}

#[test]
fn test_lcd_writes_character_at_row_three() {
    let mut expected = byte(0x80 | (0x54 + 5), false);
    expected.extend(byte(b'S', true));
    let mut lcd = Pcf8574Lcd::new(I2cMock::new(&expected), NoopDelay::new(), LCD_ADDRESS, 20, 4);

    lcd.set_cursor(5, 3).unwrap();
    lcd.write_char('S').unwrap();

    let (mut bus, _) = lcd.release();
    bus.done();
}

#[test]
fn test_lcd_init_and_clear() {
    let mut expected = Vec::new();
    for value in [0x30, 0x30, 0x30, 0x20] {
        expected.extend(nibble(value, false));
    }
    for command in [0x28, 0x0C, 0x01, 0x06, 0x01] {
        expected.extend(byte(command, false));
    }
    let mut lcd = Pcf8574Lcd::new(I2cMock::new(&expected), NoopDelay::new(), LCD_ADDRESS, 20, 4);

    lcd.init().unwrap();
    lcd.clear().unwrap();

    let (mut bus, _) = lcd.release();
    bus.done();
}

#[test]
fn test_lcd_bus_error_maps_to_display_error() {
    let expected = [I2cTransaction::write(LCD_ADDRESS, vec![0x0C, 0x08]).with_error(ErrorKind::Other)];
    let mut lcd = Pcf8574Lcd::new(I2cMock::new(&expected), NoopDelay::new(), LCD_ADDRESS, 20, 4);

    assert_eq!(lcd.clear(), Err(HalError::DisplayError));

    let (mut bus, _) = lcd.release();
    bus.done();
}

#[test]
fn test_non_ascii_shown_as_question_mark() {
    let expected = byte(b'?', true);
    let mut lcd = Pcf8574Lcd::new(I2cMock::new(&expected), NoopDelay::new(), LCD_ADDRESS, 20, 4);
    lcd.write_char('é').unwrap();
    let (mut bus, _) = lcd.release();
    bus.done();
}
