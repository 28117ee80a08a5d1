//! End-to-end decoding scenarios

use morse_core::hal::mock::ToneEvent;
use morse_core::test_utils::KeyScript;
use morse_core::{code_for, lookup, Duration, Symbol};
use rstest::rstest;

use crate::{decode, script, simulation, UNIT_MS};

#[test]
fn test_single_letter_a() {
    assert_eq!(decode("A").unwrap(), "A");
}

#[test]
fn test_sos_without_separator() {
    let mut sim = simulation();
    sim.play(&script("SOS")).unwrap();
    assert_eq!(sim.transcript, "SOS");
    assert!(sim.board.display.row(0).starts_with("SOS"));
}

#[test]
fn test_long_silence_gives_single_word_break() {
    let mut sim = simulation();
    sim.play(&script("SOS")).unwrap();
    sim.idle(5000).unwrap();
    assert_eq!(sim.transcript, "SOS_");
    assert!(sim.board.display.row(0).starts_with("SOS "));
    assert_eq!(sim.controller.cursor().position().col, 4);
}

#[test]
fn test_two_words() {
    assert_eq!(decode("HI THERE").unwrap(), "HI_THERE");
}

#[test]
fn test_unknown_sequence_plays_error_tone() {
    let mut sim = simulation();
    sim.play(&KeyScript::new(UNIT_MS).code(".......")).unwrap();
    assert_eq!(sim.transcript, "?");
    assert_eq!(sim.board.display.cell(0, 0), '?');
    assert_eq!(
        sim.board.tone.events().last(),
        Some(&ToneEvent::Play {
            freq_hz: 100,
            duration: Some(Duration::from_millis(500))
        })
    );
}

#[test]
fn test_six_symbol_sequence_without_match() {
    // Fits the buffer but is not in the table
    assert_eq!(decode_code("......"), "?");
}

#[test]
fn test_sidetone_follows_key() {
    let mut sim = simulation();
    sim.board.key1.set_active(true);
    sim.step().unwrap();
    assert_eq!(sim.board.tone.sounding(), Some(1000));
    assert!(sim.board.status_led.is_active());

    sim.board.key1.set_active(false);
    sim.idle(100).unwrap();
    assert_eq!(sim.board.tone.sounding(), None);
    assert!(!sim.board.status_led.is_active());
}

#[test]
fn test_either_key_decodes() {
    let mut sim = simulation();
    sim.board.key2.set_active(true);
    sim.idle(UNIT_MS * 3).unwrap();
    sim.board.key2.set_active(false);
    sim.idle(UNIT_MS * 4).unwrap();
    assert_eq!(sim.transcript, "T");
}

#[test]
fn test_line_break_after_twenty_characters() {
    let transcript = decode(&"E".repeat(21)).unwrap();
    assert_eq!(transcript, format!("{}\nE", "E".repeat(20)));
}

#[test]
fn test_word_breaks_count_toward_line_length() {
    // 10 letters and 10 word breaks
    let transcript = decode("E E E E E E E E E E ").unwrap();
    assert_eq!(transcript, format!("{}\n", "E_".repeat(10)));
}

#[test]
fn test_letters_spaced_too_closely_merge() {
    // Three units of silence measured from the physical release is short of
    // the letter gap once the settle time is taken off
    let merged = KeyScript::new(UNIT_MS)
        .symbol(Symbol::Dot)
        .pause(UNIT_MS * 2)
        .symbol(Symbol::Dash)
        .pause(UNIT_MS * 3);
    let mut sim = simulation();
    sim.play(&merged).unwrap();
    assert_eq!(sim.transcript, "A");
}

fn decode_code(code: &str) -> String {
    let mut sim = simulation();
    sim.play(&KeyScript::new(UNIT_MS).code(code)).unwrap();
    sim.transcript
}

#[rstest]
#[case('E', ".")]
#[case('T', "-")]
#[case('A', ".-")]
#[case('Q', "--.-")]
#[case('Y', "-.--")]
#[case('0', "-----")]
#[case('5', ".....")]
#[case('9', "----.")]
fn test_table_entries(#[case] ch: char, #[case] code: &str) {
    assert_eq!(code_for(ch), Some(code));
    let symbols: Vec<Symbol> = code.chars().filter_map(Symbol::from_char).collect();
    assert_eq!(lookup(&symbols), Some(ch));
}

#[rstest]
#[case("K")]
#[case("CQ")]
#[case("73")]
#[case("PARIS")]
fn test_decode_keyed_text(#[case] text: &str) {
    assert_eq!(decode(text).unwrap(), text);
}
