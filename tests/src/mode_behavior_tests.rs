//! Transmit mode switch behavior: debounce, mutual exclusion, hand-over

use morse_core::{Channel, TransmitMode};

use crate::{script, simulation};

#[test]
fn test_switch_one_activates_transmit_one() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.idle(100).unwrap();

    assert_eq!(sim.controller.mode(), TransmitMode::Transmit1);
    assert!(sim.board.indicator1.is_active());
    assert!(!sim.board.indicator2.is_active());
    assert_eq!(sim.board.display.row(0).trim_end(), "Transmit 1");
    assert_eq!(sim.transcript, "Transmit switch 1 activated.\n");
}

#[test]
fn test_bounce_shorter_than_debounce_is_ignored() {
    let mut sim = simulation();
    for _ in 0..5 {
        sim.set_switch(Channel::Two, true);
        sim.idle(20).unwrap();
        sim.set_switch(Channel::Two, false);
        sim.idle(20).unwrap();
    }
    sim.idle(200).unwrap();
    assert_eq!(sim.controller.mode(), TransmitMode::None);
    assert!(sim.transcript.is_empty());
}

#[test]
fn test_second_switch_rejected_while_first_active() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.idle(100).unwrap();
    sim.set_switch(Channel::Two, true);
    sim.idle(200).unwrap();

    assert_eq!(sim.controller.mode(), TransmitMode::Transmit1);
    assert!(sim.board.indicator1.is_active());
    assert!(!sim.board.indicator2.is_active());
    assert!(!sim.transcript.contains("Transmit switch 2"));
    // Switch 2 was driven back to idle when switch 1 took over
    assert_eq!(sim.board.switch2.release_count(), 1);
}

#[test]
fn test_held_switch_takes_over_when_other_drops() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.idle(100).unwrap();
    sim.set_switch(Channel::Two, true);
    sim.idle(100).unwrap();
    sim.set_switch(Channel::One, false);
    sim.idle(100).unwrap();

    assert_eq!(sim.controller.mode(), TransmitMode::Transmit2);
    assert!(!sim.board.indicator1.is_active());
    assert!(sim.board.indicator2.is_active());
    assert_eq!(sim.board.display.row(0).trim_end(), "Transmit 2");
    assert_eq!(
        sim.transcript,
        "Transmit switch 1 activated.\n\
         Transmit switch 1 deactivated.\n\
         Transmit switch 2 activated.\n"
    );
}

#[test]
fn test_switch_released_while_held_still_takes_over() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.set_switch(Channel::Two, true);
    sim.idle(100).unwrap();
    assert_eq!(sim.controller.mode(), TransmitMode::Transmit1);
    assert_eq!(sim.board.switch2.release_count(), 1);

    // Releasing the held switch does not make it read open
    sim.set_switch(Channel::One, false);
    sim.idle(100).unwrap();
    assert_eq!(sim.controller.mode(), TransmitMode::Transmit2);
    assert!(sim.board.indicator2.is_active());
}

#[test]
fn test_deactivation_clears_display_and_indicator() {
    let mut sim = simulation();
    sim.set_switch(Channel::Two, true);
    sim.idle(100).unwrap();
    sim.set_switch(Channel::Two, false);
    sim.idle(100).unwrap();

    assert_eq!(sim.controller.mode(), TransmitMode::None);
    assert!(!sim.board.indicator1.is_active());
    assert!(!sim.board.indicator2.is_active());
    assert_eq!(sim.board.display.row(0).trim_end(), "");
    assert!(sim.transcript.ends_with("Transmit switch 2 deactivated.\n"));
}

#[test]
fn test_decoding_continues_across_mode_changes() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.idle(100).unwrap();
    sim.play(&script("CQ")).unwrap();

    assert_eq!(sim.controller.mode(), TransmitMode::Transmit1);
    assert_eq!(sim.transcript, "Transmit switch 1 activated.\nCQ");
    assert_eq!(sim.board.display.row(0).trim_end(), "CQ");
}

#[test]
fn test_never_both_indicators_lit() {
    let mut sim = simulation();
    let pattern = [
        (true, false),
        (true, true),
        (false, true),
        (true, true),
        (true, false),
        (false, false),
        (false, true),
    ];
    for (one, two) in pattern {
        sim.set_switch(Channel::One, one);
        sim.set_switch(Channel::Two, two);
        for _ in 0..10 {
            sim.step().unwrap();
            assert!(!(sim.board.indicator1.is_active() && sim.board.indicator2.is_active()));
        }
    }
}
