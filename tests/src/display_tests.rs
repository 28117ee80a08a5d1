//! Display placement and wrap-around

use morse_core::display::CursorPosition;
use morse_core::{Channel, COLUMNS, ROWS, SPLASH};

use crate::{script, simulation};

#[test]
fn test_first_letter_overwrites_splash() {
    let mut sim = simulation();
    assert_eq!(sim.board.display.row(0).trim_end(), SPLASH);
    sim.idle(1000).unwrap();
    assert_eq!(sim.board.display.row(0).trim_end(), SPLASH);

    sim.play(&script("E")).unwrap();
    assert_eq!(sim.board.display.row(0).trim_end(), "Eorse Code");
    assert_eq!(sim.board.display.clear_count(), 1);
}

#[test]
fn test_twenty_first_character_starts_second_row() {
    let mut sim = simulation();
    sim.play(&script(&"E".repeat(21))).unwrap();
    assert_eq!(sim.board.display.row(0), "E".repeat(COLUMNS as usize));
    assert_eq!(sim.board.display.row(1).trim_end(), "E");
    assert_eq!(sim.controller.cursor().position(), CursorPosition { col: 1, row: 1 });
}

#[test]
fn test_full_grid_wraps_and_clears_on_next_character() {
    let mut sim = simulation();
    let cells = COLUMNS as usize * ROWS as usize;

    sim.play(&script(&"E".repeat(cells))).unwrap();
    for row in 0..ROWS {
        assert_eq!(sim.board.display.row(row), "E".repeat(COLUMNS as usize));
    }
    assert_eq!(sim.controller.cursor().position(), CursorPosition::default());
    assert!(sim.controller.cursor().clear_pending());
    let clears = sim.board.display.clear_count();

    sim.play(&script("T")).unwrap();
    assert_eq!(sim.board.display.clear_count(), clears + 1);
    assert_eq!(sim.board.display.row(0).trim_end(), "T");
    assert_eq!(sim.board.display.row(3).trim_end(), "");
    assert_eq!(sim.controller.cursor().position(), CursorPosition { col: 1, row: 0 });
}

#[test]
fn test_first_press_after_mode_change_clears_banner() {
    let mut sim = simulation();
    sim.set_switch(Channel::One, true);
    sim.idle(100).unwrap();
    assert_eq!(sim.board.display.row(0).trim_end(), "Transmit 1");

    // The banner stays through silence and goes with the first press
    sim.idle(3000).unwrap();
    assert_eq!(sim.board.display.row(0).trim_end(), "Transmit 1");
    sim.play(&script("N")).unwrap();
    assert_eq!(sim.board.display.row(0).trim_end(), "N");
}
