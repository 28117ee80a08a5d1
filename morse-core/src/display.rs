//! Write position tracking for the character display

use crate::hal::{CharDisplay, HalError};

/// Display width in characters
pub const COLUMNS: u8 = 20;
/// Display height in rows
pub const ROWS: u8 = 4;

/// Cursor cell on the grid
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorPosition {
    pub col: u8,
    pub row: u8,
}

/// Places decoded characters on the grid, wrapping column then row.
///
/// Running off the bottom returns the cursor to the top-left; the old text
/// stays visible until the next character arrives, which clears the grid
/// before being written. There is no scrollback.
#[derive(Copy, Clone, Debug, Default)]
pub struct DisplayCursor {
    position: CursorPosition,
    clear_pending: bool,
}

impl DisplayCursor {
    pub const fn new() -> Self {
        Self {
            position: CursorPosition { col: 0, row: 0 },
            clear_pending: false,
        }
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// True once the grid is full and the next write will clear it
    pub fn clear_pending(&self) -> bool {
        self.clear_pending
    }

    /// Write one character at the cursor and advance
    pub fn write<D: CharDisplay>(&mut self, display: &mut D, ch: char) -> Result<(), HalError> {
        if self.clear_pending {
            display.clear()?;
            self.clear_pending = false;
        }

        display.set_cursor(self.position.col, self.position.row)?;
        display.write_char(ch)?;

        self.position.col += 1;
        if self.position.col >= COLUMNS {
            self.position.col = 0;
            self.position.row += 1;
            if self.position.row >= ROWS {
                self.position.row = 0;
                self.clear_pending = true;
            }
        }
        Ok(())
    }

    /// Clear the grid and home the cursor
    pub fn reset<D: CharDisplay>(&mut self, display: &mut D) -> Result<(), HalError> {
        display.clear()?;
        self.position = CursorPosition::default();
        self.clear_pending = false;
        Ok(())
    }

    /// Write fixed text at the top-left without moving the cursor
    pub fn banner<D: CharDisplay>(&self, display: &mut D, text: &str) -> Result<(), HalError> {
        display.set_cursor(0, 0)?;
        display.write_str(text)
    }
}
