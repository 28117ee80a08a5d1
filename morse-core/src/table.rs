//! Morse symbol table and the per-letter symbol buffer

use heapless::Vec;

use crate::types::Symbol;

/// Longest sequence the buffer keeps. Table entries are at most 5 long.
pub const MAX_SYMBOLS: usize = 6;

/// Character emitted for a sequence with no table entry
pub const UNKNOWN: char = '?';

/// Letters A-Z followed by digits 0-9
pub const SYMBOL_TABLE: [(&str, char); 36] = [
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
    ("-----", '0'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
];

/// Exact-match lookup of a symbol sequence
pub fn lookup(symbols: &[Symbol]) -> Option<char> {
    SYMBOL_TABLE
        .iter()
        .find(|(code, _)| {
            code.len() == symbols.len()
                && code
                    .chars()
                    .zip(symbols.iter())
                    .all(|(c, s)| c == s.as_char())
        })
        .map(|(_, ch)| *ch)
}

/// Dot/dash notation for a character (case-insensitive)
pub fn code_for(ch: char) -> Option<&'static str> {
    let upper = ch.to_ascii_uppercase();
    SYMBOL_TABLE
        .iter()
        .find(|(_, c)| *c == upper)
        .map(|(code, _)| *code)
}

/// Symbols keyed since the last resolved letter.
///
/// Pushing past [`MAX_SYMBOLS`] is refused and poisons the sequence, so an
/// over-long run of dots can never alias a shorter table entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolSequence {
    symbols: Vec<Symbol, MAX_SYMBOLS>,
    overflowed: bool,
}

impl SymbolSequence {
    pub const fn new() -> Self {
        Self {
            symbols: Vec::new(),
            overflowed: false,
        }
    }

    /// Append a symbol; returns false if it was refused
    pub fn push(&mut self, symbol: Symbol) -> bool {
        if self.overflowed || self.symbols.push(symbol).is_err() {
            self.overflowed = true;
            return false;
        }
        true
    }

    /// Resolve to a table character or [`UNKNOWN`]
    pub fn resolve(&self) -> char {
        if self.overflowed {
            return UNKNOWN;
        }
        lookup(&self.symbols).unwrap_or(UNKNOWN)
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.overflowed = false;
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.overflowed
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }
}
