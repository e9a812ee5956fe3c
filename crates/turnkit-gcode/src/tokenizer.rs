//! Line tokenizer
//!
//! Turns one raw program line into a list of typed address words. Comments
//! (`; ...` and `( ... )`) are removed first, then the line is uppercased and
//! scanned letter by letter. Only the addresses the interpreter understands
//! are kept; any other letter is consumed together with its value and dropped.

use serde::{Deserialize, Serialize};
use turnkit_core::{AuxCode, GcodeError};

/// Address letters understood by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Address {
    G,
    M,
    N,
    X,
    Z,
    U,
    W,
    F,
    R,
    P,
    Q,
}

impl Address {
    /// Map an uppercase letter to an address, `None` for letters that are ignored
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'G' => Some(Address::G),
            'M' => Some(Address::M),
            'N' => Some(Address::N),
            'X' => Some(Address::X),
            'Z' => Some(Address::Z),
            'U' => Some(Address::U),
            'W' => Some(Address::W),
            'F' => Some(Address::F),
            'R' => Some(Address::R),
            'P' => Some(Address::P),
            'Q' => Some(Address::Q),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Address::G => 'G',
            Address::M => 'M',
            Address::N => 'N',
            Address::X => 'X',
            Address::Z => 'Z',
            Address::U => 'U',
            Address::W => 'W',
            Address::F => 'F',
            Address::R => 'R',
            Address::P => 'P',
            Address::Q => 'Q',
        }
    }
}

/// One address word, e.g. `X20.5`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub address: Address,
    pub value: f64,
}

/// The recognized words of one program line.
///
/// A line with an empty word list does not form a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizedLine {
    /// 0-based index of the line in the program
    pub line_index: usize,
    pub words: Vec<Word>,
}

impl TokenizedLine {
    /// True when the line produced no recognized word
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First value carried by the given address
    pub fn value(&self, address: Address) -> Option<f64> {
        self.words
            .iter()
            .find(|w| w.address == address)
            .map(|w| w.value)
    }

    pub fn has(&self, address: Address) -> bool {
        self.words.iter().any(|w| w.address == address)
    }

    /// True when the line carries an X or Z word
    pub fn has_axis(&self) -> bool {
        self.has(Address::X) || self.has(Address::Z)
    }

    /// All G codes on the line, in order
    pub fn g_codes(&self) -> impl Iterator<Item = f64> + '_ {
        self.words
            .iter()
            .filter(|w| w.address == Address::G)
            .map(|w| w.value)
    }

    pub fn has_g(&self, code: u32) -> bool {
        self.g_codes().any(|g| g == f64::from(code))
    }

    /// First of G0/G1/G2/G3 on the line
    pub fn motion_code(&self) -> Option<u32> {
        self.g_codes()
            .find(|g| matches!(*g as i64, 0..=3) && g.fract() == 0.0)
            .map(|g| g as u32)
    }

    /// First M code on the line
    pub fn aux_code(&self) -> Option<AuxCode> {
        self.words
            .iter()
            .find(|w| w.address == Address::M)
            .map(|w| AuxCode(w.value as u16))
    }

    /// Block label declared with `N`
    pub fn label(&self) -> Option<u32> {
        self.value(Address::N).map(|v| v as u32)
    }
}

/// Remove `;` line comments and parenthesised comments.
///
/// An unclosed `(` comments out the rest of the line.
pub fn strip_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_paren = false;
    for c in line.chars() {
        if in_paren {
            if c == ')' {
                in_paren = false;
            }
            continue;
        }
        match c {
            ';' => break,
            '(' => in_paren = true,
            _ => out.push(c),
        }
    }
    out
}

fn is_literal_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

/// Tokenize a single line.
///
/// `line_index` is 0-based; errors report it 1-based.
pub fn tokenize_line(line_index: usize, line: &str) -> Result<TokenizedLine, GcodeError> {
    let cleaned = strip_comments(line).to_uppercase();
    let chars: Vec<char> = cleaned.chars().collect();
    let line_number = line_index + 1;
    let mut words = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if !c.is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        // "X 20" is the same word as "X20"
        let mut start = i + 1;
        while start < chars.len() && matches!(chars[start], ' ' | '\t') {
            start += 1;
        }
        let mut end = start;
        while end < chars.len() && is_literal_char(chars[end]) {
            end += 1;
        }
        let text: String = chars[start..end].iter().collect();
        i = end;

        let Some(address) = Address::from_letter(c) else {
            continue;
        };

        let value: f64 = text.parse().map_err(|_| GcodeError::InvalidNumber {
            line_number,
            letter: c,
            text: text.clone(),
        })?;
        if !value.is_finite() {
            return Err(GcodeError::InvalidNumber {
                line_number,
                letter: c,
                text,
            });
        }

        match address {
            Address::N => {
                if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
                    return Err(GcodeError::InvalidLabel { line_number, text });
                }
            }
            Address::G | Address::M => {
                let limit = if address == Address::M {
                    f64::from(u16::MAX)
                } else {
                    f64::from(u32::MAX)
                };
                if value < 0.0 || value > limit || (address == Address::M && value.fract() != 0.0)
                {
                    return Err(GcodeError::InvalidCode {
                        line_number,
                        letter: c,
                        value,
                    });
                }
            }
            _ => {}
        }

        words.push(Word { address, value });
    }

    Ok(TokenizedLine { line_index, words })
}
