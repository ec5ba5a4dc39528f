//! The validated symbol code value type.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::generation::Generation;

/// Positions of the fields of a 2525C code.
pub mod c_field {
    pub const CODING_SCHEME: usize = 0;
    pub const AFFILIATION: usize = 1;
    pub const BATTLE_DIMENSION: usize = 2;
    pub const STATUS: usize = 3;
    pub const FUNCTION_ID: usize = 4;
    /// HQ, task force and feint/dummy indicator; `H` here marks an
    /// installation and `M`/`N` a mobility indicator.
    pub const MODIFIER_1: usize = 10;
    /// Echelon, or the second letter of a mobility indicator.
    pub const MODIFIER_2: usize = 11;
    pub const COUNTRY: usize = 12;
    pub const ORDER_OF_BATTLE: usize = 14;

    pub const WILDCARD: char = '*';
    pub const PLACEHOLDER: char = '-';
}

/// Positions of the fields of a 2525D code.  A 2525E code has the
/// same layout for its first 20 digits.
pub mod d_field {
    pub const VERSION: usize = 0;
    pub const CONTEXT: usize = 2;
    pub const AFFILIATION: usize = 3;
    pub const SYMBOL_SET: usize = 4;
    pub const STATUS: usize = 6;
    pub const HQ_TF_DUMMY: usize = 7;
    pub const AMPLIFIER: usize = 8;
    pub const ENTITY: usize = 10;
    pub const ENTITY_TYPE: usize = 12;
    pub const ENTITY_SUBTYPE: usize = 14;
    pub const MODIFIER_1: usize = 16;
    pub const MODIFIER_2: usize = 18;
}

/// Signals that a string is not a well-formed code of any
/// generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedCode {
    Empty,
    UnknownGeneration(String),
    WrongLength {
        generation: Generation,
        expected: usize,
        found: usize,
    },
    InvalidCharacters {
        generation: Generation,
        code: String,
    },
}

impl Display for MalformedCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            MalformedCode::Empty => f.write_str("symbol code is empty"),
            MalformedCode::UnknownGeneration(code) => {
                write!(
                    f,
                    "'{code}' does not start with a known 2525C, 2525D or 2525E marker"
                )
            }
            MalformedCode::WrongLength {
                generation,
                expected,
                found,
            } => write!(
                f,
                "a {generation} symbol code should be {expected} characters long but this one has {found}"
            ),
            MalformedCode::InvalidCharacters { generation, code } => {
                write!(f, "'{code}' contains characters not valid in a {generation} symbol code")
            }
        }
    }
}

impl Error for MalformedCode {}

fn pattern(generation: Generation) -> &'static Regex {
    static C: OnceLock<Regex> = OnceLock::new();
    static D: OnceLock<Regex> = OnceLock::new();
    static E: OnceLock<Regex> = OnceLock::new();
    let (cell, source) = match generation {
        Generation::C => (&C, r"^[A-Z][A-Z0-9*\-]{14}$"),
        Generation::D => (&D, r"^1[01][0-9]{18}$"),
        Generation::E => (&E, r"^13[0-9]{28}$"),
    };
    cell.get_or_init(|| Regex::new(source).expect("symbol code patterns should be valid"))
}

/// A symbol code which is well-formed for exactly one generation.
///
/// Operations on codes never modify them in place; they return new
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolCode {
    generation: Generation,
    text: String,
}

impl SymbolCode {
    /// Strictly validates `code`.  No normalization is performed, so
    /// lower-case or truncated codes are rejected.
    pub fn parse(code: &str) -> Result<SymbolCode, MalformedCode> {
        if code.is_empty() {
            return Err(MalformedCode::Empty);
        }
        match Generation::detect(code) {
            Some(generation) => SymbolCode::parse_as(code, generation),
            None => Err(MalformedCode::UnknownGeneration(code.to_string())),
        }
    }

    /// Validates `code` as a code of the given generation.  A 2525D
    /// code is accepted with either of its version numbers.
    pub fn parse_as(code: &str, generation: Generation) -> Result<SymbolCode, MalformedCode> {
        if code.is_empty() {
            return Err(MalformedCode::Empty);
        }
        let found = code.chars().count();
        if found != generation.canonical_len() {
            return Err(MalformedCode::WrongLength {
                generation,
                expected: generation.canonical_len(),
                found,
            });
        }
        if pattern(generation).is_match(code) {
            Ok(SymbolCode {
                generation,
                text: code.to_string(),
            })
        } else {
            Err(MalformedCode::InvalidCharacters {
                generation,
                code: code.to_string(),
            })
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Returns the character at `index`.  Well-formed codes are
    /// ASCII, so this is also the byte at `index`.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.text.as_bytes().get(index).map(|b| char::from(*b))
    }
}

impl Display for SymbolCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for SymbolCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for SymbolCode {
    type Err = MalformedCode;

    fn from_str(s: &str) -> Result<SymbolCode, MalformedCode> {
        SymbolCode::parse(s)
    }
}

impl TryFrom<String> for SymbolCode {
    type Error = MalformedCode;

    fn try_from(s: String) -> Result<SymbolCode, MalformedCode> {
        SymbolCode::parse(&s)
    }
}

impl From<SymbolCode> for String {
    fn from(code: SymbolCode) -> String {
        code.text
    }
}

/// Returns the character at `index` of a possibly malformed code.
pub(crate) fn char_at(code: &str, index: usize) -> Option<char> {
    code.chars().nth(index)
}

/// Returns a copy of `code` in which the characters starting at
/// `start` are overwritten by `replacement`.  If `code` is too short
/// to hold the whole replacement, it is returned unchanged.
pub(crate) fn overwrite(code: &str, start: usize, replacement: &str) -> String {
    let mut chars: Vec<char> = code.chars().collect();
    let end = start + replacement.chars().count();
    if end > chars.len() {
        return code.to_string();
    }
    for (slot, ch) in chars[start..end].iter_mut().zip(replacement.chars()) {
        *slot = ch;
    }
    chars.into_iter().collect()
}

/// Returns a copy of `code` in which every character from `start`
/// onward is replaced by `fill`.
pub(crate) fn fill_from(code: &str, start: usize, fill: char) -> String {
    code.chars()
        .enumerate()
        .map(|(i, ch)| if i >= start { fill } else { ch })
        .collect()
}
