//! Encoding generations of the symbol identification code.
//!
//! MIL-STD-2525C codes are 15 characters of letters, digits and the
//! placeholder characters `-` and `*`.  2525D codes are 20 decimal
//! digits beginning with a version number (`10`, or `11` for change
//! 1, which we treat as the same layout).  2525E codes are 30 digits
//! beginning with `13`; their first 20 digits have the 2525D layout.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_strategy::Arbitrary;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Generation {
    #[serde(rename = "2525C")]
    C,
    #[serde(rename = "2525D")]
    D,
    #[serde(rename = "2525E")]
    E,
}

pub const VERSION_2525D: &str = "10";
pub const VERSION_2525D_CHANGE_1: &str = "11";
pub const VERSION_2525E: &str = "13";

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::C, Generation::D, Generation::E];

    /// The number of characters in a complete code of this
    /// generation.
    pub const fn canonical_len(&self) -> usize {
        match self {
            Generation::C => 15,
            Generation::D => 20,
            Generation::E => 30,
        }
    }

    /// The character used to fill in fields which are absent from a
    /// short code.
    pub const fn padding(&self) -> char {
        match self {
            Generation::C => '-',
            Generation::D | Generation::E => '0',
        }
    }

    /// Works out which generation a code was written for, from its
    /// leading characters.  This doesn't check that the rest of the
    /// code is well-formed.
    pub fn detect(code: &str) -> Option<Generation> {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(first), _) if first.is_ascii_alphabetic() => Some(Generation::C),
            (Some('1'), Some('0' | '1')) => Some(Generation::D),
            (Some('1'), Some('3')) => Some(Generation::E),
            _ => None,
        }
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Generation::C => "2525C",
            Generation::D => "2525D",
            Generation::E => "2525E",
        })
    }
}

/// Parses a generation name as a user would write it on a command
/// line: `C`, `2525C`, `d`, `2525e` and so on.
impl std::str::FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Generation, String> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("2525").unwrap_or(upper.as_str()) {
            "C" => Ok(Generation::C),
            "D" => Ok(Generation::D),
            "E" => Ok(Generation::E),
            _ => Err(format!("unknown MIL-STD-2525 generation '{s}'")),
        }
    }
}

#[test]
fn test_detect() {
    assert_eq!(Generation::detect("SFGPUCI-------G"), Some(Generation::C));
    assert_eq!(Generation::detect("sfgpuci"), Some(Generation::C));
    assert_eq!(
        Generation::detect("10031000001211000000"),
        Some(Generation::D)
    );
    assert_eq!(
        Generation::detect("11031000001211000000"),
        Some(Generation::D)
    );
    assert_eq!(
        Generation::detect("130310000012110000000000000000"),
        Some(Generation::E)
    );
    assert_eq!(Generation::detect("12"), None);
    assert_eq!(Generation::detect(""), None);
    assert_eq!(Generation::detect("1"), None);
}

#[test]
fn test_parse_generation_name() {
    assert_eq!("c".parse::<Generation>(), Ok(Generation::C));
    assert_eq!("2525D".parse::<Generation>(), Ok(Generation::D));
    assert_eq!(" 2525e ".parse::<Generation>(), Ok(Generation::E));
    assert!("2525B".parse::<Generation>().is_err());
}
