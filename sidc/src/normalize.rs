//! Canonicalization of symbol codes before lookup.
//!
//! Normalization is total: any string, including an empty or garbled
//! one, produces a string of the canonical length for the requested
//! generation.  Absent trailing fields are padded, excess characters
//! are dropped, and fields which do not discriminate between table
//! entries are masked.
//!
//! For 2525C the masking depends on the coding scheme (the first
//! character):
//!
//! - `S` (warfighting) and `E` (emergency management) keep the first
//!   ten characters, or eleven for installations (those with an `H`
//!   at position 10), and mask the rest with `*`.
//! - `G` (tactical graphics) keeps ten characters and ends in
//!   `****X`.
//! - `I` (signals intelligence) keeps twelve characters.
//! - `O` (stability operations) keeps ten characters.
//! - Anything else, notably `W` (weather), is left as it is.

use super::code::{c_field, d_field, fill_from, overwrite, MalformedCode, SymbolCode};
use super::generation::{Generation, VERSION_2525D, VERSION_2525D_CHANGE_1, VERSION_2525E};

fn clamp_and_pad(code: &str, generation: Generation) -> String {
    let len = generation.canonical_len();
    let mut chars: Vec<char> = code.chars().take(len).collect();
    chars.resize(len, generation.padding());
    chars.into_iter().collect()
}

fn mask_2525c(code: &str) -> String {
    let keep = |n: usize, tail: &str| -> String {
        let mut result: String = code.chars().take(n).collect();
        result.push_str(tail);
        result
    };
    match code.chars().next() {
        Some('S' | 'E') => {
            if code.chars().nth(c_field::MODIFIER_1) == Some('H') {
                keep(11, "****")
            } else {
                keep(10, "*****")
            }
        }
        Some('G') => keep(10, "****X"),
        Some('I') => keep(12, "***"),
        Some('O') => keep(10, "*****"),
        _ => code.to_string(),
    }
}

/// Returns the canonical lookup form of `code` for `generation`.
///
/// A 2525D code carrying the version number of 2525D change 1 or of
/// 2525E is given the plain 2525D version number, which is the form
/// the translation tables use.
pub fn normalize(code: &str, generation: Generation) -> String {
    match generation {
        Generation::C => {
            let upper = code.to_ascii_uppercase();
            mask_2525c(&clamp_and_pad(&upper, generation))
        }
        Generation::D => {
            let padded = clamp_and_pad(code, generation);
            if padded.starts_with(VERSION_2525D_CHANGE_1) || padded.starts_with(VERSION_2525E) {
                overwrite(&padded, d_field::VERSION, VERSION_2525D)
            } else {
                padded
            }
        }
        Generation::E => clamp_and_pad(code, generation),
    }
}

/// Returns the key under which the symbol catalog files a symbol.
///
/// For 2525C this is the normalized code with the affiliation and
/// status replaced by `*` (weather codes have neither and keep their
/// letters).  For 2525D and 2525E it is the eight digits of the
/// symbol set followed by the entity, entity type and entity subtype.
pub fn basic_code(code: &str, generation: Generation) -> String {
    match generation {
        Generation::C => {
            let normalized = normalize(code, generation);
            if normalized.starts_with('W') {
                normalized
            } else {
                let wildcard = c_field::WILDCARD.to_string();
                let normalized = overwrite(&normalized, c_field::AFFILIATION, &wildcard);
                overwrite(&normalized, c_field::STATUS, &wildcard)
            }
        }
        Generation::D | Generation::E => {
            let normalized = clamp_and_pad(code, generation);
            let symbol_set = normalized
                .chars()
                .skip(d_field::SYMBOL_SET)
                .take(2);
            let entity = normalized
                .chars()
                .skip(d_field::ENTITY)
                .take(d_field::MODIFIER_1 - d_field::ENTITY);
            symbol_set.chain(entity).collect()
        }
    }
}

/// Expands an eight-digit 2525D basic code (symbol set and entity)
/// into a complete code with every other field zero.
pub fn full_code_from_basic(basic: &str, generation: Generation) -> String {
    let symbol_set: String = basic.chars().take(2).collect();
    let entity: String = basic.chars().skip(2).take(6).collect();
    let version = match generation {
        Generation::E => VERSION_2525E,
        Generation::C | Generation::D => VERSION_2525D,
    };
    let code = format!("{version}00{symbol_set}0000{entity}0000");
    clamp_and_pad(&code, generation)
}

/// Zeroes every digit of a 2525D code from `start` onward.  This is
/// how the translator coarsens a code one field at a time.
pub fn reduce_from(code: &str, start: usize) -> String {
    fill_from(code, start, '0')
}

/// Strict validation.  Unlike [`normalize`], this rejects anything
/// which is not already a well-formed code.
pub fn validate(code: &str) -> Result<SymbolCode, MalformedCode> {
    SymbolCode::parse(code)
}

#[cfg(test)]
mod tests;
