//! Translation of symbol codes between 2525C, 2525D and 2525E.
//!
//! 2525C and 2525D codes are related by a lookup table, and the
//! lookup is keyed on codes from which affiliation and status have
//! been removed.  A successful lookup has the original affiliation
//! and status written back into the result.
//!
//! When translating towards 2525C, a 2525D code with no table entry
//! is made progressively coarser (modifiers, then entity subtype,
//! then entity type, then entity are zeroed) until one of its
//! ancestors matches.  This loses detail but means that most codes
//! translate to something sensible.  Translating the result back to
//! 2525D and then to 2525C again gives the same answer, because the
//! coarsened code is itself a table entry.
//!
//! 2525D and 2525E differ only in their version number and in the
//! ten extra digits of 2525E, so translation between those two is
//! structural.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use tracing::{event, Level};

use super::code::{c_field, d_field, overwrite, SymbolCode};
use super::generation::{Generation, VERSION_2525D, VERSION_2525D_CHANGE_1, VERSION_2525E};
use super::identity::{self, is_weather, Affiliation, Status};
use super::normalize::{normalize, reduce_from};
use super::table::{CodePairTable, TableError};

/// How far a code had to be simplified before it matched a table
/// entry.  The variants are in the order the translator tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reduction {
    /// The normalized code was in the table.
    Exact,
    /// Matched after replacing affiliation and status (and for 2525D
    /// the headquarters and echelon amplifiers) by placeholders.
    Placeholders,
    Modifiers,
    EntitySubtype,
    EntityType,
    Entity,
}

impl Reduction {
    /// True if information identifying the symbol (rather than just
    /// its affiliation or status) was discarded.
    pub fn is_degraded(&self) -> bool {
        *self > Reduction::Placeholders
    }
}

impl Display for Reduction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Reduction::Exact => "exact",
            Reduction::Placeholders => "affiliation and status ignored",
            Reduction::Modifiers => "modifiers ignored",
            Reduction::EntitySubtype => "entity subtype ignored",
            Reduction::EntityType => "entity type ignored",
            Reduction::Entity => "entity ignored",
        })
    }
}

/// The degrading ladder: each entry zeroes the 2525D code from the
/// given position onward.
const LADDER: [(usize, Reduction); 4] = [
    (d_field::MODIFIER_1, Reduction::Modifiers),
    (d_field::ENTITY_SUBTYPE, Reduction::EntitySubtype),
    (d_field::ENTITY_TYPE, Reduction::EntityType),
    (d_field::ENTITY, Reduction::Entity),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub code: SymbolCode,
    pub reduction: Reduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Exact,
    BestMatch,
}

#[derive(Debug, Default)]
struct TranslationMaps {
    c_to_d: HashMap<String, String>,
    d_to_c: HashMap<String, String>,
}

/// Converts codes between generations.
///
/// The lookup maps are built from the table on first use (or by an
/// explicit call to [`CodeTranslator::init`]) and are read-only
/// afterwards, so a translator can be shared freely between threads.
#[derive(Debug)]
pub struct CodeTranslator {
    table: CodePairTable,
    maps: OnceLock<TranslationMaps>,
}

impl CodeTranslator {
    pub fn new(table: CodePairTable) -> CodeTranslator {
        CodeTranslator {
            table,
            maps: OnceLock::new(),
        }
    }

    pub fn builtin() -> Result<CodeTranslator, TableError> {
        Ok(CodeTranslator::new(CodePairTable::builtin()?))
    }

    /// Builds the lookup maps.  Returns true only for the call which
    /// actually did the work; calling it again (from any thread) does
    /// nothing and returns false.
    pub fn init(&self) -> bool {
        let mut built = false;
        self.maps.get_or_init(|| {
            built = true;
            self.build_maps()
        });
        built
    }

    fn build_maps(&self) -> TranslationMaps {
        let mut maps = TranslationMaps::default();
        for pair in self.table.pairs() {
            let c = pair.c.as_str().to_string();
            let d = pair.d.as_str().to_string();
            if maps.c_to_d.contains_key(&c) {
                event!(Level::DEBUG, "ignoring duplicate table entry for {c}");
            } else {
                maps.c_to_d.insert(c.clone(), d.clone());
            }
            maps.d_to_c.entry(d).or_insert(c);
        }
        event!(
            Level::INFO,
            "built symbol code translation maps: {} 2525C codes, {} 2525D codes",
            maps.c_to_d.len(),
            maps.d_to_c.len()
        );
        maps
    }

    fn maps(&self) -> &TranslationMaps {
        self.maps.get_or_init(|| self.build_maps())
    }

    /// Translates `code` from generation `from` to generation `to`.
    /// `None` means that no table entry (even after simplification)
    /// matched, or that the code was not of the stated generation.
    pub fn translate(&self, code: &str, from: Generation, to: Generation) -> Option<SymbolCode> {
        self.translate_detailed(code, from, to).map(|t| t.code)
    }

    /// Like [`CodeTranslator::translate`] but never discards
    /// information which identifies the symbol.
    pub fn translate_exact(
        &self,
        code: &str,
        from: Generation,
        to: Generation,
    ) -> Option<SymbolCode> {
        self.dispatch(code, from, to, Mode::Exact).map(|t| t.code)
    }

    /// Like [`CodeTranslator::translate`] but also reports how much
    /// the code had to be simplified.
    pub fn translate_detailed(
        &self,
        code: &str,
        from: Generation,
        to: Generation,
    ) -> Option<Translation> {
        self.dispatch(code, from, to, Mode::BestMatch)
    }

    fn dispatch(&self, code: &str, from: Generation, to: Generation, mode: Mode) -> Option<Translation> {
        match (from, to) {
            (Generation::C, Generation::C) => same_generation(code, Generation::C),
            (Generation::D, Generation::D) => same_generation(code, Generation::D),
            (Generation::E, Generation::E) => same_generation(code, Generation::E),
            (Generation::C, Generation::D) => self.c_to_d(code),
            (Generation::C, Generation::E) => {
                let via = self.c_to_d(code)?;
                let code = d_to_e(via.code.as_str())?;
                Some(Translation {
                    code,
                    reduction: via.reduction,
                })
            }
            (Generation::D | Generation::E, Generation::C) => {
                if Generation::detect(code) != Some(from) {
                    return None;
                }
                self.d_to_c(code, mode)
            }
            (Generation::D, Generation::E) => d_to_e(code).map(unreduced),
            (Generation::E, Generation::D) => e_to_d(code).map(unreduced),
        }
    }

    fn c_to_d(&self, code: &str) -> Option<Translation> {
        let maps = self.maps();
        let normalized = normalize(code, Generation::C);
        let weather = is_weather(&normalized);
        let affiliation = identity::affiliation(&normalized, Generation::C);
        let status = identity::status(&normalized, Generation::C);

        let mut candidates = vec![(normalized.clone(), Reduction::Exact)];
        if !weather {
            let placeholder = c_field::PLACEHOLDER.to_string();
            let wildcard = c_field::WILDCARD.to_string();
            let without_status = overwrite(&normalized, c_field::STATUS, &placeholder);
            let without_either = overwrite(&without_status, c_field::AFFILIATION, &wildcard);
            candidates.push((without_status, Reduction::Placeholders));
            candidates.push((without_either, Reduction::Placeholders));
        }

        let (found, reduction) = candidates
            .iter()
            .find_map(|(key, reduction)| maps.c_to_d.get(key).map(|d| (d, *reduction)))?;
        let mut result = found.clone();
        if !weather {
            if let Some(a) = affiliation {
                result = identity::with_affiliation(&result, Generation::D, a);
            }
            if let Some(s) = status {
                result = identity::with_status(&result, Generation::D, s);
            }
        }
        event!(
            Level::DEBUG,
            "translated 2525C code {code} to 2525D code {result} ({reduction})"
        );
        SymbolCode::parse_as(&result, Generation::D)
            .ok()
            .map(|code| Translation { code, reduction })
    }

    fn d_to_c(&self, code: &str, mode: Mode) -> Option<Translation> {
        let maps = self.maps();
        let normalized = normalize(code, Generation::D);
        let affiliation = identity::affiliation(&normalized, Generation::D);
        let status = identity::status(&normalized, Generation::D);

        let placeholders = identity::with_affiliation(
            &identity::with_status(&normalized, Generation::D, Status::Present),
            Generation::D,
            Affiliation::Pending,
        );
        let placeholders = overwrite(&placeholders, d_field::HQ_TF_DUMMY, "000");

        let mut candidates = vec![
            (normalized.clone(), Reduction::Exact),
            (placeholders.clone(), Reduction::Placeholders),
        ];
        if mode == Mode::BestMatch {
            candidates.extend(
                LADDER
                    .iter()
                    .map(|(start, reduction)| (reduce_from(&placeholders, *start), *reduction)),
            );
        }

        let Some((found, reduction)) = candidates
            .iter()
            .find_map(|(key, reduction)| maps.d_to_c.get(key).map(|c| (c, *reduction)))
        else {
            event!(Level::DEBUG, "no 2525C equivalent for 2525D code {code}");
            return None;
        };
        if reduction.is_degraded() {
            event!(
                Level::DEBUG,
                "2525D code {code} translated only after simplification ({reduction})"
            );
        }
        let mut result = found.clone();
        if !is_weather(&result) {
            if let Some(a) = affiliation {
                result = identity::with_affiliation(&result, Generation::C, a);
            }
            // Present is the placeholder the table uses, so it stays
            // as it is.
            if let Some(s) = status.filter(|s| *s != Status::Present) {
                result = identity::with_status(&result, Generation::C, s);
            }
        }
        SymbolCode::parse_as(&result, Generation::C)
            .ok()
            .map(|code| Translation { code, reduction })
    }
}

fn unreduced(code: SymbolCode) -> Translation {
    Translation {
        code,
        reduction: Reduction::Exact,
    }
}

fn same_generation(code: &str, generation: Generation) -> Option<Translation> {
    SymbolCode::parse_as(&normalize(code, generation), generation)
        .ok()
        .map(unreduced)
}

/// Converts a 20-digit 2525D code to 2525E by changing the version
/// number and appending ten zeros.
pub fn d_to_e(code: &str) -> Option<SymbolCode> {
    if code.chars().count() != Generation::D.canonical_len()
        || !(code.starts_with(VERSION_2525D) || code.starts_with(VERSION_2525D_CHANGE_1))
    {
        return None;
    }
    let mut converted = String::from(VERSION_2525E);
    converted.extend(code.chars().skip(2));
    converted.push_str("0000000000");
    SymbolCode::parse_as(&converted, Generation::E).ok()
}

/// Converts a 30-digit 2525E code to 2525D by changing the version
/// number and dropping the last ten digits.
pub fn e_to_d(code: &str) -> Option<SymbolCode> {
    if code.chars().count() != Generation::E.canonical_len() || !code.starts_with(VERSION_2525E) {
        return None;
    }
    let mut converted = String::from(VERSION_2525D);
    converted.extend(code.chars().skip(2).take(Generation::D.canonical_len() - 2));
    SymbolCode::parse_as(&converted, Generation::D).ok()
}
