//! The table of corresponding 2525C and 2525D codes.
//!
//! The table is plain text, one pair per line, the 2525C code first:
//!
//! ```text
//! # comment
//! S*G-UCI---*****,10001000001211000000
//! ```
//!
//! The 2525C column holds the lookup form of each code (masked as by
//! [`crate::normalize::normalize`], with `*` for the affiliation and
//! `-` for the status).  The 2525D column has a pending affiliation,
//! present status and no amplifiers.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{event, Level};

use super::code::{MalformedCode, SymbolCode};
use super::generation::Generation;

const BUILTIN_CODE_PAIRS: &str = include_str!("../data/code_pairs.csv");

#[derive(Debug)]
pub enum TableError {
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    WrongColumnCount {
        line: usize,
        found: usize,
    },
    BadCode {
        line: usize,
        column: Generation,
        error: MalformedCode,
    },
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TableError::Io { path, error } => {
                write!(f, "failed to read code table {}: {error}", path.display())
            }
            TableError::WrongColumnCount { line, found } => {
                write!(f, "line {line}: expected 2 comma-separated codes, found {found}")
            }
            TableError::BadCode {
                line,
                column,
                error,
            } => write!(f, "line {line}: bad {column} code: {error}"),
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TableError::Io { error, .. } => Some(error),
            TableError::BadCode { error, .. } => Some(error),
            TableError::WrongColumnCount { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePair {
    pub c: SymbolCode,
    pub d: SymbolCode,
}

#[derive(Debug, Clone, Default)]
pub struct CodePairTable {
    pairs: Vec<CodePair>,
}

impl CodePairTable {
    pub fn parse(text: &str) -> Result<CodePairTable, TableError> {
        let mut pairs = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = content.split(',').map(str::trim).collect();
            if fields.len() != 2 {
                return Err(TableError::WrongColumnCount {
                    line,
                    found: fields.len(),
                });
            }
            let parse = |text: &str, column: Generation| {
                SymbolCode::parse_as(text, column).map_err(|error| TableError::BadCode {
                    line,
                    column,
                    error,
                })
            };
            pairs.push(CodePair {
                c: parse(fields[0], Generation::C)?,
                d: parse(fields[1], Generation::D)?,
            });
        }
        event!(Level::DEBUG, "parsed {} code pairs", pairs.len());
        Ok(CodePairTable { pairs })
    }

    /// The table compiled into the library.
    pub fn builtin() -> Result<CodePairTable, TableError> {
        CodePairTable::parse(BUILTIN_CODE_PAIRS)
    }

    pub fn load(path: &Path) -> Result<CodePairTable, TableError> {
        let text = fs::read_to_string(path).map_err(|error| TableError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        CodePairTable::parse(&text)
    }

    pub fn pairs(&self) -> &[CodePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
