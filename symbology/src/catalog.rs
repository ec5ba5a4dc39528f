//! The symbol catalog: a browsable, searchable tree of the symbols of
//! one generation of the standard.
//!
//! Symbol definitions are loaded from JSON.  Each definition names a
//! slash-separated category path, and the catalog files the symbol in
//! the folder at the end of that path.  Symbols which can never be
//! drawn are left out, and so are folders which end up with nothing
//! drawable in them.
//!
//! Each folder carries a content mask: the union of the shapes with
//! which the symbols inside it (at any depth) can be drawn.  This lets
//! a user interface hide whole branches which can't be drawn with the
//! shape the user has chosen.
//!
//! The tree is built the first time it is needed and never changes
//! after that.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{event, span, Level};

use sidc::normalize::{basic_code, full_code_from_basic};
use sidc::Generation;

use super::drawrule::{content_mask, default_source_shape, DrawRule, Geometry, ShapeMask, ShapeType};

const BUILTIN_2525C_SYMBOLS: &str = include_str!("../data/symbols-2525c.json");
const BUILTIN_2525D_SYMBOLS: &str = include_str!("../data/symbols-2525d.json");

const SKIPPED_PATH: &str = "Basic Shapes";
const LEGACY_ROOT_NAME: &str = "WARFIGHTING SYMBOLS";
const ROOT_NAME: &str = "Warfighting Symbology";

/// Modifiers whose values are computed from the control points
/// rather than entered by the user.
const COMPUTED_MODIFIERS: [&str; 2] = ["AM", "AN"];

fn one() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// The basic code: for 2525C a masked code with wildcard
    /// affiliation and status, for 2525D the symbol set followed by
    /// the six entity digits.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub draw_rule: DrawRule,
    #[serde(default = "one")]
    pub min_points: usize,
    #[serde(default = "one")]
    pub max_points: usize,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub hierarchy: String,
    pub path: String,
    pub geometry: Geometry,
}

/// A drawable symbol, as filed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    /// The code a client would use for this symbol.
    pub code: String,
    /// The folder name and the symbol name, so that search results
    /// make sense out of context.
    pub full_name: String,
    pub content_mask: ShapeMask,
    pub definition: SymbolDefinition,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Modifiers the user can supply.  Those computed from control
    /// points are excluded.
    pub fn modifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.definition
            .modifiers
            .iter()
            .map(String::as_str)
            .filter(|m| !COMPUTED_MODIFIERS.contains(m))
    }

    pub fn default_source_shape(&self) -> Option<ShapeType> {
        default_source_shape(self.content_mask)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Folder {
    name: String,
    parent: Option<String>,
    /// Keyed by lower-cased name, so that ordering and merging ignore
    /// case.
    children: BTreeMap<String, Folder>,
    symbols: Vec<Arc<Symbol>>,
    /// Set when a point symbol shares its name with this folder, which
    /// then holds that symbol's more specific variants.
    symbol: Option<Arc<Symbol>>,
    content_mask: ShapeMask,
}

impl Folder {
    fn new(name: &str, parent: Option<&str>) -> Folder {
        Folder {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            ..Folder::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Child folders, in case-insensitive order of name.
    pub fn children(&self) -> impl Iterator<Item = &Folder> + '_ {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&Folder> {
        self.children.get(&name.to_lowercase())
    }

    /// Symbols in this folder, in case-insensitive order of name.
    pub fn symbols(&self) -> &[Arc<Symbol>] {
        &self.symbols
    }

    pub fn symbol(&self) -> Option<&Arc<Symbol>> {
        self.symbol.as_ref()
    }

    pub fn content_mask(&self) -> ShapeMask {
        self.content_mask
    }

    fn folder_at(&mut self, segments: &[String]) -> &mut Folder {
        match segments.split_first() {
            None => self,
            Some((first, rest)) => {
                let parent = self.name.clone();
                let parent = if parent.is_empty() { None } else { Some(parent) };
                self.children
                    .entry(first.to_lowercase())
                    .or_insert_with(|| Folder::new(first, parent.as_deref()))
                    .folder_at(rest)
            }
        }
    }

    /// Makes point symbols which name one of their sibling folders into
    /// that folder's own symbol.
    fn attach_folder_symbols(&mut self) {
        let mut remaining = Vec::with_capacity(self.symbols.len());
        for symbol in self.symbols.drain(..) {
            let key = symbol.name().to_lowercase();
            match self.children.get_mut(&key) {
                Some(child)
                    if child.symbol.is_none()
                        && symbol.definition.geometry == Geometry::Point =>
                {
                    child.symbol = Some(symbol);
                }
                _ => remaining.push(symbol),
            }
        }
        self.symbols = remaining;
        for child in self.children.values_mut() {
            child.attach_folder_symbols();
        }
    }

    /// Computes content masks bottom-up and removes folders with
    /// nothing drawable in them.
    fn aggregate(&mut self) -> ShapeMask {
        let mut mask = self
            .symbols
            .iter()
            .fold(ShapeMask::EMPTY, |m, s| m | s.content_mask);
        if let Some(symbol) = &self.symbol {
            mask |= symbol.content_mask;
        }
        for child in self.children.values_mut() {
            mask |= child.aggregate();
        }
        self.children.retain(|_, child| !child.content_mask.is_empty());
        self.content_mask = mask;
        mask
    }

    fn sort_symbols(&mut self) {
        self.symbols.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.code.cmp(&b.code))
        });
        for child in self.children.values_mut() {
            child.sort_symbols();
        }
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io { path: PathBuf, error: std::io::Error },
    Json { origin: String, error: serde_json::Error },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            CatalogError::Io { path, error } => {
                write!(f, "failed to read symbol definitions from {}: {error}", path.display())
            }
            CatalogError::Json { origin, error } => {
                write!(f, "invalid symbol definitions in {origin}: {error}")
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Io { error, .. } => Some(error),
            CatalogError::Json { error, .. } => Some(error),
        }
    }
}

/// Parses a JSON array of symbol definitions.  `origin` is only used
/// in error messages.
pub fn parse_definitions(text: &str, origin: &str) -> Result<Vec<SymbolDefinition>, CatalogError> {
    serde_json::from_str(text).map_err(|error| CatalogError::Json {
        origin: origin.to_string(),
        error,
    })
}

pub fn load_definitions(path: &Path) -> Result<Vec<SymbolDefinition>, CatalogError> {
    let text = fs::read_to_string(path).map_err(|error| CatalogError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    parse_definitions(&text, &path.display().to_string())
}

/// The definitions compiled into the library.  2525E uses the 2525D
/// definitions.
pub fn builtin_definitions(generation: Generation) -> Result<Vec<SymbolDefinition>, CatalogError> {
    match generation {
        Generation::C => parse_definitions(BUILTIN_2525C_SYMBOLS, "builtin 2525C symbols"),
        Generation::D | Generation::E => {
            parse_definitions(BUILTIN_2525D_SYMBOLS, "builtin 2525D symbols")
        }
    }
}

/// Splits a category path into folder names, or returns `None` if
/// symbols with this path don't belong in the catalog.
fn path_segments(path: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.eq_ignore_ascii_case(LEGACY_ROOT_NAME) {
                ROOT_NAME.to_string()
            } else {
                s.to_string()
            }
        })
        .collect();
    if segments.is_empty() || segments.iter().any(|s| s == SKIPPED_PATH) {
        None
    } else {
        Some(segments)
    }
}

const DIGITS_IN_BASIC_CODE: usize = 8;

/// True for an eight-digit 2525D/E basic code (symbol set and entity).
fn is_numeric_basic_code(code: &str) -> bool {
    code.len() == DIGITS_IN_BASIC_CODE && code.bytes().all(|b| b.is_ascii_digit())
}

/// The key under which a definition is filed.  2525D definitions
/// normally give just the eight-digit basic code, but a complete code
/// is accepted too.
fn definition_key(definition: &SymbolDefinition, generation: Generation) -> String {
    let code = definition.code.trim();
    match generation {
        Generation::D | Generation::E if is_numeric_basic_code(code) => code.to_string(),
        _ => basic_code(code, generation),
    }
}

fn full_name(segments: &[String], name: &str) -> String {
    if segments.len() >= 2 {
        format!("{}, {name}", segments[segments.len() - 1])
    } else {
        name.to_string()
    }
}

#[derive(Debug)]
struct BuiltCatalog {
    root: Folder,
    by_code: HashMap<String, Arc<Symbol>>,
}

#[derive(Debug)]
pub struct SymbolCatalog {
    generation: Generation,
    definitions: Vec<SymbolDefinition>,
    built: OnceLock<BuiltCatalog>,
}

impl SymbolCatalog {
    pub fn new(generation: Generation, definitions: Vec<SymbolDefinition>) -> SymbolCatalog {
        SymbolCatalog {
            generation,
            definitions,
            built: OnceLock::new(),
        }
    }

    pub fn builtin(generation: Generation) -> Result<SymbolCatalog, CatalogError> {
        Ok(SymbolCatalog::new(generation, builtin_definitions(generation)?))
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn built(&self) -> &BuiltCatalog {
        self.built.get_or_init(|| self.build())
    }

    fn build(&self) -> BuiltCatalog {
        let span = span!(Level::DEBUG, "build_catalog", generation=%self.generation);
        let _enter = span.enter();
        let mut root = Folder::default();
        let mut by_code = HashMap::new();
        for definition in &self.definitions {
            let key = definition_key(definition, self.generation);
            let Some(mask) = content_mask(definition.draw_rule, definition.geometry, &key) else {
                event!(Level::TRACE, "{} is never drawn, leaving it out", definition.code);
                continue;
            };
            let Some(segments) = path_segments(&definition.path) else {
                event!(
                    Level::TRACE,
                    "{} has path '{}', leaving it out",
                    definition.code,
                    definition.path
                );
                continue;
            };
            if by_code.contains_key(&key) {
                event!(Level::WARN, "duplicate symbol definition for {key}; keeping the first");
                continue;
            }
            let code = match self.generation {
                Generation::C => key.clone(),
                Generation::D | Generation::E => full_code_from_basic(&key, self.generation),
            };
            let symbol = Arc::new(Symbol {
                code,
                full_name: full_name(&segments, &definition.name),
                content_mask: mask,
                definition: definition.clone(),
            });
            root.folder_at(&segments).symbols.push(Arc::clone(&symbol));
            by_code.insert(key, symbol);
        }
        root.attach_folder_symbols();
        root.aggregate();
        root.sort_symbols();
        event!(
            Level::INFO,
            "built {} symbol catalog with {} symbols",
            self.generation,
            by_code.len()
        );
        BuiltCatalog { root, by_code }
    }

    /// The root of the tree.  It has no name and no symbols of its
    /// own.
    pub fn root(&self) -> &Folder {
        &self.built().root
    }

    /// All the symbols in the catalog, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = &Arc<Symbol>> + '_ {
        self.built().by_code.values()
    }

    pub fn len(&self) -> usize {
        self.built().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built().by_code.is_empty()
    }

    /// Finds the symbol for `code`, which may carry any affiliation,
    /// status or amplifiers.  Codes of another generation are not
    /// found.  The 2525D and 2525E catalogs also accept an eight-digit
    /// basic code.
    pub fn get_symbol(&self, code: &str) -> Option<Arc<Symbol>> {
        let key = match self.generation {
            Generation::D | Generation::E if is_numeric_basic_code(code) => code.to_string(),
            _ if Generation::detect(code) == Some(self.generation) => {
                basic_code(code, self.generation)
            }
            _ => return None,
        };
        self.built().by_code.get(&key).cloned()
    }

    /// Finds symbols whose full name starts with `query`, or contains a
    /// word starting with `query`, ignoring case.  If `mask` is given,
    /// only symbols drawable with at least one of its shapes are
    /// returned.  Results are ordered by full name.
    pub fn find(&self, query: &str, mask: Option<ShapeMask>) -> Vec<Arc<Symbol>> {
        let query = query.to_lowercase();
        let word = format!(" {query}");
        let mut results: Vec<Arc<Symbol>> = self
            .symbols()
            .filter(|s| mask.map_or(true, |m| s.content_mask.intersects(m)))
            .filter(|s| {
                let name = s.full_name.to_lowercase();
                name.starts_with(&query) || name.contains(&word)
            })
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            a.full_name
                .to_lowercase()
                .cmp(&b.full_name.to_lowercase())
                .then_with(|| a.code.cmp(&b.code))
        });
        results
    }
}

#[cfg(test)]
mod tests;
