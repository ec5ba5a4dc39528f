//! The [`SymbologyEngine`] ties together code translation, the symbol
//! catalogs, control point derivation and dash pattern resolution.
//!
//! Each engine owns its tables, which are read (and, for the catalogs
//! and translation maps, indexed) once.  An engine is `Send` and
//! `Sync`, so a program normally builds one and shares it.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use sidc::table::{CodePairTable, TableError};
use sidc::translate::CodeTranslator;
use sidc::{Generation, SymbolCode};

use super::catalog::{builtin_definitions, load_definitions, CatalogError, Symbol, SymbolCatalog};
use super::controlpoints::{ControlPointDeriver, ControlPointSet, Hints, RuleMetadata};
use super::dash::{DashPattern, DashPatternResolver};
use super::drawrule::ShapeMask;
use super::geodesy::GeoPoint;
use super::renderer::Renderer;

/// Where an engine gets its tables.  Anything not given comes from the
/// tables built into the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// A file of `C,D` code pairs.
    pub code_pairs: Option<PathBuf>,
    /// A JSON file of 2525C symbol definitions.
    pub symbols_c: Option<PathBuf>,
    /// A JSON file of 2525D symbol definitions, also used for 2525E.
    pub symbols_d: Option<PathBuf>,
}

impl EngineConfig {
    /// Reads a configuration from a JSON file.  Relative table paths
    /// are taken as relative to the directory containing the file.
    pub fn load(path: &Path) -> Result<EngineConfig, EngineError> {
        let text = fs::read_to_string(path).map_err(|error| EngineError::ConfigIo {
            path: path.to_path_buf(),
            error,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&text).map_err(|error| EngineError::ConfigJson {
                path: path.to_path_buf(),
                error,
            })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let resolve = |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        Ok(EngineConfig {
            code_pairs: resolve(config.code_pairs),
            symbols_c: resolve(config.symbols_c),
            symbols_d: resolve(config.symbols_d),
        })
    }
}

#[derive(Debug)]
pub enum EngineError {
    ConfigIo {
        path: PathBuf,
        error: std::io::Error,
    },
    ConfigJson {
        path: PathBuf,
        error: serde_json::Error,
    },
    Table(TableError),
    Catalog(CatalogError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EngineError::ConfigIo { path, error } => {
                write!(f, "failed to read configuration file {}: {error}", path.display())
            }
            EngineError::ConfigJson { path, error } => {
                write!(f, "invalid configuration file {}: {error}", path.display())
            }
            EngineError::Table(e) => write!(f, "{e}"),
            EngineError::Catalog(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::ConfigIo { error, .. } => Some(error),
            EngineError::ConfigJson { error, .. } => Some(error),
            EngineError::Table(e) => Some(e),
            EngineError::Catalog(e) => Some(e),
        }
    }
}

impl From<TableError> for EngineError {
    fn from(e: TableError) -> EngineError {
        EngineError::Table(e)
    }
}

impl From<CatalogError> for EngineError {
    fn from(e: CatalogError) -> EngineError {
        EngineError::Catalog(e)
    }
}

#[derive(Debug)]
pub struct SymbologyEngine {
    translator: Arc<CodeTranslator>,
    catalog_c: Arc<SymbolCatalog>,
    catalog_d: Arc<SymbolCatalog>,
    catalog_e: Arc<SymbolCatalog>,
    deriver: Arc<ControlPointDeriver>,
    resolver: DashPatternResolver,
}

impl SymbologyEngine {
    /// An engine using the tables built into the library.
    pub fn builtin(renderer: Arc<dyn Renderer>) -> Result<SymbologyEngine, EngineError> {
        SymbologyEngine::from_config(&EngineConfig::default(), renderer)
    }

    pub fn from_config(
        config: &EngineConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<SymbologyEngine, EngineError> {
        let table = match &config.code_pairs {
            Some(path) => CodePairTable::load(path)?,
            None => CodePairTable::builtin()?,
        };
        let c_definitions = match &config.symbols_c {
            Some(path) => load_definitions(path)?,
            None => builtin_definitions(Generation::C)?,
        };
        let d_definitions = match &config.symbols_d {
            Some(path) => load_definitions(path)?,
            None => builtin_definitions(Generation::D)?,
        };
        event!(
            Level::INFO,
            "loaded {} code pairs, {} 2525C and {} 2525D symbol definitions",
            table.len(),
            c_definitions.len(),
            d_definitions.len()
        );
        let catalog_c = Arc::new(SymbolCatalog::new(Generation::C, c_definitions));
        let catalog_d = Arc::new(SymbolCatalog::new(Generation::D, d_definitions.clone()));
        let catalog_e = Arc::new(SymbolCatalog::new(Generation::E, d_definitions));
        let deriver = Arc::new(ControlPointDeriver::default());
        let resolver = DashPatternResolver::new(
            vec![
                Arc::clone(&catalog_c),
                Arc::clone(&catalog_d),
                Arc::clone(&catalog_e),
            ],
            Arc::clone(&deriver),
            renderer,
        );
        Ok(SymbologyEngine {
            translator: Arc::new(CodeTranslator::new(table)),
            catalog_c,
            catalog_d,
            catalog_e,
            deriver,
            resolver,
        })
    }

    pub fn translator(&self) -> &CodeTranslator {
        &self.translator
    }

    pub fn catalog(&self, generation: Generation) -> &SymbolCatalog {
        match generation {
            Generation::C => &self.catalog_c,
            Generation::D => &self.catalog_d,
            Generation::E => &self.catalog_e,
        }
    }

    pub fn deriver(&self) -> &ControlPointDeriver {
        &self.deriver
    }

    pub fn translate(&self, code: &str, from: Generation, to: Generation) -> Option<SymbolCode> {
        self.translator.translate(code, from, to)
    }

    /// Looks the symbol up in the catalog of the code's own generation.
    pub fn get_symbol(&self, code: &str) -> Option<Arc<Symbol>> {
        let generation = Generation::detect(code)?;
        self.catalog(generation).get_symbol(code)
    }

    pub fn find(&self, generation: Generation, query: &str, mask: Option<ShapeMask>) -> Vec<Arc<Symbol>> {
        self.catalog(generation).find(query, mask)
    }

    /// Derives control points for the symbol with this code.
    pub fn derive_for_code(
        &self,
        code: &str,
        points: &[GeoPoint],
        hints: &Hints,
    ) -> Option<ControlPointSet> {
        let symbol = self.get_symbol(code)?;
        self.deriver
            .derive(&RuleMetadata::from(&symbol.definition), points, hints)
    }

    pub fn resolve(&self, code: &str) -> Option<DashPattern> {
        self.resolver.resolve(code)
    }
}
