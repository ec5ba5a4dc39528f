//! Placement of MIL-STD-2525 symbols: a browsable catalog of the
//! symbols of each generation of the standard, derivation of the
//! control points of multi-point symbols from the shapes a user draws,
//! and the dash patterns of their strokes.
//!
//! Symbol codes themselves are handled by the `sidc` crate.
#![crate_name = "symbology"]

mod catalog;
mod controlpoints;
mod dash;
mod drawrule;
mod engine;
mod geodesy;
mod renderer;

pub use catalog::{
    builtin_definitions, load_definitions, parse_definitions, CatalogError, Folder, Symbol,
    SymbolCatalog, SymbolDefinition,
};
pub use controlpoints::{
    ControlPointDeriver, ControlPointSet, Hints, RuleMetadata, AZIMUTH_MODIFIER,
    DISTANCE_MODIFIER,
};
pub use dash::{DashPattern, DashPatternResolver, QUERY_SHAPE};
pub use drawrule::{
    content_mask, default_source_shape, has_explicit_control_points, Construction, DrawCategory,
    DrawRule, Geometry, NumberedRule, ShapeMask, ShapeType, EXPLICIT_CONTROL_POINT_CODES,
};
pub use engine::{EngineConfig, EngineError, SymbologyEngine};
pub use geodesy::{normalize_bearing, GeoPoint, Geodesy, Planar, Wgs84};
pub use renderer::{
    NullRenderer, RenderError, RenderRequest, RenderedFeature, Renderer, StrokeStyle,
};
