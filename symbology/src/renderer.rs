//! The interface to whatever actually draws multi-point symbols.
//!
//! This crate never draws anything itself.  The dash pattern
//! resolver asks a renderer to draw a sample of a symbol and then
//! inspects the stroke styles of what comes back.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::geodesy::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// ARGB.
    pub color: u32,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> StrokeStyle {
        StrokeStyle {
            color: 0xFFFF_FFFF,
            width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest<'a> {
    pub code: &'a str,
    pub points: &'a [GeoPoint],
    pub modifiers: &'a BTreeMap<String, String>,
    pub stroke: StrokeStyle,
}

/// One feature of a rendered symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedFeature {
    pub points: Vec<GeoPoint>,
    /// Alternating on and off lengths, if the feature is stroked with
    /// a dashed line.
    pub dash_array: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer doesn't know how to draw this symbol.
    Unsupported(String),
    Failed(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            RenderError::Unsupported(code) => write!(f, "renderer cannot draw symbol {code}"),
            RenderError::Failed(msg) => write!(f, "rendering failed: {msg}"),
        }
    }
}

impl Error for RenderError {}

pub trait Renderer: Send + Sync {
    fn render_multipoint(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<Vec<RenderedFeature>, RenderError>;
}

/// A renderer for clients which never resolve dash patterns.  It
/// refuses to draw anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_multipoint(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<Vec<RenderedFeature>, RenderError> {
        Err(RenderError::Unsupported(request.code.to_string()))
    }
}
