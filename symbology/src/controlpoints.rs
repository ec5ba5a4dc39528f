//! Derivation of control points from what the user drew.
//!
//! A user places a multi-point symbol by drawing an ordinary shape (a
//! rectangle, a circle, a line).  The renderer, however, wants the
//! symbol's own control points: for example the two ends of a lane's
//! centre line rather than the four corners of the rectangle the user
//! drew around it.  [`ControlPointDeriver::derive`] converts one into
//! the other, according to the symbol's draw rule.
//!
//! Each construction is a plain function from a `Derivation` to an
//! optional [`ControlPointSet`].  The draw rule selects the function;
//! see the `category` (2525C) and `numbered` (2525D and 2525E)
//! submodules.  A construction returns `None` when the drawn shape is
//! unsuitable, for example when a rectangle is required and the user
//! drew something else.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use super::catalog::SymbolDefinition;
use super::drawrule::{DrawRule, ShapeType};
use super::geodesy::{normalize_bearing, GeoPoint, Geodesy, Wgs84};

mod category;
mod numbered;


/// Modifier holding distances (metres, comma-separated when there are
/// several).
pub const DISTANCE_MODIFIER: &str = "AM";
/// Modifier holding azimuths (degrees, comma-separated when there are
/// several).
pub const AZIMUTH_MODIFIER: &str = "AN";

/// Corners of a drawn rectangle may deviate this far (in degrees) from
/// a right angle.
const RIGHT_ANGLE_TOLERANCE: f64 = 2.0;

/// The parts of a symbol definition which control point derivation
/// depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub draw_rule: DrawRule,
    pub min_points: usize,
    pub max_points: usize,
    pub hierarchy: String,
}

impl From<&SymbolDefinition> for RuleMetadata {
    fn from(definition: &SymbolDefinition) -> RuleMetadata {
        RuleMetadata {
            draw_rule: definition.draw_rule,
            min_points: definition.min_points,
            max_points: definition.max_points,
            hierarchy: definition.hierarchy.clone(),
        }
    }
}

/// Extra information from the user interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hints {
    /// The kind of shape the user drew, if known.
    pub shape: Option<ShapeType>,
    /// A point at which the user wants the symbol's label (and, for
    /// circles, its radius line).
    pub label: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPointSet {
    pub points: Vec<GeoPoint>,
    pub modifiers: BTreeMap<String, String>,
    /// The label or orientation point which was synthesized (or taken
    /// from the hints).  A caller can pass it back as
    /// [`Hints::label`] after the user moves it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<GeoPoint>,
}

impl ControlPointSet {
    fn new(points: Vec<GeoPoint>) -> ControlPointSet {
        ControlPointSet {
            points,
            ..ControlPointSet::default()
        }
    }

    fn with_modifier(mut self, key: &str, value: String) -> ControlPointSet {
        self.modifiers.insert(key.to_string(), value);
        self
    }

    fn with_anchor(mut self, anchor: GeoPoint) -> ControlPointSet {
        self.anchor = Some(anchor);
        self
    }
}

/// Formats a distance or bearing for a modifier value, to two decimal
/// places with trailing zeros dropped.
fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // Avoid "-0".
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_value(*v))
        .collect::<Vec<_>>()
        .join(",")
}

/// The inputs of a single construction.
struct Derivation<'a> {
    geodesy: &'a dyn Geodesy,
    metadata: &'a RuleMetadata,
    points: &'a [GeoPoint],
    hints: &'a Hints,
}

type Construct = fn(&Derivation<'_>) -> Option<ControlPointSet>;

impl Derivation<'_> {
    fn p(&self, i: usize) -> GeoPoint {
        self.points[i]
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn mid(&self, a: usize, b: usize) -> GeoPoint {
        self.geodesy.midpoint(&self.points[a], &self.points[b])
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self.geodesy.distance(&self.points[a], &self.points[b])
    }

    fn bearing(&self, a: usize, b: usize) -> f64 {
        self.geodesy.bearing(&self.points[a], &self.points[b])
    }

    /// True if the points are a closed ring of four corners, each
    /// within [`RIGHT_ANGLE_TOLERANCE`] of a right angle.
    fn is_rectangle(&self) -> bool {
        if self.len() != 5 || self.points[0] != self.points[4] {
            return false;
        }
        (0..4).all(|corner| {
            let previous = (corner + 3) % 4;
            let next = corner + 1;
            let turn = (self.bearing(corner, previous) - self.bearing(corner, next)).abs();
            let angle = if turn > 180.0 { 360.0 - turn } else { turn };
            (angle - 90.0).abs() <= RIGHT_ANGLE_TOLERANCE
        })
    }

    /// Applies `f` only if the user drew a rectangle.
    fn from_rectangle<F>(&self, f: F) -> Option<ControlPointSet>
    where
        F: FnOnce(&Self) -> ControlPointSet,
    {
        if self.is_rectangle() {
            Some(f(self))
        } else {
            event!(
                Level::DEBUG,
                "draw rule {} needs a rectangle but {} points were drawn",
                self.metadata.draw_rule,
                self.len()
            );
            None
        }
    }
}

fn pass_through(d: &Derivation<'_>) -> Option<ControlPointSet> {
    Some(ControlPointSet::new(d.points.to_vec()))
}

/// The centre line of a rectangle, from the middle of the far side to
/// the middle of the near side.  Anything other than a rectangle is
/// used as drawn.
fn edge_midpoints(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.is_rectangle() {
        Some(ControlPointSet::new(vec![d.mid(3, 2), d.mid(1, 0)]))
    } else {
        pass_through(d)
    }
}

fn base_midpoint_then_corners(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| ControlPointSet::new(vec![d.mid(3, 2), d.p(0), d.p(1)]))
}

fn corners_then_base_midpoint(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| ControlPointSet::new(vec![d.p(0), d.p(1), d.mid(3, 2)]))
}

fn corners_rotated(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| ControlPointSet::new(vec![d.p(2), d.p(3), d.p(1), d.p(0)]))
}

/// The drawn line followed by a label point: the hint if there is one,
/// otherwise a point beside the first segment, a third of the way
/// along it and a third of its length to its right.
fn route(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.len() < 2 {
        return pass_through(d);
    }
    let anchor = match d.hints.label {
        Some(label) => label,
        None => {
            let length = d.distance(0, 1);
            let bearing = d.bearing(0, 1);
            let third = d.geodesy.point_at_fraction(&d.p(0), &d.p(1), 1.0 / 3.0);
            d.geodesy
                .point_at_distance(&third, normalize_bearing(bearing + 90.0), length / 3.0)
        }
    };
    let mut points = d.points.to_vec();
    points.push(anchor);
    Some(ControlPointSet::new(points).with_anchor(anchor))
}

struct Circle {
    center: GeoPoint,
    /// The end of the radius line.
    edge: GeoPoint,
    radius: f64,
    anchor: GeoPoint,
}

/// The label of an unlabelled circle sits due north of the centre, a
/// little outside it.
const CIRCLE_ANCHOR_SCALE: f64 = 1.1;

/// Fits a circle to a drawn outline: the diameter runs from the first
/// point to the point farthest from it.  The radius line points at the
/// label, which is the label hint if there is one and otherwise lies
/// due north of the centre.
fn circle(d: &Derivation<'_>) -> Option<Circle> {
    if d.len() < 2 {
        return None;
    }
    let first = d.p(0);
    let (farthest, _) = d
        .points
        .iter()
        .skip(1)
        .map(|p| (*p, d.geodesy.distance(&first, p)))
        .fold((first, f64::NEG_INFINITY), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });
    let center = d.geodesy.midpoint(&first, &farthest);
    let radius = d.geodesy.distance(&center, &farthest);
    let (anchor, bearing) = match d.hints.label {
        Some(label) => (label, d.geodesy.bearing(&center, &label)),
        None => (
            d.geodesy
                .point_at_distance(&center, 0.0, radius * CIRCLE_ANCHOR_SCALE),
            0.0,
        ),
    };
    Some(Circle {
        center,
        edge: d.geodesy.point_at_distance(&center, bearing, radius),
        radius,
        anchor,
    })
}

/// Centre and radius point, when the user drew a circle.  Other shapes
/// are used as drawn.
fn circle_if_hinted(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.hints.shape != Some(ShapeType::Circle) {
        return pass_through(d);
    }
    let c = circle(d)?;
    Some(ControlPointSet::new(vec![c.center, c.edge]).with_anchor(c.anchor))
}

/// The centre of a drawn circle, with its radius as a distance
/// modifier.
fn circle_with_radius(d: &Derivation<'_>) -> Option<ControlPointSet> {
    let c = circle(d)?;
    Some(
        ControlPointSet::new(vec![c.center])
            .with_modifier(DISTANCE_MODIFIER, format_value(c.radius))
            .with_anchor(c.anchor),
    )
}

/// Derives control points according to each symbol's draw rule.
#[derive(Debug, Clone)]
pub struct ControlPointDeriver {
    geodesy: Arc<dyn Geodesy>,
}

impl Default for ControlPointDeriver {
    fn default() -> ControlPointDeriver {
        ControlPointDeriver::new(Arc::new(Wgs84))
    }
}

impl ControlPointDeriver {
    pub fn new(geodesy: Arc<dyn Geodesy>) -> ControlPointDeriver {
        ControlPointDeriver { geodesy }
    }

    pub fn geodesy(&self) -> &dyn Geodesy {
        self.geodesy.as_ref()
    }

    /// Derives the control points of a symbol with the rule described
    /// by `metadata` from the `points` the user drew.  Returns `None`
    /// if the symbol is never drawn, if nothing was drawn, or if the
    /// drawn shape doesn't suit the rule.
    pub fn derive(
        &self,
        metadata: &RuleMetadata,
        points: &[GeoPoint],
        hints: &Hints,
    ) -> Option<ControlPointSet> {
        let construct: Construct = match metadata.draw_rule {
            DrawRule::Category(c) => category::construction(c, metadata),
            DrawRule::Numbered(n) => numbered::construction(n.construction()),
        }?;
        if points.is_empty() {
            return None;
        }
        construct(&Derivation {
            geodesy: self.geodesy.as_ref(),
            metadata,
            points,
            hints,
        })
    }
}
