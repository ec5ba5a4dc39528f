//! Constructions for 2525C draw categories.

use crate::drawrule::DrawCategory;

use super::{
    base_midpoint_then_corners, circle_if_hinted, circle_with_radius, edge_midpoints,
    format_value, format_values, pass_through, route, Construct, ControlPointSet, Derivation,
    RuleMetadata, AZIMUTH_MODIFIER, DISTANCE_MODIFIER,
};

const LANE: &str = "2.X.3.2.2.6";
const ACOUSTIC_BEARING_LINE: &str = "2.X.6.4.2";

pub(super) fn construction(category: DrawCategory, metadata: &RuleMetadata) -> Option<Construct> {
    use DrawCategory::*;
    let construct: Construct = match category {
        Point
        | Line
        | Polygon
        | Arrow
        | Airspace3d
        | SectorParameteredAutoshape
        | CircularRangeFanAutoshape => pass_through,
        TwoPointLine | TwoPointArrow => edge_midpoints,
        Autoshape
            if metadata.hierarchy == LANE || metadata.hierarchy == ACOUSTIC_BEARING_LINE =>
        {
            edge_midpoints
        }
        Autoshape if metadata.min_points == 3 && matches!(metadata.max_points, 3 | 4) => {
            base_midpoint_then_corners
        }
        Autoshape if metadata.max_points == 2 => circle_if_hinted,
        Autoshape => pass_through,
        SuperAutoshape => super_autoshape,
        RectangularParameteredAutoshape => rectangular_parametered,
        TwoPointRectParameteredAutoshape => two_point_rect_parametered,
        CircularParameteredAutoshape => circle_with_radius,
        Route => route,
        DoNotDraw | Unknown => return None,
    };
    Some(construct)
}

/// A rectangular target: its centre, its width and length, and the
/// bearing of its first side.
fn rectangular_parametered(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| {
        ControlPointSet::new(vec![d.mid(0, 2)])
            .with_modifier(
                DISTANCE_MODIFIER,
                format_values(&[d.distance(1, 2), d.distance(0, 1)]),
            )
            .with_modifier(AZIMUTH_MODIFIER, format_value(d.bearing(0, 1)))
    })
}

fn two_point_rect_parametered(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| {
        ControlPointSet::new(vec![d.mid(3, 2), d.mid(1, 0)])
            .with_modifier(DISTANCE_MODIFIER, format_value(d.distance(0, 1)))
    })
}

/// Super autoshapes take their points from the drawn rectangle's
/// corners and edges in an order which depends on the symbol.
fn super_autoshape(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| {
        let points = match d.metadata.hierarchy.as_str() {
            "2.X.1.10" => vec![d.p(0), d.p(1), d.p(2)],
            "2.X.3.1.7.4" => vec![d.p(0), d.p(1), d.p(3)],
            "2.X.2.3.1" | "2.X.2.4.2.2" | "2.X.2.5.3.3" | "2.X.2.6.1.1" => {
                vec![d.mid(0, 1), d.p(2), d.p(3)]
            }
            "2.X.2.5.3.4" | "2.X.3.1.6.3" | "2.X.3.2.2.2" | "6.X.4.12.3" => {
                vec![d.p(2), d.p(3), d.p(1), d.p(0)]
            }
            "2.X.2.5.2.4" | "2.X.3.1.9.1" | "2.X.3.1.9.2" | "2.X.3.1.9.3" | "2.X.3.1.9.4" => {
                vec![d.mid(3, 0), d.mid(2, 1), d.mid(3, 2)]
            }
            "2.X.1.18" | "2.X.3.2.2" => d.points.to_vec(),
            _ => vec![d.p(0), d.p(1), d.mid(3, 2)],
        };
        ControlPointSet::new(points)
    })
}
