//! Constructions for 2525D and 2525E draw rules.

use crate::drawrule::{Construction, ShapeType};

use super::{
    base_midpoint_then_corners, circle_if_hinted, circle_with_radius, corners_rotated,
    corners_then_base_midpoint, edge_midpoints, format_value, format_values, pass_through, route,
    Construct, ControlPointSet, Derivation, AZIMUTH_MODIFIER, DISTANCE_MODIFIER,
};

/// Depth of the symbols with a fixed-depth opening, in metres.
const FIXED_DEPTH: &str = "100000";

pub(super) fn construction(construction: Construction) -> Option<Construct> {
    use Construction::*;
    let construct: Construct = match construction {
        PassThrough => pass_through,
        DoNotDraw => return None,
        RectangleWidth => rectangle_width,
        RectangularTarget => rectangular_target,
        RectangleLength => rectangle_length,
        CornersThenBaseMidpoint => corners_then_base_midpoint,
        BaseMidpointThenCorners => base_midpoint_then_corners,
        BaseMidpointThenCornersFixedDepth => base_midpoint_then_corners_fixed_depth,
        BaseMidpointThenCornersReversed => base_midpoint_then_corners_reversed,
        EdgeMidpoints => edge_midpoints,
        ThreeEdgeMidpoints => three_edge_midpoints,
        CornersRotated => corners_rotated,
        CircularWithDistance => circular_with_distance,
        RangeFan => range_fan,
        Axis => route,
        CircleAutoshape => circle_if_hinted,
    };
    Some(construct)
}

/// The rectangle's centre line across its short sides, and its width.
fn rectangle_width(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| {
        let width = d.geodesy.distance(&d.mid(1, 2), &d.mid(3, 0));
        ControlPointSet::new(vec![d.mid(0, 1), d.mid(2, 3)])
            .with_modifier(DISTANCE_MODIFIER, format_value(width))
    })
}

fn rectangle_length(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| {
        let length = d.geodesy.distance(&d.mid(1, 2), &d.mid(3, 0));
        ControlPointSet::new(d.points.to_vec())
            .with_modifier(DISTANCE_MODIFIER, format_value(length))
    })
}

/// The first point, with the distances to the next two and the bearing
/// to the second.
fn rectangular_target(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.len() < 3 {
        return None;
    }
    Some(
        ControlPointSet::new(vec![d.p(0)])
            .with_modifier(
                DISTANCE_MODIFIER,
                format_values(&[d.distance(0, 1), d.distance(0, 2)]),
            )
            .with_modifier(AZIMUTH_MODIFIER, format_value(d.bearing(0, 1))),
    )
}

fn base_midpoint_then_corners_fixed_depth(d: &Derivation<'_>) -> Option<ControlPointSet> {
    base_midpoint_then_corners(d)
        .map(|set| set.with_modifier(DISTANCE_MODIFIER, FIXED_DEPTH.to_string()))
}

fn base_midpoint_then_corners_reversed(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| ControlPointSet::new(vec![d.mid(2, 3), d.p(1), d.p(0)]))
}

fn three_edge_midpoints(d: &Derivation<'_>) -> Option<ControlPointSet> {
    d.from_rectangle(|d| ControlPointSet::new(vec![d.mid(1, 0), d.mid(3, 2), d.mid(3, 0)]))
}

fn circular_with_distance(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.hints.shape == Some(ShapeType::Circle) {
        return circle_with_radius(d);
    }
    if d.len() < 2 {
        return None;
    }
    Some(
        ControlPointSet::new(d.points.to_vec())
            .with_modifier(DISTANCE_MODIFIER, format_value(d.distance(0, 1))),
    )
}

/// The origin of the fan, with the two ranges and the bearings of its
/// two edges.
fn range_fan(d: &Derivation<'_>) -> Option<ControlPointSet> {
    if d.len() < 3 {
        return None;
    }
    Some(
        ControlPointSet::new(vec![d.p(0)])
            .with_modifier(
                DISTANCE_MODIFIER,
                format_values(&[d.distance(0, 1), d.distance(0, 2)]),
            )
            .with_modifier(
                AZIMUTH_MODIFIER,
                format_values(&[d.bearing(0, 1), d.bearing(0, 2)]),
            ),
    )
}
