//! Draw rules and content masks.
//!
//! A draw rule says how a symbol's geometry is built from the points
//! a user draws.  2525C symbols have a draw category; 2525D and 2525E
//! symbols have a draw rule number, several numbers sharing the same
//! control point construction.
//!
//! The content mask of a symbol is the set of shapes a user could
//! draw to place it.

use std::fmt::{self, Display, Formatter};
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_strategy::Arbitrary;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeType {
    Point,
    LineString,
    Polygon,
    Rectangle,
    Circle,
    Ellipse,
}

impl ShapeType {
    pub const ALL: [ShapeType; 6] = [
        ShapeType::Point,
        ShapeType::LineString,
        ShapeType::Polygon,
        ShapeType::Rectangle,
        ShapeType::Circle,
        ShapeType::Ellipse,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for ShapeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            ShapeType::Point => "point",
            ShapeType::LineString => "line",
            ShapeType::Polygon => "polygon",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Ellipse => "ellipse",
        })
    }
}

impl FromStr for ShapeType {
    type Err = String;

    fn from_str(s: &str) -> Result<ShapeType, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(ShapeType::Point),
            "line" | "linestring" => Ok(ShapeType::LineString),
            "polygon" => Ok(ShapeType::Polygon),
            "rectangle" => Ok(ShapeType::Rectangle),
            "circle" => Ok(ShapeType::Circle),
            "ellipse" => Ok(ShapeType::Ellipse),
            _ => Err(format!("unknown shape type '{s}'")),
        }
    }
}

/// A set of [`ShapeType`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ShapeType>", into = "Vec<ShapeType>")]
pub struct ShapeMask(u8);

impl ShapeMask {
    pub const EMPTY: ShapeMask = ShapeMask(0);
    pub const POINT: ShapeMask = ShapeMask::of(ShapeType::Point);
    pub const LINE: ShapeMask = ShapeMask::of(ShapeType::LineString);
    pub const AREA: ShapeMask = ShapeMask(
        ShapeType::Polygon.bit()
            | ShapeType::Rectangle.bit()
            | ShapeType::Circle.bit()
            | ShapeType::Ellipse.bit(),
    );
    pub const AREAS_AND_LINES: ShapeMask = ShapeMask(ShapeMask::AREA.0 | ShapeMask::LINE.0);
    /// Autoshapes drawn with explicit control points.
    pub const EXPLICIT_CONTROL_POINTS: ShapeMask = ShapeMask(
        ShapeType::Rectangle.bit() | ShapeType::Polygon.bit() | ShapeType::LineString.bit(),
    );

    pub const fn of(shape: ShapeType) -> ShapeMask {
        ShapeMask(shape.bit())
    }

    pub fn contains(&self, shape: ShapeType) -> bool {
        self.0 & shape.bit() != 0
    }

    pub fn intersects(&self, other: ShapeMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn shapes(&self) -> impl Iterator<Item = ShapeType> + '_ {
        ShapeType::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl BitOr for ShapeMask {
    type Output = ShapeMask;

    fn bitor(self, rhs: ShapeMask) -> ShapeMask {
        ShapeMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ShapeMask {
    fn bitor_assign(&mut self, rhs: ShapeMask) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<ShapeType> for ShapeMask {
    fn from_iter<I: IntoIterator<Item = ShapeType>>(iter: I) -> ShapeMask {
        iter.into_iter()
            .fold(ShapeMask::EMPTY, |mask, s| mask | ShapeMask::of(s))
    }
}

impl From<Vec<ShapeType>> for ShapeMask {
    fn from(shapes: Vec<ShapeType>) -> ShapeMask {
        shapes.into_iter().collect()
    }
}

impl From<ShapeMask> for Vec<ShapeType> {
    fn from(mask: ShapeMask) -> Vec<ShapeType> {
        mask.shapes().collect()
    }
}

impl fmt::Debug for ShapeMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_set().entries(self.shapes()).finish()
    }
}

impl Display for ShapeMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let names: Vec<String> = self.shapes().map(|s| s.to_string()).collect();
        f.write_str(&names.join("|"))
    }
}

/// 2525C draw categories.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawCategory {
    Point,
    Line,
    Polygon,
    Arrow,
    Route,
    TwoPointLine,
    TwoPointArrow,
    Autoshape,
    SuperAutoshape,
    RectangularParameteredAutoshape,
    TwoPointRectParameteredAutoshape,
    CircularParameteredAutoshape,
    CircularRangeFanAutoshape,
    SectorParameteredAutoshape,
    Airspace3d,
    DoNotDraw,
    Unknown,
}

/// The control point construction shared by a group of 2525D draw
/// rule numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construction {
    PassThrough,
    DoNotDraw,
    RectangleWidth,
    RectangularTarget,
    RectangleLength,
    CornersThenBaseMidpoint,
    BaseMidpointThenCorners,
    BaseMidpointThenCornersFixedDepth,
    BaseMidpointThenCornersReversed,
    EdgeMidpoints,
    ThreeEdgeMidpoints,
    CornersRotated,
    CircularWithDistance,
    RangeFan,
    Axis,
    CircleAutoshape,
}

/// A 2525D/2525E draw rule number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct NumberedRule(u16);

impl NumberedRule {
    pub const DO_NOT_DRAW: NumberedRule = NumberedRule(0);

    pub const fn new(number: u16) -> NumberedRule {
        NumberedRule(number)
    }

    pub fn number(&self) -> u16 {
        self.0
    }

    pub fn construction(&self) -> Construction {
        match self.0 {
            0 => Construction::DoNotDraw,
            801 => Construction::RectangleWidth,
            802 => Construction::RectangularTarget,
            803 => Construction::RectangleLength,
            105 | 117 | 124 | 212 | 319 | 322 | 323 => Construction::CornersThenBaseMidpoint,
            107 | 121 | 303 => Construction::BaseMidpointThenCorners,
            326 => Construction::BaseMidpointThenCornersFixedDepth,
            329 => Construction::BaseMidpointThenCornersReversed,
            309 | 320 => Construction::EdgeMidpoints,
            601 => Construction::ThreeEdgeMidpoints,
            108 => Construction::CornersRotated,
            901 | 902 => Construction::CircularWithDistance,
            1001 => Construction::RangeFan,
            501 | 502 => Construction::Axis,
            115 | 116 => Construction::CircleAutoshape,
            _ => Construction::PassThrough,
        }
    }
}

impl From<u16> for NumberedRule {
    fn from(number: u16) -> NumberedRule {
        NumberedRule(number)
    }
}

impl From<NumberedRule> for u16 {
    fn from(rule: NumberedRule) -> u16 {
        rule.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawRule {
    Category(DrawCategory),
    Numbered(NumberedRule),
}

impl Display for DrawRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DrawRule::Category(category) => write!(f, "{category:?}"),
            DrawRule::Numbered(rule) => write!(f, "rule {} ({:?})", rule.0, rule.construction()),
        }
    }
}

/// How a symbol is placed on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Geometry {
    Point,
    Line,
    Polygon,
    RectangleParametric,
    CircleParametric,
    Route,
    Sector,
    DoNotDraw,
}

/// 2525C autoshapes which the user draws with explicit control points
/// rather than a plain polygon.
pub const EXPLICIT_CONTROL_POINT_CODES: &[&str] = &[
    // three-point
    "G*G*OAF---****X",
    "G*M*BDI---****X",
    "G*T*B-----****X",
    "G*T*C-----****X",
    "G*T*H-----****X",
    "G*T*J-----****X",
    "G*T*L-----****X",
    "G*T*M-----****X",
    "G*T*P-----****X",
    "G*T*R-----****X",
    "G*T*T-----****X",
    "G*T*W-----****X",
    "G*T*WP----****X",
    "G*T*X-----****X",
    "G*T*Z-----****X",
    "G*M*ORS---****X",
    "G*M*ORA---****X",
    "G*M*BCD---****X",
    "G*M*BCE---****X",
    "G*M*OFG---****X",
    "G*G*OAS---****X",
    "G*G*OLI---****X",
    "G*G*PD----****X",
    "G*M*BDD---****X",
    "G*M*BDE---****X",
    "G*T*Y-----****X",
    "G*M*OEB---****X",
    "G*M*OED---****X",
    "G*M*OET---****X",
    "G*G*GAS---****X",
    "G*M*ORP---****X",
    "G*M*ORC---****X",
    "G*T*US----****X",
    "G*M*OT----****X",
    "G*G*SLA---****X",
    "G*G*DLP---****X",
    "G*M*BCA---****X",
    // four-point
    "G*M*BCB---****X",
];

pub fn has_explicit_control_points(basic_code: &str) -> bool {
    EXPLICIT_CONTROL_POINT_CODES.contains(&basic_code)
}

/// Returns the shapes a symbol with this draw rule can be drawn with,
/// or `None` if it is never drawn and so doesn't belong in a catalog.
pub fn content_mask(rule: DrawRule, geometry: Geometry, basic_code: &str) -> Option<ShapeMask> {
    match rule {
        DrawRule::Category(category) => category_mask(category, basic_code),
        DrawRule::Numbered(n) if n.construction() == Construction::DoNotDraw => None,
        DrawRule::Numbered(_) => geometry_mask(geometry),
    }
}

fn category_mask(category: DrawCategory, basic_code: &str) -> Option<ShapeMask> {
    use DrawCategory::*;
    let mask = match category {
        Autoshape if has_explicit_control_points(basic_code) => {
            ShapeMask::EXPLICIT_CONTROL_POINTS
        }
        Autoshape | Line => ShapeMask::AREAS_AND_LINES,
        SuperAutoshape if has_explicit_control_points(basic_code) => {
            ShapeMask::EXPLICIT_CONTROL_POINTS
        }
        SuperAutoshape | Polygon | SectorParameteredAutoshape | Airspace3d => ShapeMask::AREA,
        Arrow | Route => ShapeMask::LINE,
        TwoPointLine | TwoPointArrow => {
            ShapeMask::of(ShapeType::Rectangle) | ShapeMask::of(ShapeType::LineString)
        }
        RectangularParameteredAutoshape | TwoPointRectParameteredAutoshape => {
            ShapeMask::of(ShapeType::Rectangle)
        }
        Point => ShapeMask::POINT,
        CircularParameteredAutoshape | CircularRangeFanAutoshape => {
            ShapeMask::of(ShapeType::Circle)
        }
        DoNotDraw | Unknown => return None,
    };
    Some(mask)
}

fn geometry_mask(geometry: Geometry) -> Option<ShapeMask> {
    match geometry {
        Geometry::Point => Some(ShapeMask::POINT),
        Geometry::Line | Geometry::Route => Some(ShapeMask::LINE),
        Geometry::Polygon | Geometry::Sector => Some(ShapeMask::AREA),
        Geometry::RectangleParametric => Some(ShapeMask::of(ShapeType::Rectangle)),
        Geometry::CircleParametric => Some(ShapeMask::of(ShapeType::Circle)),
        Geometry::DoNotDraw => None,
    }
}

/// The shape a user interface should offer first when the user starts
/// drawing a symbol with this mask.
pub fn default_source_shape(mask: ShapeMask) -> Option<ShapeType> {
    [
        ShapeType::Point,
        ShapeType::Rectangle,
        ShapeType::Circle,
        ShapeType::LineString,
        ShapeType::Polygon,
        ShapeType::Ellipse,
    ]
    .into_iter()
    .find(|s| mask.contains(*s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_mask_constants() {
        assert!(ShapeMask::AREA.contains(ShapeType::Circle));
        assert!(!ShapeMask::AREA.contains(ShapeType::LineString));
        assert!(ShapeMask::AREAS_AND_LINES.contains(ShapeType::LineString));
        assert!(ShapeMask::EMPTY.is_empty());
        assert_eq!(ShapeMask::LINE.to_string(), "line");
    }

    #[test]
    fn test_category_masks() {
        assert_eq!(
            content_mask(
                DrawRule::Category(DrawCategory::Autoshape),
                Geometry::Polygon,
                "G*T*B-----****X"
            ),
            Some(ShapeMask::EXPLICIT_CONTROL_POINTS)
        );
        assert_eq!(
            content_mask(
                DrawRule::Category(DrawCategory::Autoshape),
                Geometry::Polygon,
                "G*M*NM----****X"
            ),
            Some(ShapeMask::AREAS_AND_LINES)
        );
        assert_eq!(
            content_mask(
                DrawRule::Category(DrawCategory::TwoPointArrow),
                Geometry::Line,
                "G*G*OLKA--****X"
            ),
            Some(ShapeMask::of(ShapeType::Rectangle) | ShapeMask::LINE)
        );
        assert_eq!(
            content_mask(
                DrawRule::Category(DrawCategory::DoNotDraw),
                Geometry::DoNotDraw,
                "G*G*GPP---****X"
            ),
            None
        );
    }

    #[test]
    fn test_numbered_masks() {
        assert_eq!(
            content_mask(DrawRule::Numbered(NumberedRule::new(801)), Geometry::RectangleParametric, "25241003"),
            Some(ShapeMask::of(ShapeType::Rectangle))
        );
        assert_eq!(
            content_mask(DrawRule::Numbered(NumberedRule::DO_NOT_DRAW), Geometry::Point, "25000000"),
            None
        );
        assert_eq!(
            content_mask(DrawRule::Numbered(NumberedRule::new(201)), Geometry::DoNotDraw, "25000000"),
            None
        );
    }

    #[test]
    fn test_rule_numbers_share_constructions() {
        for n in [105, 117, 124, 212, 319, 322, 323] {
            assert_eq!(
                NumberedRule::new(n).construction(),
                Construction::CornersThenBaseMidpoint
            );
        }
        assert_eq!(NumberedRule::new(4242).construction(), Construction::PassThrough);
    }

    #[test]
    fn test_draw_rule_serialization() {
        let rule: DrawRule = serde_json::from_str(r#"{"numbered": 802}"#).expect("valid rule");
        assert_eq!(rule, DrawRule::Numbered(NumberedRule::new(802)));
        let rule: DrawRule = serde_json::from_str(r#"{"category": "Route"}"#).expect("valid rule");
        assert_eq!(rule, DrawRule::Category(DrawCategory::Route));
        let mask: ShapeMask = serde_json::from_str(r#"["Circle", "Point"]"#).expect("valid mask");
        assert_eq!(mask, ShapeMask::POINT | ShapeMask::of(ShapeType::Circle));
    }

    #[test]
    fn test_default_source_shape() {
        assert_eq!(default_source_shape(ShapeMask::AREA), Some(ShapeType::Rectangle));
        assert_eq!(default_source_shape(ShapeMask::LINE), Some(ShapeType::LineString));
        assert_eq!(default_source_shape(ShapeMask::EMPTY), None);
    }

    #[proptest]
    fn mask_from_shapes_contains_exactly_those_shapes(shapes: Vec<ShapeType>) {
        let mask: ShapeMask = shapes.iter().copied().collect();
        for s in ShapeType::ALL {
            assert_eq!(mask.contains(s), shapes.contains(&s));
        }
    }
}
