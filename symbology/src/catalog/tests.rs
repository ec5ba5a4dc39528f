use super::*;
use crate::drawrule::{DrawCategory, NumberedRule};

fn builtin(generation: Generation) -> SymbolCatalog {
    SymbolCatalog::builtin(generation).expect("builtin definitions should parse")
}

fn definition(code: &str, name: &str, rule: DrawRule, path: &str, geometry: Geometry) -> SymbolDefinition {
    SymbolDefinition {
        code: code.to_string(),
        name: name.to_string(),
        summary: None,
        draw_rule: rule,
        min_points: 1,
        max_points: 1,
        modifiers: Vec::new(),
        hierarchy: String::new(),
        path: path.to_string(),
        geometry,
    }
}

fn folder<'a>(catalog: &'a SymbolCatalog, path: &[&str]) -> &'a Folder {
    let mut current = catalog.root();
    for name in path {
        current = match current.child(name) {
            Some(f) => f,
            None => panic!("no folder {name} under {}", current.name()),
        };
    }
    current
}

fn symbol_names(folder: &Folder) -> Vec<&str> {
    folder.symbols().iter().map(|s| s.name()).collect()
}

#[test]
fn test_builtin_definitions_parse() {
    for generation in [Generation::C, Generation::D, Generation::E] {
        let definitions = builtin_definitions(generation).expect("should parse");
        assert!(!definitions.is_empty());
    }
}

#[test]
fn test_undrawable_and_unfiled_symbols_are_left_out() {
    let c = builtin(Generation::C);
    assert_eq!(c.len(), 40);
    assert!(c.get_symbol("GFGPGPPE--****X").is_none()); // do not draw
    assert!(c.get_symbol("GFGPGPPD--****X").is_none()); // unknown
    assert!(c.get_symbol("GFGPXCC---****X").is_none()); // basic shapes
    assert!(c.get_symbol("GFGPXRR---****X").is_none()); // no path

    let d = builtin(Generation::D);
    assert_eq!(d.len(), 39);
    assert!(d.get_symbol("10032500001301000000").is_none());
    assert!(d.get_symbol("10032500009999010000").is_none());
}

#[test]
fn test_legacy_root_folder_is_renamed() {
    let c = builtin(Generation::C);
    assert!(c.root().child("Warfighting Symbology").is_some());
    assert!(c.root().child("WARFIGHTING SYMBOLS").is_none());
    let ground = folder(&c, &["Warfighting Symbology", "Ground"]);
    assert_eq!(ground.parent(), Some("Warfighting Symbology"));
    assert_eq!(c.root().parent(), None);
}

#[test]
fn test_folder_lookup_ignores_case() {
    let c = builtin(Generation::C);
    assert!(c.root().child("warfighting symbology").is_some());
    assert!(c.root().child("tactical GRAPHICS").is_some());
}

#[test]
fn test_point_symbol_becomes_folder_symbol() {
    let c = builtin(Generation::C);
    let combat = folder(&c, &["Warfighting Symbology", "Ground", "Unit", "Combat"]);
    assert_eq!(
        symbol_names(combat),
        vec!["Air Defense", "Armor", "Engineer", "Field Artillery", "Reconnaissance"]
    );
    let infantry = combat.child("Infantry").expect("infantry folder");
    let own = infantry.symbol().expect("infantry folder has its own symbol");
    assert_eq!(own.code, "S*G*UCI---*****");
    assert_eq!(symbol_names(infantry), vec!["Mechanized"]);
    assert_eq!(infantry.symbols()[0].full_name, "Infantry, Mechanized");

    let d = builtin(Generation::D);
    let maneuver = folder(&d, &["Land Unit", "Maneuver"]);
    assert!(!symbol_names(maneuver).contains(&"Infantry"));
    let infantry = maneuver.child("infantry").expect("infantry folder");
    assert_eq!(
        infantry.symbol().map(|s| s.code.as_str()),
        Some("10001000001211000000")
    );
}

#[test]
fn test_content_masks_aggregate_upwards() {
    let c = builtin(Generation::C);
    let range_fan = folder(
        &c,
        &["Tactical Graphics", "Fire Support", "Areas", "Range Fan"],
    );
    assert_eq!(range_fan.content_mask(), ShapeMask::AREA);
    let points = folder(
        &c,
        &["Tactical Graphics", "Command and Control and General Maneuver", "General", "Points"],
    );
    assert_eq!(points.content_mask(), ShapeMask::POINT);

    let mut union = ShapeMask::EMPTY;
    for child in c.root().children() {
        assert!(!child.content_mask().is_empty());
        union |= child.content_mask();
    }
    assert_eq!(c.root().content_mask(), union);
    assert!(c.root().content_mask().contains(ShapeType::Point));
    assert!(c.root().content_mask().contains(ShapeType::LineString));
}

#[test]
fn test_folders_with_nothing_drawable_are_pruned() {
    let catalog = SymbolCatalog::new(
        Generation::C,
        vec![
            definition(
                "G*G*GPPE--****X",
                "Release Point",
                DrawRule::Category(DrawCategory::DoNotDraw),
                "Graphics/Hidden",
                Geometry::DoNotDraw,
            ),
            definition(
                "G*G*GPP---****X",
                "Action Point",
                DrawRule::Category(DrawCategory::Point),
                "Graphics/Points",
                Geometry::Point,
            ),
        ],
    );
    let graphics = folder(&catalog, &["Graphics"]);
    assert!(graphics.child("Hidden").is_none());
    assert!(graphics.child("Points").is_some());
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_duplicates_keep_the_first_definition() {
    let catalog = SymbolCatalog::new(
        Generation::D,
        vec![
            definition(
                "25151100",
                "Assembly Area",
                DrawRule::Numbered(NumberedRule::new(101)),
                "Areas",
                Geometry::Polygon,
            ),
            definition(
                "25151100",
                "Another Assembly Area",
                DrawRule::Numbered(NumberedRule::new(101)),
                "Areas",
                Geometry::Polygon,
            ),
        ],
    );
    assert_eq!(catalog.len(), 1);
    let symbol = catalog
        .get_symbol("10032500001511000000")
        .expect("assembly area");
    assert_eq!(symbol.name(), "Assembly Area");
}

#[test]
fn test_get_symbol_ignores_affiliation_and_status() {
    let c = builtin(Generation::C);
    let a = c.get_symbol("SFGPUCI---*****").expect("friendly infantry");
    let b = c.get_symbol("SHGAUCI----C***").expect("hostile infantry");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "Infantry");

    let d = builtin(Generation::D);
    let a = d.get_symbol("10061030161211000000").expect("hostile infantry");
    assert_eq!(a.code, "10001000001211000000");
}

#[test]
fn test_get_symbol_rejects_other_generations() {
    let c = builtin(Generation::C);
    assert!(c.get_symbol("10031000001211000000").is_none());
    let d = builtin(Generation::D);
    assert!(d.get_symbol("SFGPUCI---*****").is_none());
    assert!(d.get_symbol("").is_none());
}

#[test]
fn test_get_symbol_by_basic_code() {
    let d = builtin(Generation::D);
    let infantry = d.get_symbol("10121100").expect("infantry");
    assert_eq!(infantry.code, "10001000001211000000");
    let area = d.get_symbol("25151100").expect("assembly area");
    assert_eq!(area.name(), "Assembly Area");
    // Never drawn, so never filed.
    assert!(d.get_symbol("25130100").is_none());
    assert!(d.get_symbol("2515110").is_none());

    let e = builtin(Generation::E);
    assert!(e.get_symbol("10121100").is_some());
    let c = builtin(Generation::C);
    assert!(c.get_symbol("10121100").is_none());
}

#[test]
fn test_2525e_catalog_uses_2525d_definitions() {
    let e = builtin(Generation::E);
    let code = format!("13031000001211000000{}", "0".repeat(10));
    let symbol = e.get_symbol(&code).expect("infantry");
    assert_eq!(symbol.code, format!("13001000001211000000{}", "0".repeat(10)));
    assert!(e.get_symbol("10031000001211000000").is_none());
}

#[test]
fn test_symbol_modifiers_exclude_computed_ones() {
    let c = builtin(Generation::C);
    let target = c.get_symbol("GFFPATR---****X").expect("rectangular target");
    assert_eq!(target.definition.modifiers, vec!["AM", "AN", "T"]);
    assert_eq!(target.modifiers().collect::<Vec<_>>(), vec!["T"]);
    assert_eq!(target.default_source_shape(), Some(ShapeType::Rectangle));
}

#[test]
fn test_find_matches_name_prefix_and_word_prefix() {
    let c = builtin(Generation::C);
    let names: Vec<String> = c
        .find("inf", None)
        .iter()
        .map(|s| s.full_name.clone())
        .collect();
    assert_eq!(names, vec!["Combat, Infantry", "Infantry, Mechanized"]);

    let names: Vec<String> = c
        .find("RANGE", None)
        .iter()
        .map(|s| s.full_name.clone())
        .collect();
    assert_eq!(names, vec!["Range Fan, Circular", "Range Fan, Sector"]);

    // Matches must start at a word boundary.
    assert!(c.find("antry", None).is_empty());
}

#[test]
fn test_find_filters_by_shape() {
    let c = builtin(Generation::C);
    let circles = c.find("range", Some(ShapeMask::of(ShapeType::Circle)));
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].code, "G*F*AXC---****X");
    assert!(c.find("infantry", Some(ShapeMask::LINE)).is_empty());
}

#[test]
fn test_full_name_uses_last_folder() {
    assert_eq!(
        full_name(&["A".to_string(), "Range Fan".to_string()], "Sector"),
        "Range Fan, Sector"
    );
    assert_eq!(full_name(&["Air".to_string()], "Military"), "Military");
}

#[test]
fn test_path_segments() {
    assert_eq!(
        path_segments("WARFIGHTING SYMBOLS/ Ground /Unit"),
        Some(vec![
            "Warfighting Symbology".to_string(),
            "Ground".to_string(),
            "Unit".to_string()
        ])
    );
    assert_eq!(path_segments("Basic Shapes"), None);
    assert_eq!(path_segments(""), None);
}

#[test]
fn test_malformed_json_is_reported() {
    match parse_definitions("[{\"code\": 3}]", "test data") {
        Err(CatalogError::Json { origin, .. }) => assert_eq!(origin, "test data"),
        other => panic!("expected a JSON error, got {other:?}"),
    }
}
