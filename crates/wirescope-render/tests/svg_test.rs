use std::path::PathBuf;
use wirescope_core::SchematicData;
use wirescope_render::interaction::Selection;
use wirescope_render::svg::{SvgRenderOptions, render_schematic_svg};
use wirescope_render::viewport::ViewBox;
use wirescope_render::{LayoutOptions, layout_schematic};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn door_module() -> SchematicData {
    let path = workspace_root()
        .join("fixtures")
        .join("schematics")
        .join("door_module.json");
    let text = std::fs::read_to_string(&path).expect("fixture");
    serde_json::from_str(&text).expect("schematic json")
}

fn render(data: &SchematicData, options: &SvgRenderOptions) -> String {
    let layout = layout_schematic(data, &LayoutOptions::default()).expect("layout");
    render_schematic_svg(&layout, data, options).expect("svg")
}

fn has_class(node: &roxmltree::Node<'_, '_>, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

#[test]
fn svg_is_well_formed_and_tags_every_element() {
    let data = door_module();
    let svg = render(&data, &SvgRenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("data-schematic-name"), Some("Door module"));
    assert!(root.attribute("viewBox").is_some());

    let components: Vec<_> = doc
        .descendants()
        .filter(|n| has_class(n, "component"))
        .filter_map(|n| n.attribute("data-component-id"))
        .collect();
    assert_eq!(components, vec!["A12", "K7", "M3", "B5", "SP101", "G1"]);

    let wires: Vec<_> = doc
        .descendants()
        .filter(|n| has_class(n, "wire"))
        .filter_map(|n| n.attribute("data-wire-index"))
        .collect();
    assert_eq!(wires, vec!["0", "1", "2", "3", "4", "5"]);

    let a12_x1 = doc
        .descendants()
        .find(|n| {
            has_class(n, "connector")
                && n.attribute("data-component-id") == Some("A12")
                && n.attribute("data-connector-id") == Some("X1")
        })
        .expect("A12/X1 connector");
    assert_eq!(a12_x1.attribute("data-connections"), Some("2"));
    assert_eq!(a12_x1.attribute("data-gender"), Some("Male"));
}

#[test]
fn splice_renders_as_two_circles_without_connector_boxes() {
    let svg = render(&door_module(), &SvgRenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let splice = doc
        .descendants()
        .find(|n| n.attribute("data-component-id") == Some("SP101") && has_class(n, "component"))
        .expect("splice group");
    assert!(splice.descendants().any(|n| has_class(&n, "splice-outer")));
    assert!(splice.descendants().any(|n| has_class(&n, "splice-inner")));
    assert!(!splice.descendants().any(|n| has_class(&n, "connector")));
}

#[test]
fn striped_wire_gets_a_dashed_overlay_and_tridents() {
    let svg = render(&door_module(), &SvgRenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let w0 = doc
        .descendants()
        .find(|n| has_class(n, "wire") && n.attribute("data-wire-index") == Some("0"))
        .expect("wire 0");
    let path = w0
        .children()
        .find(|n| has_class(n, "wire-path"))
        .expect("wire path");
    assert_eq!(path.attribute("stroke"), Some("red"));
    let stripe = w0
        .children()
        .find(|n| has_class(n, "wire-stripe"))
        .expect("stripe");
    assert_eq!(stripe.attribute("stroke"), Some("white"));
    assert_eq!(w0.children().filter(|n| has_class(n, "trident")).count(), 2);
    let title = w0
        .children()
        .find(|n| n.tag_name().name() == "title")
        .and_then(|n| n.text());
    assert_eq!(title, Some("W-17 F23"));
}

#[test]
fn hops_become_arcs_in_the_wire_path() {
    let data = door_module();
    let mut layout = layout_schematic(&data, &LayoutOptions::default()).expect("layout");
    let rail_y = layout.wires[0].points[1].y;
    let start_x = layout.wires[0].points[1].x;
    let end_x = layout.wires[0].points[2].x;
    let mid = (start_x + end_x) / 2.0;
    layout.wires[0].hops = vec![wirescope_render::model::Hop {
        x: mid,
        y: rail_y,
        radius: 5.0,
    }];
    let svg = render_schematic_svg(&layout, &data, &SvgRenderOptions::default()).expect("svg");
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let d = doc
        .descendants()
        .find(|n| has_class(n, "wire-path"))
        .and_then(|n| n.attribute("d"))
        .expect("path data");
    assert_eq!(d.matches(" A").count(), 1);
    let sweep = if end_x >= start_x { "0 0 1" } else { "0 0 0" };
    assert!(d.contains(sweep), "{d}");
}

#[test]
fn selection_is_highlighted() {
    let data = door_module();
    let options = SvgRenderOptions {
        selection: Selection::Wire(3),
        ..SvgRenderOptions::default()
    };
    let svg = render(&data, &options);
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let selected: Vec<_> = doc
        .descendants()
        .filter(|n| has_class(n, "selected"))
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].attribute("data-wire-index"), Some("3"));
}

#[test]
fn explicit_viewbox_is_used_verbatim() {
    let options = SvgRenderOptions {
        viewbox: Some(ViewBox::new(-10.0, 20.5, 727.2727, 545.4546)),
        ..SvgRenderOptions::default()
    };
    let svg = render(&door_module(), &options);
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    assert_eq!(
        doc.root_element().attribute("viewBox"),
        Some("-10 20.5 727.273 545.455")
    );
}

#[test]
fn non_finite_coordinates_render_as_the_fallback() {
    let data = door_module();
    let mut layout = layout_schematic(&data, &LayoutOptions::default()).expect("layout");
    layout.components[0].x = f64::NAN;
    layout.components[0].label_y = f64::INFINITY;
    layout.wires[0].points[1].y = f64::NAN;

    let options = SvgRenderOptions {
        coordinate_fallback: 7.0,
        ..SvgRenderOptions::default()
    };
    let svg = render_schematic_svg(&layout, &data, &options).expect("svg");
    assert!(!svg.contains("NaN"));
    assert!(!svg.contains("inf"));

    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let body = doc
        .descendants()
        .find(|n| has_class(n, "component-body"))
        .expect("first component body");
    assert_eq!(body.attribute("x"), Some("7"));
}

#[test]
fn labels_are_escaped() {
    let mut data = door_module();
    data.components[0].label = "Door <ECU> & \"body\"".to_string();
    let svg = render(&data, &SvgRenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let label = doc
        .descendants()
        .find(|n| has_class(n, "component-label"))
        .and_then(|n| n.text());
    assert_eq!(label, Some("Door <ECU> & \"body\""));
}
