use std::path::PathBuf;
use std::sync::Arc;
use wirescope_core::{Component, ComponentShape, Connection, ConnectionPoint, Connector, SchematicData};
use wirescope_render::geometry::Point;
use wirescope_render::interaction::HitTarget;
use wirescope_render::model::{Hop, Row, WireBand};
use wirescope_render::text::{TextMeasurer, TextMetrics, TextStyle};
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

fn component(id: &str, label: &str) -> Component {
    Component {
        id: id.to_string(),
        label: label.to_string(),
        category: String::new(),
        shape: ComponentShape::Rectangle,
        component_type: String::new(),
        connectors: vec![Connector {
            id: "X1".to_string(),
            label: "X1".to_string(),
            gender: "Female".to_string(),
            color: String::new(),
            cavity_count: 2,
        }],
    }
}

fn wire(from: &str, to: &str) -> Connection {
    let point = |c: &str| ConnectionPoint {
        component_id: c.to_string(),
        connector_id: "X1".to_string(),
        cavity: "1".to_string(),
    };
    Connection {
        from: point(from),
        to: point(to),
        color: "red".to_string(),
        label: String::new(),
        wire_details: None,
    }
}

#[test]
fn masters_sit_on_the_top_row_in_data_order() {
    let data = door_module();
    let layout = layout_schematic(&data, &LayoutOptions::default()).expect("layout");
    let cfg = LayoutOptions::default().config;

    assert_eq!(layout.components.len(), 6);
    for c in &layout.components {
        let expected = if data.is_master(&c.id) { Row::Master } else { Row::Bottom };
        assert_eq!(c.row, expected, "{}", c.id);
        let y = match c.row {
            Row::Master => cfg.margin,
            Row::Bottom => cfg.margin + cfg.component_height + cfg.row_gap,
        };
        assert_eq!(c.y, y);
    }

    for row in [Row::Master, Row::Bottom] {
        let boxes: Vec<_> = layout.components.iter().filter(|c| c.row == row).collect();
        for pair in boxes.windows(2) {
            assert!(pair[1].x >= pair[0].x + pair[0].width + cfg.component_gap - 1e-9);
        }
    }
    let bottom: Vec<&str> = layout
        .components
        .iter()
        .filter(|c| c.row == Row::Bottom)
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(bottom, vec!["M3", "B5", "SP101", "G1"]);
}

#[test]
fn unresolvable_connections_are_not_routed() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    assert_eq!(layout.wires.len(), 6);
    assert!(layout.wire(6).is_none());
    assert!(layout.bounds.width() > 0.0 && layout.bounds.height() > 0.0);
}

#[test]
fn routes_are_three_orthogonal_segments() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    for w in &layout.wires {
        assert_eq!(w.points.len(), 4);
        assert_eq!(w.points[0].x, w.points[1].x);
        assert_eq!(w.points[1].y, w.points[2].y);
        assert_eq!(w.points[2].x, w.points[3].x);
        assert!(w.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}

#[test]
fn wires_sharing_a_connector_get_distinct_slots() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    let connector = layout
        .component("A12")
        .and_then(|c| c.connector("X1"))
        .expect("A12/X1");
    let a = layout.wire(0).expect("wire 0").points[0];
    let b = layout.wire(1).expect("wire 1").points[0];
    assert_ne!(a.x, b.x);
    for p in [a, b] {
        assert!(p.x > connector.x && p.x < connector.x + connector.width);
        assert_eq!(p.y, connector.attach_y);
    }
}

#[test]
fn splice_wires_meet_on_the_dot_edge() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    let dot = layout
        .component("SP101")
        .and_then(|c| c.splice)
        .expect("splice dot");
    let incoming = layout.wire(2).expect("wire 2").points[3];
    let outgoing = layout.wire(3).expect("wire 3").points[0];
    for p in [incoming, outgoing] {
        assert_eq!(p.x, dot.cx);
        // Bottom row: the edge facing the master row is the top of the dot.
        assert_eq!(p.y, dot.cy - dot.outer_radius);
    }
}

#[test]
fn same_row_wires_run_outside_their_row() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");

    let master = layout.wire(4).expect("master-master wire");
    assert_eq!(master.band, WireBand::MasterMaster);
    let rail_y = master.points[1].y;
    assert!(rail_y > master.points[0].y && rail_y > master.points[3].y);

    let bottom = layout.wire(5).expect("bottom-bottom wire");
    assert_eq!(bottom.band, WireBand::BottomBottom);
    let rail_y = bottom.points[1].y;
    assert!(rail_y < bottom.points[0].y && rail_y < bottom.points[3].y);

    assert_eq!(layout.wire(0).expect("wire 0").band, WireBand::Cross);
}

#[test]
fn crowded_same_row_rails_stay_between_the_rows() {
    let mut connections = Vec::new();
    for _ in 0..30 {
        connections.push(wire("A", "B"));
        connections.push(wire("C", "D"));
    }
    let data = SchematicData {
        name: "crowded".to_string(),
        master_components: vec!["A".to_string(), "B".to_string()],
        components: vec![
            component("A", "A"),
            component("B", "B"),
            component("C", "C"),
            component("D", "D"),
        ],
        connections,
    };
    let layout = layout_schematic(&data, &LayoutOptions::default()).expect("layout");

    let master_bottom = layout
        .components
        .iter()
        .filter(|c| c.row == Row::Master)
        .map(|c| c.y + c.height)
        .fold(f64::MIN, f64::max);
    let bottom_top = layout
        .components
        .iter()
        .filter(|c| c.row == Row::Bottom)
        .map(|c| c.y)
        .fold(f64::MAX, f64::min);

    let mut master_rails = Vec::new();
    for w in &layout.wires {
        let rail_y = w.points[1].y;
        assert!(
            rail_y > master_bottom && rail_y < bottom_top,
            "rail {rail_y} outside {master_bottom}..{bottom_top}"
        );
        if w.band == WireBand::MasterMaster {
            master_rails.push(rail_y);
        }
    }
    assert_eq!(master_rails.len(), 30);
    master_rails.dedup();
    assert_eq!(master_rails.len(), 30);
}

#[test]
fn connection_counts_cover_every_wire_end() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    assert_eq!(layout.connection_count("A12", "X1"), 2);
    assert_eq!(layout.connection_count("A12", "X2"), 1);
    assert_eq!(layout.connection_count("SP101", "S"), 2);
    assert_eq!(layout.connection_count("GHOST", "X1"), 0);
    assert_eq!(layout.connection_counts.values().sum::<usize>(), 12);
}

#[test]
fn fuses_are_annotated_on_the_feeding_component() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    let a12 = layout.component("A12").expect("A12");
    assert_eq!(a12.fuses.len(), 1);
    assert_eq!(a12.fuses[0].text(), "F23 15A");
    assert!(layout.component("M3").expect("M3").fuses.is_empty());
}

#[test]
fn crossing_rail_gets_exactly_one_hop() {
    let data = SchematicData {
        name: "crossing".to_string(),
        master_components: vec!["A1".to_string(), "K2".to_string()],
        components: vec![
            component("A1", "Module"),
            component("K2", "Relay"),
            component("B1", "B1"),
            component("B2", "B2"),
            component("B3", "B3"),
        ],
        connections: vec![wire("A1", "B3"), wire("K2", "B2")],
    };
    let layout = layout_schematic(&data, &LayoutOptions::default()).expect("layout");

    let long = layout.wire(0).expect("wire 0");
    assert_eq!(long.points[0], Point::new(100.0, 130.0));
    assert_eq!(long.points[3], Point::new(460.0, 370.0));
    assert_eq!(
        long.hops,
        vec![Hop {
            x: 280.0,
            y: 245.0,
            radius: 5.0
        }]
    );
    // The straight wire's own rail has no length, so it never hops.
    assert!(layout.wire(1).expect("wire 1").hops.is_empty());
}

#[test]
fn hit_test_prefers_connectors_over_components_over_wires() {
    let layout = layout_schematic(&door_module(), &LayoutOptions::default()).expect("layout");
    let a12 = layout.component("A12").expect("A12");
    let x1 = a12.connector("X1").expect("X1");

    let on_connector = Point::new(x1.x + x1.width / 2.0, x1.y + x1.height / 2.0);
    assert_eq!(
        layout.hit_test(on_connector, 2.0),
        HitTarget::Connector {
            component_id: "A12".to_string(),
            connector_id: "X1".to_string()
        }
    );
    assert_eq!(
        layout.hit_test(Point::new(a12.label_x, a12.label_y), 2.0),
        HitTarget::Component("A12".to_string())
    );

    let w = layout.wire(0).expect("wire 0");
    let on_wire = Point::new(w.points[0].x, (w.points[0].y + w.points[1].y) / 2.0);
    assert_eq!(layout.hit_test(on_wire, 2.0), HitTarget::Wire(0));

    let far = Point::new(layout.bounds.max_x + 500.0, layout.bounds.max_y + 500.0);
    assert_eq!(layout.hit_test(far, 2.0), HitTarget::Canvas);
}

struct WideMeasurer;

impl TextMeasurer for WideMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as f64 * style.font_size * 2.0,
            height: style.font_size,
            line_count: 1,
        }
    }
}

#[test]
fn measured_label_widths_drive_component_widths() {
    let data = door_module();
    let narrow = layout_schematic(&data, &LayoutOptions::default()).expect("layout");
    let wide = layout_schematic(
        &data,
        &LayoutOptions {
            text_measurer: Arc::new(WideMeasurer),
            ..LayoutOptions::default()
        },
    )
    .expect("layout");

    let w = |l: &wirescope_render::SchematicLayout| l.component("B5").expect("B5").width;
    assert!(w(&wide) > w(&narrow));
    // "Door ajar sensor" at 14px * 2.0 per char plus padding on both sides.
    assert_eq!(w(&wide), 16.0 * 28.0 + 24.0);
}

#[test]
fn invalid_config_is_rejected() {
    let mut options = LayoutOptions::default();
    options.config.component_height = f64::NAN;
    let err = layout_schematic(&door_module(), &options).unwrap_err();
    assert!(matches!(err, wirescope_render::Error::InvalidConfig { .. }));
}
