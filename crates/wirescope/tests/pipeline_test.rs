#![cfg(feature = "render")]

use std::path::PathBuf;
use wirescope::render::{ScreenSize, SchematicRenderer, ViewerConfig, ViewerPhase};
use wirescope::{ItemKind, MergeMode, SUPPLY_VIEW_CONTEXT, normalize_str};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn payload(name: &str) -> String {
    let path = workspace_root().join("fixtures").join("payloads").join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

fn attribute_values(svg: &str, class: &str, attribute: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(svg).expect("svg parses");
    doc.descendants()
        .filter(|n| {
            n.attribute("class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == class))
        })
        .filter_map(|n| n.attribute(attribute).map(str::to_string))
        .collect()
}

#[test]
fn backend_payload_renders_end_to_end() {
    let renderer = SchematicRenderer::new();
    let svg = renderer
        .render_payload_svg(&payload("wiper_component.json"), ItemKind::Component)
        .expect("svg");

    assert_eq!(
        attribute_values(&svg, "component", "data-component-id"),
        vec!["A12", "M3", "SP101"]
    );
    // The wire to an unknown component never reaches the renderer.
    assert_eq!(attribute_values(&svg, "wire", "data-wire-index").len(), 2);
}

#[test]
fn invalid_payload_surfaces_as_a_payload_error() {
    let err = SchematicRenderer::new()
        .render_payload_svg("[1, 2]", ItemKind::Harness)
        .unwrap_err();
    assert!(matches!(err, wirescope::render::HeadlessError::Payload(_)));
}

#[test]
fn supply_view_keeps_only_supply_components() {
    let wiper = normalize_str(&payload("wiper_component.json"), ItemKind::Component).expect("wiper");
    let supply = normalize_str(&payload("washer_supply.json"), ItemKind::Supply).expect("supply");
    let renderer = SchematicRenderer::new();

    let svg = renderer
        .render_merged_svg(
            &[wiper.clone(), supply.clone()],
            Some(MergeMode::Supply),
            Some(SUPPLY_VIEW_CONTEXT),
        )
        .expect("svg");
    assert_eq!(
        attribute_values(&svg, "component", "data-component-id"),
        vec!["F12"]
    );
    assert!(attribute_values(&svg, "wire", "data-wire-index").is_empty());

    let svg = renderer
        .render_merged_svg(&[wiper, supply], None, None)
        .expect("svg");
    let ids = attribute_values(&svg, "component", "data-component-id");
    assert!(ids.contains(&"M4".to_string()));
    assert_eq!(ids.iter().filter(|id| *id == "M3").count(), 1);
}

#[test]
fn diagram_ids_are_sanitized_into_the_root() {
    let data = normalize_str(&payload("washer_supply.json"), ItemKind::Supply).expect("supply");
    let svg = SchematicRenderer::new()
        .render_svg_with_diagram_id(&data, "washer pump #1")
        .expect("svg");
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    assert_eq!(doc.root_element().attribute("id"), Some("washer-pump-1"));
}

#[test]
fn renderer_builds_a_matching_viewer() {
    let data = normalize_str(&payload("wiper_component.json"), ItemKind::Component).expect("wiper");
    let mut viewer =
        SchematicRenderer::new().viewer(ViewerConfig::default(), ScreenSize::new(1024.0, 768.0));
    viewer.load(data).expect("load");
    assert_eq!(viewer.phase(), ViewerPhase::DataLoaded);
    assert!(viewer.render_svg().expect("svg").contains("data-component-id=\"M3\""));
}

#[cfg(feature = "raster")]
#[test]
fn payload_exports_to_png_and_pdf() {
    use wirescope::render::ExportConfig;
    use wirescope::render::export::ExportFormat;

    let data = normalize_str(&payload("wiper_component.json"), ItemKind::Component).expect("wiper");
    let renderer = SchematicRenderer::new();

    let png = renderer
        .export(&data, ExportConfig::default(), ExportFormat::Png)
        .expect("png");
    assert!(png.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    assert_eq!(png.filename, "schematic.png");

    let pdf = renderer
        .export(&data, ExportConfig::default(), ExportFormat::Pdf)
        .expect("pdf");
    assert!(pdf.bytes.starts_with(b"%PDF-"));
}
