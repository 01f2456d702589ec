//! SVG emission for a laid-out schematic.
//!
//! The output carries `data-*` attributes on every component, connector and wire group so a host
//! can map DOM events back to [`HitTarget`](crate::interaction::HitTarget)s without re-running hit
//! testing.

use crate::geometry::{Bounds, Point, finite_or};
use crate::interaction::Selection;
use crate::model::{ComponentBox, ConnectorBox, SchematicLayout, WireRoute};
use crate::symbols::SymbolKind;
use crate::viewport::ViewBox;
use crate::{Error, Result};
use std::fmt::Write as _;
use wirescope_core::{ComponentShape, SchematicData};

const DEFAULT_WIRE_COLOR: &str = "#444444";

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root element id; also prefixes internal ids.
    pub diagram_id: Option<String>,
    /// Explicit viewBox (the viewer's current window). Defaults to the padded layout bounds.
    pub viewbox: Option<ViewBox>,
    /// Extra space around the layout bounds when no explicit viewBox is given.
    pub viewbox_padding: f64,
    pub selection: Selection,
    /// Emitted in place of any NaN or infinite coordinate.
    pub coordinate_fallback: f64,
    pub background: String,
    pub font_family: String,
    /// Component label size; connector and wire labels are scaled from it.
    pub font_size: f64,
    /// Length of the fork drawn where a wire meets its connector.
    pub trident_size: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            viewbox: None,
            viewbox_padding: 16.0,
            selection: Selection::None,
            coordinate_fallback: 0.0,
            background: "white".to_string(),
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 14.0,
            trident_size: 8.0,
        }
    }
}

/// Formats a coordinate with at most three decimals, substituting `fallback` for non-finite
/// values.
pub fn fmt_or(v: f64, fallback: f64) -> String {
    let v = finite_or(v, finite_or(fallback, 0.0));
    let v = (v * 1000.0).round() / 1000.0;
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

pub fn fmt(v: f64) -> String {
    fmt_or(v, 0.0)
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A colour name or hex code safe to place in a `stroke` attribute.
fn css_color(name: &str) -> &str {
    let name = name.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '#');
    if valid { name } else { DEFAULT_WIRE_COLOR }
}

fn stripe_colors(color: &str) -> (&str, Option<&str>) {
    let mut parts = color.split('/');
    let base = css_color(parts.next().unwrap_or_default());
    let stripe = parts.next().map(css_color);
    (base, stripe)
}

struct Emitter<'a> {
    out: String,
    fallback: f64,
    options: &'a SvgRenderOptions,
    font_size: f64,
}

impl Emitter<'_> {
    fn n(&self, v: f64) -> String {
        fmt_or(v, self.fallback)
    }

    fn point(&self, p: Point) -> String {
        format!("{},{}", self.n(p.x), self.n(p.y))
    }

    fn component(&mut self, c: &ComponentBox, layout: &SchematicLayout, data: &SchematicData) {
        let selected = matches!(&self.options.selection, Selection::Component(id) if *id == c.id);
        let _ = write!(
            self.out,
            r#"<g class="component shape-{} row-{}{}" data-component-id="{}" data-category="{}">"#,
            shape_name(c.shape),
            c.row.as_str(),
            if selected { " selected" } else { "" },
            escape_xml(&c.id),
            escape_xml(&c.category)
        );

        match (c.shape, c.splice) {
            (_, Some(dot)) => {
                let _ = write!(
                    self.out,
                    r#"<circle class="splice-outer" cx="{}" cy="{}" r="{}"/><circle class="splice-inner" cx="{}" cy="{}" r="{}"/>"#,
                    self.n(dot.cx),
                    self.n(dot.cy),
                    self.n(dot.outer_radius),
                    self.n(dot.cx),
                    self.n(dot.cy),
                    self.n(dot.inner_radius)
                );
            }
            (ComponentShape::Circle, None) => {
                let _ = write!(
                    self.out,
                    r#"<ellipse class="component-body" cx="{}" cy="{}" rx="{}" ry="{}"/>"#,
                    self.n(c.x + c.width / 2.0),
                    self.n(c.y + c.height / 2.0),
                    self.n(c.width / 2.0),
                    self.n(c.height / 2.0)
                );
            }
            _ => {
                let _ = write!(
                    self.out,
                    r#"<rect class="component-body" x="{}" y="{}" width="{}" height="{}"/>"#,
                    self.n(c.x),
                    self.n(c.y),
                    self.n(c.width),
                    self.n(c.height)
                );
            }
        }

        if c.splice.is_none() {
            let size = (c.height * 0.3).min(28.0);
            let bbox = Bounds::from_rect(
                finite_or(c.x + 6.0, self.fallback),
                finite_or(c.label_y - size / 2.0 - self.font_size * 0.35, self.fallback),
                finite_or(size, 0.0),
                finite_or(size, 0.0),
            );
            SymbolKind::from_category(&c.category).render(&mut self.out, &bbox);
        }

        let _ = write!(
            self.out,
            r#"<text class="component-label" x="{}" y="{}">{}</text>"#,
            self.n(c.label_x),
            self.n(c.label_y),
            escape_xml(&c.label)
        );
        for fuse in &c.fuses {
            let _ = write!(
                self.out,
                r#"<text class="fuse-tag" x="{}" y="{}">{}</text>"#,
                self.n(fuse.x),
                self.n(fuse.y),
                escape_xml(&fuse.text())
            );
        }

        if c.splice.is_none() {
            for k in &c.connectors {
                self.connector(k, layout, data);
            }
        }
        self.out.push_str("</g>");
    }

    fn connector(&mut self, k: &ConnectorBox, layout: &SchematicLayout, data: &SchematicData) {
        let selected = matches!(
            &self.options.selection,
            Selection::Connector { component_id, connector_id }
                if *component_id == k.component_id && *connector_id == k.connector_id
        );
        let source = data
            .component(&k.component_id)
            .and_then(|c| c.connector(&k.connector_id));
        let (gender, color) = source
            .map(|s| (s.gender.as_str(), s.color.as_str()))
            .unwrap_or(("", ""));
        let size = self.font_size * 0.8;
        let text_y = k.y + k.height / 2.0 + size * 0.35;
        let _ = write!(
            self.out,
            r#"<g class="connector{}" data-component-id="{}" data-connector-id="{}" data-gender="{}" data-color="{}" data-connections="{}"><rect class="connector-body" x="{}" y="{}" width="{}" height="{}"/><text class="connector-label" x="{}" y="{}" font-size="{}">{}</text></g>"#,
            if selected { " selected" } else { "" },
            escape_xml(&k.component_id),
            escape_xml(&k.connector_id),
            escape_xml(gender),
            escape_xml(color),
            layout.connection_count(&k.component_id, &k.connector_id),
            self.n(k.x),
            self.n(k.y),
            self.n(k.width),
            self.n(k.height),
            self.n(k.x + k.width / 2.0),
            self.n(text_y),
            self.n(size),
            escape_xml(&k.label)
        );
    }

    fn wire_path(&self, w: &WireRoute) -> String {
        let mut d = String::new();
        let (Some(p0), Some(p1), Some(p2), Some(p3)) =
            (w.points.first(), w.points.get(1), w.points.get(2), w.points.get(3))
        else {
            return d;
        };
        let _ = write!(d, "M{} L{}", self.point(*p0), self.point(*p1));
        let direction = if p2.x >= p1.x { 1.0 } else { -1.0 };
        // Arc over the crossing: clockwise when travelling right, counter-clockwise when left.
        let sweep = if direction > 0.0 { 1 } else { 0 };
        for hop in &w.hops {
            let start = Point::new(hop.x - direction * hop.radius, p1.y);
            let end = Point::new(hop.x + direction * hop.radius, p1.y);
            let _ = write!(
                d,
                " L{} A{},{} 0 0 {} {}",
                self.point(start),
                self.n(hop.radius),
                self.n(hop.radius),
                sweep,
                self.point(end)
            );
        }
        let _ = write!(d, " L{} L{}", self.point(*p2), self.point(*p3));
        d
    }

    fn trident(&self, anchor: Point, toward: Point) -> String {
        let s = self.options.trident_size.max(0.0);
        let dir = if toward.y < anchor.y { -1.0 } else { 1.0 };
        let (x, y) = (anchor.x, anchor.y);
        format!(
            "M{} L{} M{} L{} L{} L{}",
            self.point(Point::new(x, y + dir * s)),
            self.point(Point::new(x, y)),
            self.point(Point::new(x - s / 2.0, y)),
            self.point(Point::new(x - s / 2.0, y + dir * s / 3.0)),
            self.point(Point::new(x + s / 2.0, y + dir * s / 3.0)),
            self.point(Point::new(x + s / 2.0, y))
        )
    }

    fn wire(&mut self, w: &WireRoute) {
        let selected = matches!(&self.options.selection, Selection::Wire(i) if *i == w.index);
        let (base, stripe) = stripe_colors(&w.color);
        let d = self.wire_path(w);
        let _ = write!(
            self.out,
            r#"<g class="wire{}" data-wire-index="{}" data-from="{}:{}" data-to="{}:{}" data-color="{}" data-hops="{}">"#,
            if selected { " selected" } else { "" },
            w.index,
            escape_xml(&w.from.component_id),
            escape_xml(&w.from.connector_id),
            escape_xml(&w.to.component_id),
            escape_xml(&w.to.connector_id),
            escape_xml(&w.color),
            w.hops.len()
        );
        let mut title = w.label.clone();
        if let Some(fuse) = &w.fuse {
            if !title.is_empty() {
                title.push(' ');
            }
            title.push_str(&fuse.code);
        }
        if !title.is_empty() {
            let _ = write!(self.out, "<title>{}</title>", escape_xml(&title));
        }
        let _ = write!(
            self.out,
            r#"<path class="wire-path" d="{d}" stroke="{base}"/>"#
        );
        if let Some(stripe) = stripe {
            let _ = write!(
                self.out,
                r#"<path class="wire-stripe" d="{d}" stroke="{stripe}" stroke-dasharray="6 6"/>"#
            );
        }
        if let (Some(first), Some(second), Some(third), Some(last)) =
            (w.points.first(), w.points.get(1), w.points.get(2), w.points.get(3))
        {
            let from = self.trident(*first, *second);
            let to = self.trident(*last, *third);
            let _ = write!(
                self.out,
                r#"<path class="trident" d="{from}" stroke="{base}"/><path class="trident" d="{to}" stroke="{base}"/>"#
            );
            if !w.label.is_empty() {
                let _ = write!(
                    self.out,
                    r#"<text class="wire-label" x="{}" y="{}" font-size="{}">{}</text>"#,
                    self.n((second.x + third.x) / 2.0),
                    self.n(second.y - 3.0),
                    self.n(self.font_size * 0.7),
                    escape_xml(&w.label)
                );
            }
        }
        self.out.push_str("</g>");
    }
}

fn shape_name(shape: ComponentShape) -> &'static str {
    match shape {
        ComponentShape::Rectangle => "rectangle",
        ComponentShape::Circle => "circle",
        ComponentShape::Splice => "splice",
    }
}

pub fn render_schematic_svg(
    layout: &SchematicLayout,
    data: &SchematicData,
    options: &SvgRenderOptions,
) -> Result<String> {
    if !(options.font_size.is_finite() && options.font_size > 0.0) {
        return Err(Error::InvalidConfig {
            message: format!("`fontSize` must be a positive number, got {}", options.font_size),
        });
    }
    let fallback = finite_or(options.coordinate_fallback, 0.0);

    let viewbox = options.viewbox.unwrap_or_else(|| {
        let pad = options.viewbox_padding.max(0.0);
        let b = &layout.bounds;
        ViewBox::new(
            b.min_x - pad,
            b.min_y - pad,
            (b.width() + pad * 2.0).max(1.0),
            (b.height() + pad * 2.0).max(1.0),
        )
    });
    let diagram_id = options.diagram_id.as_deref().unwrap_or("wirescope");

    let mut e = Emitter {
        out: String::new(),
        fallback,
        options,
        font_size: options.font_size,
    };

    let _ = write!(
        e.out,
        r#"<svg id="{}" width="100%" xmlns="http://www.w3.org/2000/svg" style="max-width: {}px; background-color: {};" viewBox="{} {} {} {}" role="graphics-document document" aria-roledescription="wiring-schematic" data-schematic-name="{}">"#,
        escape_xml(diagram_id),
        e.n(viewbox.w),
        escape_xml(&options.background),
        e.n(viewbox.x),
        e.n(viewbox.y),
        e.n(viewbox.w.max(1.0)),
        e.n(viewbox.h.max(1.0)),
        escape_xml(&layout.name)
    );
    let _ = write!(
        e.out,
        r#"<style>#{id} {{ font-family: {font}; font-size: {size}px; }}
#{id} .component-body {{ fill: #f8fafc; stroke: #1f2937; stroke-width: 1.5; }}
#{id} .component-label {{ fill: #111827; text-anchor: middle; }}
#{id} .fuse-tag {{ fill: #b45309; font-size: {small}px; }}
#{id} .connector-body {{ fill: #e5e7eb; stroke: #374151; stroke-width: 1; }}
#{id} .connector-label {{ fill: #111827; text-anchor: middle; }}
#{id} .splice-outer {{ fill: white; stroke: #111827; stroke-width: 1.5; }}
#{id} .splice-inner {{ fill: #111827; }}
#{id} .wire-path, #{id} .wire-stripe, #{id} .trident {{ fill: none; stroke-width: 2; }}
#{id} .wire-label {{ fill: #374151; text-anchor: middle; }}
#{id} .selected .component-body, #{id} .selected.connector .connector-body {{ stroke: #2563eb; stroke-width: 3; }}
#{id} .wire.selected .wire-path {{ stroke-width: 4; }}
</style>"#,
        id = escape_xml(diagram_id),
        font = escape_xml(&options.font_family),
        size = e.n(options.font_size),
        small = e.n(options.font_size * 0.8),
    );

    e.out.push_str(r#"<g class="components">"#);
    for c in &layout.components {
        e.component(c, layout, data);
    }
    e.out.push_str(r#"</g><g class="wires">"#);
    for w in &layout.wires {
        e.wire(w);
    }
    e.out.push_str("</g></svg>\n");

    tracing::debug!(
        components = layout.components.len(),
        wires = layout.wires.len(),
        bytes = e.out.len(),
        "rendered schematic svg"
    );
    Ok(e.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_trimmed_and_non_finite_falls_back() {
        assert_eq!(fmt(1.0), "1");
        assert_eq!(fmt(727.272727), "727.273");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt_or(f64::NAN, 12.5), "12.5");
        assert_eq!(fmt_or(f64::INFINITY, 0.0), "0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<A&"B">"#), "&lt;A&amp;&quot;B&quot;&gt;");
    }

    #[test]
    fn unsafe_colors_are_replaced() {
        assert_eq!(css_color("red"), "red");
        assert_eq!(css_color("#ff0000"), "#ff0000");
        assert_eq!(css_color("red; fill: url(x)"), DEFAULT_WIRE_COLOR);
        assert_eq!(stripe_colors("red/black"), ("red", Some("black")));
    }
}
