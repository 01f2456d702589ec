//! Category pictograms drawn inside component boxes.

use crate::geometry::Bounds;
use crate::svg::fmt;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Sensor,
    Switch,
    Transformer,
    Motor,
    Lamp,
    Relay,
    Fuse,
    Ground,
    Battery,
    Resistor,
    Diode,
    Speaker,
    /// No pictogram; the component box is still drawn.
    None,
}

impl SymbolKind {
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "sensor" => Self::Sensor,
            "switch" => Self::Switch,
            "transformer" => Self::Transformer,
            "motor" => Self::Motor,
            "lamp" | "light" | "bulb" => Self::Lamp,
            "relay" => Self::Relay,
            "fuse" => Self::Fuse,
            "ground" => Self::Ground,
            "battery" => Self::Battery,
            "resistor" => Self::Resistor,
            "diode" => Self::Diode,
            "speaker" => Self::Speaker,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Switch => "switch",
            Self::Transformer => "transformer",
            Self::Motor => "motor",
            Self::Lamp => "lamp",
            Self::Relay => "relay",
            Self::Fuse => "fuse",
            Self::Ground => "ground",
            Self::Battery => "battery",
            Self::Resistor => "resistor",
            Self::Diode => "diode",
            Self::Speaker => "speaker",
            Self::None => "none",
        }
    }

    /// Appends the pictogram scaled into `bbox`. Returns `false` when nothing was drawn.
    pub fn render(self, out: &mut String, bbox: &Bounds) -> bool {
        if self == Self::None || !(bbox.width() > 0.0 && bbox.height() > 0.0) {
            return false;
        }
        let (x, y, w, h) = (bbox.min_x, bbox.min_y, bbox.width(), bbox.height());
        let cx = x + w / 2.0;
        let cy = y + h / 2.0;
        let r = w.min(h) / 2.0;
        // All coordinates below are fractions of the box so symbols scale with it.
        let px = |f: f64| fmt(x + w * f);
        let py = |f: f64| fmt(y + h * f);

        let _ = write!(
            out,
            r#"<g class="symbol symbol-{}" fill="none" stroke="currentColor" stroke-width="1.5">"#,
            self.as_str()
        );
        match self {
            Self::Sensor => {
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{}"/><path d="M{},{} L{},{}"/>"#,
                    fmt(cx),
                    fmt(cy),
                    fmt(r * 0.8),
                    px(0.3),
                    py(0.7),
                    px(0.7),
                    py(0.3)
                );
            }
            Self::Switch => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} L{},{} M{},{} L{},{}"/>"#,
                    px(0.0),
                    py(0.6),
                    px(0.3),
                    py(0.6),
                    px(0.7),
                    py(0.3),
                    px(0.7),
                    py(0.6),
                    px(1.0),
                    py(0.6)
                );
            }
            Self::Transformer => {
                for f in [0.35, 0.65] {
                    let _ = write!(
                        out,
                        r#"<circle cx="{}" cy="{}" r="{}"/>"#,
                        px(f),
                        fmt(cy),
                        fmt(r * 0.45)
                    );
                }
            }
            Self::Motor => {
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{}"/><text x="{}" y="{}" text-anchor="middle" font-size="{}" fill="currentColor" stroke="none">M</text>"#,
                    fmt(cx),
                    fmt(cy),
                    fmt(r * 0.8),
                    fmt(cx),
                    fmt(cy + r * 0.35),
                    fmt(r)
                );
            }
            Self::Lamp => {
                let d = r * 0.55;
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{}"/><path d="M{},{} L{},{} M{},{} L{},{}"/>"#,
                    fmt(cx),
                    fmt(cy),
                    fmt(r * 0.8),
                    fmt(cx - d),
                    fmt(cy - d),
                    fmt(cx + d),
                    fmt(cy + d),
                    fmt(cx - d),
                    fmt(cy + d),
                    fmt(cx + d),
                    fmt(cy - d)
                );
            }
            Self::Relay => {
                let _ = write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}"/><path d="M{},{} L{},{}"/>"#,
                    px(0.15),
                    py(0.25),
                    fmt(w * 0.7),
                    fmt(h * 0.5),
                    px(0.15),
                    py(0.75),
                    px(0.85),
                    py(0.25)
                );
            }
            Self::Fuse => {
                let _ = write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}"/><path d="M{},{} L{},{}"/>"#,
                    px(0.2),
                    py(0.35),
                    fmt(w * 0.6),
                    fmt(h * 0.3),
                    px(0.0),
                    fmt(cy),
                    px(1.0),
                    fmt(cy)
                );
            }
            Self::Ground => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} M{},{} L{},{} M{},{} L{},{} M{},{} L{},{}"/>"#,
                    fmt(cx),
                    py(0.1),
                    fmt(cx),
                    py(0.5),
                    px(0.15),
                    py(0.5),
                    px(0.85),
                    py(0.5),
                    px(0.3),
                    py(0.68),
                    px(0.7),
                    py(0.68),
                    px(0.42),
                    py(0.86),
                    px(0.58),
                    py(0.86)
                );
            }
            Self::Battery => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} M{},{} L{},{} M{},{} L{},{} M{},{} L{},{}"/>"#,
                    px(0.4),
                    py(0.15),
                    px(0.4),
                    py(0.85),
                    px(0.6),
                    py(0.32),
                    px(0.6),
                    py(0.68),
                    px(0.0),
                    fmt(cy),
                    px(0.4),
                    fmt(cy),
                    px(0.6),
                    fmt(cy),
                    px(1.0),
                    fmt(cy)
                );
            }
            Self::Resistor => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{} L{},{}"/>"#,
                    px(0.0),
                    fmt(cy),
                    px(0.2),
                    fmt(cy),
                    px(0.3),
                    py(0.3),
                    px(0.45),
                    py(0.7),
                    px(0.55),
                    py(0.3),
                    px(0.7),
                    py(0.7),
                    px(0.8),
                    fmt(cy),
                    px(1.0),
                    fmt(cy)
                );
            }
            Self::Diode => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} L{},{} Z M{},{} L{},{} M{},{} L{},{} M{},{} L{},{}"/>"#,
                    px(0.3),
                    py(0.25),
                    px(0.3),
                    py(0.75),
                    px(0.65),
                    fmt(cy),
                    px(0.65),
                    py(0.25),
                    px(0.65),
                    py(0.75),
                    px(0.0),
                    fmt(cy),
                    px(0.3),
                    fmt(cy),
                    px(0.65),
                    fmt(cy),
                    px(1.0),
                    fmt(cy)
                );
            }
            Self::Speaker => {
                let _ = write!(
                    out,
                    r#"<path d="M{},{} L{},{} L{},{} L{},{} L{},{} L{},{} Z"/>"#,
                    px(0.15),
                    py(0.38),
                    px(0.35),
                    py(0.38),
                    px(0.65),
                    py(0.15),
                    px(0.65),
                    py(0.85),
                    px(0.35),
                    py(0.62),
                    px(0.15),
                    py(0.62)
                );
            }
            Self::None => {}
        }
        out.push_str("</g>");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_case_insensitively() {
        assert_eq!(SymbolKind::from_category("Sensor"), SymbolKind::Sensor);
        assert_eq!(SymbolKind::from_category(" RELAY "), SymbolKind::Relay);
        assert_eq!(SymbolKind::from_category("ECU"), SymbolKind::None);
        assert_eq!(SymbolKind::from_category(""), SymbolKind::None);
    }

    #[test]
    fn unknown_category_draws_nothing() {
        let bbox = Bounds::from_rect(0.0, 0.0, 20.0, 20.0);
        let mut out = String::new();
        assert!(!SymbolKind::None.render(&mut out, &bbox));
        assert!(out.is_empty());

        assert!(SymbolKind::Ground.render(&mut out, &bbox));
        assert!(out.starts_with(r#"<g class="symbol symbol-ground""#));
        assert!(out.ends_with("</g>"));
    }
}
