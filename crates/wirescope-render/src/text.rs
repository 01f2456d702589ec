use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;
use wirescope_core::SchematicData;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 14.0,
            font_weight: None,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Width estimate from Unicode display columns; stable across platforms.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let bold_factor = match style.font_weight.as_deref() {
            Some("bold") | Some("600") | Some("700") => 1.1,
            _ => 1.0,
        };

        let lines: Vec<&str> = text.split('\n').collect();
        let font_size = style.font_size.max(1.0);
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: columns as f64 * font_size * char_width_factor * bold_factor,
            height: lines.len() as f64 * font_size * line_height_factor,
            line_count: lines.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Component(String),
    Connector { component: String, connector: String },
}

/// Per-entity label widths for one schematic.
///
/// Built wholesale from the current graph before placement; entities that were not measured
/// report the baseline width labels are first mounted at.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    widths: FxHashMap<LabelKey, f64>,
    baseline: f64,
}

impl MeasurementCache {
    pub fn new(baseline: f64) -> Self {
        Self {
            widths: FxHashMap::default(),
            baseline,
        }
    }

    pub fn measure_schematic(
        data: &SchematicData,
        measurer: &dyn TextMeasurer,
        component_style: &TextStyle,
        connector_style: &TextStyle,
        baseline: f64,
    ) -> Self {
        let mut cache = Self::new(baseline);
        for component in &data.components {
            let w = measurer.measure(&component.label, component_style).width;
            cache.insert(LabelKey::Component(component.id.clone()), w);
            for connector in &component.connectors {
                let w = measurer.measure(&connector.label, connector_style).width;
                cache.insert(
                    LabelKey::Connector {
                        component: component.id.clone(),
                        connector: connector.id.clone(),
                    },
                    w,
                );
            }
        }
        tracing::debug!(entries = cache.len(), "measured schematic labels");
        cache
    }

    pub fn insert(&mut self, key: LabelKey, width: f64) {
        let width = if width.is_finite() && width >= 0.0 {
            width
        } else {
            self.baseline
        };
        self.widths.insert(key, width);
    }

    pub fn width(&self, key: &LabelKey) -> f64 {
        self.widths.get(key).copied().unwrap_or(self.baseline)
    }

    pub fn component(&self, id: &str) -> f64 {
        self.width(&LabelKey::Component(id.to_string()))
    }

    pub fn connector(&self, component: &str, connector: &str) -> f64 {
        self.width(&LabelKey::Connector {
            component: component.to_string(),
            connector: connector.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}
