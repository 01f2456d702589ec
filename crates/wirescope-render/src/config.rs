use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Spacing and sizing constants for schematic layout, loadable from JSON (camelCase keys,
/// missing keys take defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Space between the layout origin and the first row/column.
    pub margin: f64,
    /// Horizontal gap between neighbouring components in a row.
    pub component_gap: f64,
    pub component_height: f64,
    pub component_min_width: f64,
    /// Horizontal padding on each side of a component label.
    pub label_padding: f64,
    /// Vertical distance between the bottom of the master row and the top of the bottom row.
    pub row_gap: f64,
    pub connector_height: f64,
    pub connector_min_width: f64,
    pub connector_gap: f64,
    /// Horizontal padding on each side of a connector label.
    pub connector_padding: f64,
    /// Distance between fanned-out wire rails.
    pub wire_step: f64,
    /// How far same-row wires run outside the row before turning.
    pub same_row_clearance: f64,
    pub hop_radius: f64,
    pub splice_radius: f64,
    pub splice_inner_radius: f64,
    /// Extra width reserved on components that carry fuse annotations.
    pub fuse_annotation_width: f64,
    pub fuse_annotation_line_height: f64,
    pub component_font_size: f64,
    pub connector_font_size: f64,
    pub wire_font_size: f64,
    /// Width assumed for labels before they are measured.
    pub baseline_label_width: f64,
    pub trident_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            component_gap: 60.0,
            component_height: 90.0,
            component_min_width: 120.0,
            label_padding: 12.0,
            row_gap: 240.0,
            connector_height: 24.0,
            connector_min_width: 44.0,
            connector_gap: 10.0,
            connector_padding: 8.0,
            wire_step: 10.0,
            same_row_clearance: 40.0,
            hop_radius: 5.0,
            splice_radius: 8.0,
            splice_inner_radius: 4.0,
            fuse_annotation_width: 72.0,
            fuse_annotation_line_height: 14.0,
            component_font_size: 14.0,
            connector_font_size: 11.0,
            wire_font_size: 10.0,
            baseline_label_width: 40.0,
            trident_size: 8.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("componentHeight", self.component_height),
            ("connectorHeight", self.connector_height),
            ("componentFontSize", self.component_font_size),
            ("connectorFontSize", self.connector_font_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("`{name}` must be a positive number, got {value}"),
                });
            }
        }
        let non_negative = [
            ("margin", self.margin),
            ("componentGap", self.component_gap),
            ("componentMinWidth", self.component_min_width),
            ("labelPadding", self.label_padding),
            ("rowGap", self.row_gap),
            ("connectorMinWidth", self.connector_min_width),
            ("connectorGap", self.connector_gap),
            ("connectorPadding", self.connector_padding),
            ("wireStep", self.wire_step),
            ("sameRowClearance", self.same_row_clearance),
            ("hopRadius", self.hop_radius),
            ("spliceRadius", self.splice_radius),
            ("spliceInnerRadius", self.splice_inner_radius),
            ("fuseAnnotationWidth", self.fuse_annotation_width),
            ("baselineLabelWidth", self.baseline_label_width),
            ("tridentSize", self.trident_size),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("`{name}` must be a non-negative number, got {value}"),
                });
            }
        }
        if self.component_height < self.connector_height {
            return Err(Error::InvalidConfig {
                message: "`componentHeight` must be at least `connectorHeight`".to_string(),
            });
        }
        Ok(())
    }
}

/// Viewport behaviour for the interactive viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Margin added around the layout bounds when fitting.
    pub fit_margin: f64,
    /// Smallest allowed viewBox width (maximum zoom-in).
    pub min_view_width: f64,
    /// Largest allowed viewBox width (maximum zoom-out).
    pub max_view_width: f64,
    /// Pointer travel (screen px) below which a press-release counts as a click, not a drag.
    pub click_slop: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fit_margin: 40.0,
            min_view_width: 40.0,
            max_view_width: 50_000.0,
            click_slop: 3.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
