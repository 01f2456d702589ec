#![forbid(unsafe_code)]

//! `wirescope` is a headless engine for automotive wiring schematics.
//!
//! Backend payloads are normalized into a canonical graph, optionally merged, laid out in two
//! rows with orthogonal wire routing and rendered as SVG ready for click-to-inspect viewers.
//!
//! # Features
//!
//! - `render`: enable layout, SVG rendering and the viewer model (`wirescope::render`)
//! - `raster`: enable PNG/PDF export via pure-Rust SVG rasterization/conversion

pub use wirescope_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use wirescope_render::config::{LayoutConfig, ViewerConfig};
    pub use wirescope_render::controls::ViewControls;
    pub use wirescope_render::interaction::{
        HitTarget, InteractionState, PopupContent, PopupKind, Selection, popup_content,
    };
    pub use wirescope_render::model::SchematicLayout;
    pub use wirescope_render::svg::{SvgRenderOptions, render_schematic_svg};
    pub use wirescope_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use wirescope_render::viewer::{
        ExportConfig, ExportRequest, RequestTicket, SchematicViewer, ViewerPhase,
    };
    pub use wirescope_render::viewport::{ScreenSize, ViewBox, ZoomDirection};
    pub use wirescope_render::{LayoutOptions, layout_schematic};

    use wirescope_core::{ItemKind, MergeMode, SchematicData};

    #[cfg(feature = "raster")]
    pub mod export;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Payload(#[from] wirescope_core::Error),
        #[error(transparent)]
        Render(#[from] wirescope_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Turns a schematic name into an SVG `id`, so several schematics can be inlined in one page
    /// without their scoped styles colliding.
    ///
    /// ASCII letters and digits are kept (lower-cased); every other run of characters becomes a
    /// single `-`. Ids that would not start with a letter get a `schematic-` prefix.
    pub fn schematic_svg_id(name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        match slug.chars().next() {
            None => "schematic".to_string(),
            Some(c) if c.is_ascii_alphabetic() => slug.to_string(),
            Some(_) => format!("schematic-{slug}"),
        }
    }

    pub fn render_svg(
        data: &SchematicData,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let layout = layout_schematic(data, layout_options)?;
        Ok(render_schematic_svg(&layout, data, svg_options)?)
    }

    /// Bundles layout and SVG options for headless rendering.
    ///
    /// All work is CPU-bound and synchronous; nothing here performs I/O.
    #[derive(Clone)]
    pub struct SchematicRenderer {
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl Default for SchematicRenderer {
        fn default() -> Self {
            Self::with_layout(LayoutOptions::default())
        }
    }

    impl SchematicRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Uses `layout`, taking the SVG font size and trident size from its config.
        pub fn with_layout(layout: LayoutOptions) -> Self {
            let svg = SvgRenderOptions {
                font_size: layout.config.component_font_size,
                trident_size: layout.config.trident_size,
                ..SvgRenderOptions::default()
            };
            Self { layout, svg }
        }

        pub fn with_layout_config(self, config: LayoutConfig) -> Self {
            let layout = LayoutOptions {
                config,
                ..self.layout
            };
            Self {
                svg: SvgRenderOptions {
                    font_size: layout.config.component_font_size,
                    trident_size: layout.config.trident_size,
                    ..self.svg
                },
                layout,
            }
        }

        pub fn layout(&self, data: &SchematicData) -> Result<SchematicLayout> {
            Ok(layout_schematic(data, &self.layout)?)
        }

        pub fn render_svg(&self, data: &SchematicData) -> Result<String> {
            render_svg(data, &self.layout, &self.svg)
        }

        pub fn render_svg_with(&self, data: &SchematicData, svg: &SvgRenderOptions) -> Result<String> {
            render_svg(data, &self.layout, svg)
        }

        pub fn render_svg_with_diagram_id(
            &self,
            data: &SchematicData,
            diagram_id: &str,
        ) -> Result<String> {
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(schematic_svg_id(diagram_id));
            self.render_svg_with(data, &svg)
        }

        /// Normalizes a backend payload (JSON text) and renders it.
        pub fn render_payload_svg(&self, payload: &str, kind: ItemKind) -> Result<String> {
            let data = wirescope_core::normalize_str(payload, kind)?;
            self.render_svg(&data)
        }

        /// Merges several graphs and renders the result.
        pub fn render_merged_svg(
            &self,
            graphs: &[SchematicData],
            mode: Option<MergeMode>,
            active_context: Option<&str>,
        ) -> Result<String> {
            let merged = wirescope_core::merge(graphs, mode, active_context);
            self.render_svg(&merged)
        }

        /// An interactive viewer sharing this renderer's options.
        pub fn viewer(&self, config: ViewerConfig, screen: ScreenSize) -> SchematicViewer {
            SchematicViewer::new(self.layout.clone(), config, screen).with_svg_options(self.svg.clone())
        }

        #[cfg(feature = "raster")]
        pub fn export(
            &self,
            data: &SchematicData,
            config: ExportConfig,
            format: export::ExportFormat,
        ) -> export::Result<export::ExportArtifact> {
            let layout = self.layout(data)?;
            let request = ExportRequest {
                svg: render_schematic_svg(&layout, data, &self.svg).map_err(HeadlessError::from)?,
                connection_counts: layout.connection_counts,
                config,
            };
            export::export(&request, format)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn schematic_names_become_svg_ids() {
            assert_eq!(schematic_svg_id("Door module"), "door-module");
            assert_eq!(schematic_svg_id("  "), "schematic");
            assert_eq!(schematic_svg_id("12/A"), "schematic-12-a");
            assert_eq!(schematic_svg_id("<<>>"), "schematic");
            assert_eq!(schematic_svg_id("K7 -- relay (left)"), "k7-relay-left");
        }
    }
}
