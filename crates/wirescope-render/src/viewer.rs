//! Viewer state machine: data loading, pointer events, popups and export snapshots.

use crate::config::ViewerConfig;
use crate::controls::ViewControls;
use crate::interaction::{HitTarget, InteractionState, PopupContent, PopupKind, Selection, popup_content};
use crate::layout::layout_schematic;
use crate::model::SchematicLayout;
use crate::svg::{SvgRenderOptions, render_schematic_svg};
use crate::viewport::{ScreenSize, ViewBox};
use crate::{Error, LayoutOptions, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use wirescope_core::SchematicData;

/// Pointer tolerance for wire hits, in screen pixels.
const HIT_TOLERANCE_PX: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewerPhase {
    Idle,
    DataLoaded,
    Interactive,
}

/// Identifies one schematic fetch. Only the most recently issued ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub filename: String,
    /// Output pixels per SVG user unit before zoom.
    pub resolution: f64,
    pub zoom: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: "schematic".to_string(),
            resolution: 2.0,
            zoom: 1.0,
        }
    }
}

/// Everything the export manager needs, captured at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub svg: String,
    /// Wire ends per connector, keyed by `component:connector`.
    pub connection_counts: BTreeMap<String, usize>,
    pub config: ExportConfig,
}

pub struct SchematicViewer {
    layout_options: LayoutOptions,
    svg_options: SvgRenderOptions,
    phase: ViewerPhase,
    data: Option<SchematicData>,
    layout: Option<SchematicLayout>,
    controls: ViewControls,
    interaction: InteractionState,
    latest_ticket: u64,
}

impl SchematicViewer {
    pub fn new(layout_options: LayoutOptions, config: ViewerConfig, screen: ScreenSize) -> Self {
        let svg_options = SvgRenderOptions {
            trident_size: layout_options.config.trident_size,
            font_size: layout_options.config.component_font_size,
            ..SvgRenderOptions::default()
        };
        Self {
            layout_options,
            svg_options,
            phase: ViewerPhase::Idle,
            data: None,
            layout: None,
            controls: ViewControls::new(config, screen),
            interaction: InteractionState::new(),
            latest_ticket: 0,
        }
    }

    pub fn with_svg_options(mut self, svg_options: SvgRenderOptions) -> Self {
        self.svg_options = svg_options;
        self
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn data(&self) -> Option<&SchematicData> {
        self.data.as_ref()
    }

    pub fn layout(&self) -> Option<&SchematicLayout> {
        self.layout.as_ref()
    }

    pub fn view(&self) -> ViewBox {
        self.controls.view()
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    pub fn selection(&self) -> &Selection {
        self.interaction.selection()
    }

    pub fn open_popup(&self) -> Option<PopupKind> {
        self.interaction.open_popup()
    }

    /// Details for the open popup, if any.
    pub fn popup(&self) -> Option<PopupContent> {
        self.interaction.open_popup()?;
        popup_content(self.data.as_ref()?, self.interaction.selection())
    }

    /// Replaces the schematic: re-measures labels, re-runs layout and fits the view.
    ///
    /// On error the previous schematic stays in place.
    pub fn load(&mut self, data: SchematicData) -> Result<()> {
        let layout = layout_schematic(&data, &self.layout_options)?;
        self.controls.set_content(layout.bounds);
        self.interaction.clear();
        self.data = Some(data);
        self.layout = Some(layout);
        self.phase = ViewerPhase::DataLoaded;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data = None;
        self.layout = None;
        self.interaction.clear();
        self.controls.clear_content();
        self.phase = ViewerPhase::Idle;
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        self.latest_ticket += 1;
        RequestTicket(self.latest_ticket)
    }

    /// Applies a fetch result. Results for superseded tickets are dropped, and failures leave the
    /// current view unchanged. Returns whether the result was applied.
    pub fn complete_request<E: Display>(
        &mut self,
        ticket: RequestTicket,
        result: std::result::Result<SchematicData, E>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "dropping superseded schematic fetch"
            );
            return false;
        }
        let data = match result {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(ticket = ticket.0, error = %err, "schematic fetch failed");
                return false;
            }
        };
        match self.load(data) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(ticket = ticket.0, error = %err, "schematic layout failed");
                false
            }
        }
    }

    fn touch(&mut self) -> bool {
        if self.layout.is_none() {
            return false;
        }
        self.phase = ViewerPhase::Interactive;
        true
    }

    pub fn hit_test(&self, sx: f64, sy: f64) -> HitTarget {
        let Some(layout) = &self.layout else {
            return HitTarget::Canvas;
        };
        let view = self.controls.view();
        let screen = self.controls.screen();
        let tolerance = if screen.width > 0.0 {
            HIT_TOLERANCE_PX * view.w / screen.width
        } else {
            HIT_TOLERANCE_PX
        };
        layout.hit_test(self.controls.screen_to_world(sx, sy), tolerance)
    }

    /// A click at screen position `(sx, sy)` inside the schematic widget.
    pub fn click(&mut self, sx: f64, sy: f64) -> Option<HitTarget> {
        if !self.touch() {
            return None;
        }
        let target = self.hit_test(sx, sy);
        self.interaction.click(&target);
        Some(target)
    }

    pub fn click_outside(&mut self) {
        self.interaction.click(&HitTarget::Outside);
    }

    pub fn close_popup(&mut self) {
        self.interaction.close_popup();
    }

    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        if self.touch() {
            self.controls.pointer_down(sx, sy);
        }
    }

    pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
        self.layout.is_some() && self.controls.pointer_move(sx, sy)
    }

    /// Ends a press; a press that did not travel counts as a click at `(sx, sy)`.
    pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<HitTarget> {
        if self.controls.pointer_up() {
            return self.click(sx, sy);
        }
        None
    }

    pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) -> bool {
        self.touch() && self.controls.wheel(delta_y, sx, sy)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.touch() && self.controls.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.touch() && self.controls.zoom_out()
    }

    pub fn fit(&mut self) {
        if self.touch() {
            self.controls.fit();
        }
    }

    pub fn reset(&mut self) {
        if self.touch() {
            self.controls.reset();
        }
    }

    pub fn resize(&mut self, screen: ScreenSize) {
        self.controls.resize(screen);
    }

    pub fn toggle_fullscreen(&mut self, fullscreen_screen: ScreenSize) {
        self.controls.toggle_fullscreen(fullscreen_screen);
    }

    pub fn exit_fullscreen(&mut self) {
        self.controls.exit_fullscreen();
    }

    /// SVG for the current view, including the selection highlight.
    pub fn render_svg(&self) -> Result<String> {
        let (Some(layout), Some(data)) = (&self.layout, &self.data) else {
            return Err(Error::NothingLoaded);
        };
        let options = SvgRenderOptions {
            viewbox: Some(self.controls.view()),
            selection: self.interaction.selection().clone(),
            ..self.svg_options.clone()
        };
        render_schematic_svg(layout, data, &options)
    }

    /// Snapshot for export: the whole layout without selection highlight, plus connection counts.
    pub fn export_request(&self, config: ExportConfig) -> Result<ExportRequest> {
        let (Some(layout), Some(data)) = (&self.layout, &self.data) else {
            return Err(Error::NothingLoaded);
        };
        let options = SvgRenderOptions {
            viewbox: None,
            selection: Selection::None,
            ..self.svg_options.clone()
        };
        Ok(ExportRequest {
            svg: render_schematic_svg(layout, data, &options)?,
            connection_counts: layout.connection_counts.clone(),
            config,
        })
    }
}
