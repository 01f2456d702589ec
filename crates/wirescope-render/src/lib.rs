#![forbid(unsafe_code)]

//! Headless layout and SVG rendering for wiring schematics, plus the viewport and interaction
//! model a schematic viewer drives.

pub mod config;
pub mod controls;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod svg;
pub mod symbols;
pub mod text;
pub mod viewer;
pub mod viewport;

use crate::config::LayoutConfig;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::sync::Arc;

pub use layout::layout_schematic;
pub use model::SchematicLayout;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout configuration: {message}")]
    InvalidConfig { message: String },
    #[error("layout configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no schematic is loaded")]
    NothingLoaded,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub config: LayoutConfig,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            config: LayoutConfig::default(),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
