#![forbid(unsafe_code)]

//! Wiring schematic data model, payload normalizer and graph merger (headless).
//!
//! Backend payloads for components, systems, DTCs, harnesses, supplies and wires all carry a
//! `schematicData` envelope in backend-native naming. [`normalize`] turns any of them into the
//! canonical [`SchematicData`] graph; [`merge`] combines several graphs for multi-select views.

pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;

pub use error::{Error, Result};
pub use merge::{MERGED_SCHEMATIC_NAME, MergeMode, SUPPLY_VIEW_CONTEXT, merge};
pub use model::{
    Component, ComponentShape, Connection, ConnectionPoint, Connector, Fuse, ItemKind,
    SUPPLY_CATEGORY, SchematicData, WireDetails,
};
pub use normalize::{
    RawPayload, expand_wire_color, normalize, normalize_gender, normalize_str, normalize_value,
    resolve_component_code,
};
