use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wirescope_core::{ComponentShape, Fuse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Row {
    /// Top row: controllers and modules listed in `masterComponents`.
    Master,
    Bottom,
}

impl Row {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorBox {
    pub component_id: String,
    pub connector_id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Y of the edge wires attach to (the edge facing the other row).
    pub attach_y: f64,
}

impl ConnectorBox {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceDot {
    pub cx: f64,
    pub cy: f64,
    pub outer_radius: f64,
    pub inner_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuseTag {
    pub code: String,
    pub ampere: String,
    pub x: f64,
    pub y: f64,
}

impl FuseTag {
    pub fn text(&self) -> String {
        if self.ampere.is_empty() {
            self.code.clone()
        } else {
            format!("{} {}A", self.code, self.ampere.trim_end_matches(['A', 'a']))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBox {
    pub id: String,
    pub label: String,
    pub category: String,
    pub shape: ComponentShape,
    pub row: Row,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub connectors: Vec<ConnectorBox>,
    pub splice: Option<SpliceDot>,
    pub fuses: Vec<FuseTag>,
}

impl ComponentBox {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }

    pub fn connector(&self, id: &str) -> Option<&ConnectorBox> {
        self.connectors.iter().find(|c| c.connector_id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireBand {
    /// Master row to bottom row.
    Cross,
    MasterMaster,
    BottomBottom,
}

/// A semicircular jump drawn on a rail where it crosses another wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnd {
    pub component_id: String,
    pub connector_id: String,
    pub cavity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRoute {
    /// Index of the connection in `SchematicData::connections`.
    pub index: usize,
    pub from: WireEnd,
    pub to: WireEnd,
    pub color: String,
    pub label: String,
    pub band: WireBand,
    /// `[from anchor, rail start, rail end, to anchor]`.
    pub points: Vec<Point>,
    pub hops: Vec<Hop>,
    pub fuse: Option<Fuse>,
}

impl WireRoute {
    pub fn rail(&self) -> (Point, Point) {
        (self.points[1], self.points[2])
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

pub fn connector_key(component_id: &str, connector_id: &str) -> String {
    format!("{component_id}:{connector_id}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicLayout {
    pub name: String,
    pub components: Vec<ComponentBox>,
    pub wires: Vec<WireRoute>,
    pub bounds: Bounds,
    /// Wire ends per connector, keyed by `component:connector`.
    pub connection_counts: BTreeMap<String, usize>,
}

impl SchematicLayout {
    pub fn component(&self, id: &str) -> Option<&ComponentBox> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn wire(&self, index: usize) -> Option<&WireRoute> {
        self.wires.iter().find(|w| w.index == index)
    }

    pub fn connection_count(&self, component_id: &str, connector_id: &str) -> usize {
        self.connection_counts
            .get(&connector_key(component_id, connector_id))
            .copied()
            .unwrap_or(0)
    }
}
