use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Category string that marks a voltage supply component.
pub const SUPPLY_CATEGORY: &str = "Supply";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentShape {
    #[default]
    Rectangle,
    Circle,
    Splice,
}

impl ComponentShape {
    /// Lenient parse of backend shape strings. Unknown values fall back to a rectangle.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "circle" | "round" => Self::Circle,
            "splice" | "dot" | "splice-marker" | "splicemarker" => Self::Splice,
            _ => Self::Rectangle,
        }
    }
}

/// The backend item type a schematic payload was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Component,
    System,
    Dtc,
    Harness,
    Supply,
    Wire,
}

impl ItemKind {
    pub fn default_schematic_name(self) -> &'static str {
        match self {
            Self::Component => "Component Schematic",
            Self::System => "System Schematic",
            Self::Dtc => "DTC Schematic",
            Self::Harness => "Harness Schematic",
            Self::Supply => "Supply Schematic",
            Self::Wire => "Wire Schematic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    pub label: String,
    pub gender: String,
    pub color: String,
    pub cavity_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub shape: ComponentShape,
    #[serde(default)]
    pub component_type: String,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl Component {
    pub fn is_supply(&self) -> bool {
        self.category.eq_ignore_ascii_case(SUPPLY_CATEGORY)
    }

    pub fn is_splice(&self) -> bool {
        self.shape == ComponentShape::Splice
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub component_id: String,
    pub connector_id: String,
    #[serde(default)]
    pub cavity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fuse {
    pub code: String,
    #[serde(default)]
    pub ampere: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuse: Option<Fuse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_id: Option<String>,
}

impl WireDetails {
    pub fn is_empty(&self) -> bool {
        self.fuse.is_none()
            && self.cable_size.is_none()
            && self.length.is_none()
            && self.twist_id.is_none()
            && self.shield_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: ConnectionPoint,
    pub to: ConnectionPoint,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_details: Option<WireDetails>,
}

impl Connection {
    /// Identity of a wire for deduplication:
    /// `fromComponent:fromConnector:fromCavity-toComponent:toConnector:toCavity`.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}-{}:{}:{}",
            self.from.component_id,
            self.from.connector_id,
            self.from.cavity,
            self.to.component_id,
            self.to.connector_id,
            self.to.cavity
        )
    }

    pub fn fuse(&self) -> Option<&Fuse> {
        self.wire_details.as_ref().and_then(|d| d.fuse.as_ref())
    }
}

/// The canonical schematic graph consumed by layout and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub master_components: Vec<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl SchematicData {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn is_master(&self, id: &str) -> bool {
        self.master_components.iter().any(|m| m == id)
    }

    /// Resolves a wire endpoint to the component and connector it references.
    pub fn resolve(&self, point: &ConnectionPoint) -> Option<(&Component, &Connector)> {
        let component = self.component(&point.component_id)?;
        let connector = component.connector(&point.connector_id)?;
        Some((component, connector))
    }

    pub fn is_resolvable(&self, connection: &Connection) -> bool {
        self.resolve(&connection.from).is_some() && self.resolve(&connection.to).is_some()
    }

    /// Connections whose both endpoints resolve, paired with their index in `connections`.
    pub fn resolved_connections(&self) -> impl Iterator<Item = (usize, &Connection)> {
        self.connections
            .iter()
            .enumerate()
            .filter(|(_, c)| self.is_resolvable(c))
    }

    /// Number of resolvable wire ends landing on each `(component, connector)` pair.
    pub fn connection_counts(&self) -> FxHashMap<(String, String), usize> {
        let mut counts: FxHashMap<(String, String), usize> = FxHashMap::default();
        for (_, c) in self.resolved_connections() {
            for end in [&c.from, &c.to] {
                *counts
                    .entry((end.component_id.clone(), end.connector_id.clone()))
                    .or_default() += 1;
            }
        }
        counts
    }

    /// Drops master ids that do not name a component.
    pub fn retain_known_masters(&mut self) {
        let components = &self.components;
        self.master_components
            .retain(|m| components.iter().any(|c| &c.id == m));
    }
}
