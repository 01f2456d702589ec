//! Backend payload normalization.
//!
//! Every item type (component, system, DTC, harness, supply, wire) ships the same
//! `schematicData` envelope, but field naming drifts between endpoints: ids may be numeric,
//! component codes may live on the component or only inside connector engineering codes, and wire
//! colours arrive as two-letter abbreviations. The raw types below accept all of those shapes; the
//! `normalize*` entry points turn them into one canonical [`SchematicData`].

use crate::model::{
    Component, ComponentShape, Connection, ConnectionPoint, Connector, Fuse, ItemKind,
    SchematicData, WireDetails,
};
use crate::{Error, Result};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const DEFAULT_GENDER: &str = "Female";
const DEFAULT_CATEGORY: &str = "Component";

/// Two-letter wire colour abbreviations (DIN 47100 / IEC 60757 style) and their full names.
const WIRE_COLORS: &[(&str, &str)] = &[
    ("BK", "black"),
    ("BN", "brown"),
    ("BU", "blue"),
    ("GN", "green"),
    ("GY", "grey"),
    ("OG", "orange"),
    ("PK", "pink"),
    ("RD", "red"),
    ("VT", "violet"),
    ("WH", "white"),
    ("YE", "yellow"),
    ("TQ", "turquoise"),
    ("LG", "lightgreen"),
    ("LB", "lightblue"),
    ("SR", "silver"),
    ("GD", "gold"),
    ("NA", "natural"),
];

fn component_code_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]+[0-9]+)(?:[-_./:]|[Xx][0-9])").expect("valid regex"))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnector {
    #[serde(default, deserialize_with = "lenient_string", alias = "connectorId")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub connector_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub connector_engineering_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32", alias = "cavities")]
    pub cavity_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponent {
    #[serde(default, deserialize_with = "lenient_string", alias = "componentId")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "componentCode")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "componentCategory")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shape: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "type")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub connectors: Vec<RawConnector>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnectionPoint {
    #[serde(default, deserialize_with = "lenient_string", alias = "componentCode")]
    pub component_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "connectorCode")]
    pub connector_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "pin")]
    pub cavity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFuse {
    #[serde(default, deserialize_with = "lenient_string", alias = "fuseCode")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "amperage")]
    pub ampere: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWireDetails {
    #[serde(default)]
    pub fuse: Option<RawFuse>,
    #[serde(default, deserialize_with = "lenient_string", alias = "size")]
    pub cable_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub twist_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shield_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnection {
    #[serde(default)]
    pub from: RawConnectionPoint,
    #[serde(default)]
    pub to: RawConnectionPoint,
    #[serde(default, deserialize_with = "lenient_string", alias = "wireColor")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wire_code: Option<String>,
    #[serde(default)]
    pub wire_details: Option<RawWireDetails>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuse_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuse_ampere: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cable_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub twist_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shield_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchematic {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub master_components: Vec<String>,
    #[serde(default)]
    pub components: Vec<RawComponent>,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
}

/// A backend item payload: the `schematicData` envelope plus the item-level fallback name.
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub kind: ItemKind,
    pub item_name: Option<String>,
    pub schematic: RawSchematic,
}

impl RawPayload {
    /// Accepts either `{ ..., "schematicData": { ... } }` or the bare envelope.
    pub fn from_value(value: Value, kind: ItemKind) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(Error::InvalidPayload {
                kind,
                message: "expected a JSON object".to_string(),
            });
        };

        let item_name = ["name", "code"].iter().find_map(|key| match object.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        });

        let schematic = match object.remove("schematicData") {
            Some(Value::Null) | None => serde_json::from_value(Value::Object(object))?,
            Some(envelope @ Value::Object(_)) => serde_json::from_value(envelope)?,
            Some(_) => {
                return Err(Error::InvalidPayload {
                    kind,
                    message: "`schematicData` must be an object".to_string(),
                });
            }
        };

        Ok(Self {
            kind,
            item_name,
            schematic,
        })
    }
}

pub fn normalize_str(text: &str, kind: ItemKind) -> Result<SchematicData> {
    let value: Value = serde_json::from_str(text)?;
    normalize_value(value, kind)
}

pub fn normalize_value(value: Value, kind: ItemKind) -> Result<SchematicData> {
    Ok(normalize(&RawPayload::from_value(value, kind)?))
}

/// Resolves the short component code used as the canonical component id.
///
/// Order: explicit code, then the prefix of the first connector engineering code that looks like
/// `B3-X1` / `K12.X3` / `A1X2`, then the raw id.
pub fn resolve_component_code<'a>(
    explicit: Option<&str>,
    engineering_codes: impl IntoIterator<Item = &'a str>,
    raw_id: &str,
) -> String {
    if let Some(code) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return code.to_string();
    }
    for eng in engineering_codes {
        if let Some(caps) = component_code_regex().captures(eng.trim()) {
            return caps[1].to_string();
        }
    }
    raw_id.to_string()
}

fn lookup_color(code: &str) -> Option<&'static str> {
    WIRE_COLORS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Expands two-letter wire colour codes (`RD` → `red`, `RD/WH` → `red/white`).
/// Anything that is not made of known codes passes through lower-cased.
pub fn expand_wire_color(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(name) = lookup_color(raw) {
        return name.to_string();
    }
    let stripes: Vec<&str> = raw.split(['/', '-', '_']).map(str::trim).collect();
    if stripes.len() > 1 {
        let names: Option<Vec<&str>> = stripes.iter().map(|s| lookup_color(s)).collect();
        if let Some(names) = names {
            return names.join("/");
        }
    }
    raw.to_lowercase()
}

/// Title-cases each word of a gender string; blank input yields `Female`.
pub fn normalize_gender(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|g| !g.is_empty()) else {
        return DEFAULT_GENDER.to_string();
    };
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn highest_referenced_cavity(
    raw: &RawSchematic,
    component_refs: &[&str],
    connector_ids: &[&str],
) -> u32 {
    raw.connections
        .iter()
        .flat_map(|c| [&c.from, &c.to])
        .filter(|p| {
            p.component_id
                .as_deref()
                .is_some_and(|id| component_refs.contains(&id))
        })
        .filter(|p| {
            p.connector_id
                .as_deref()
                .is_some_and(|id| connector_ids.contains(&id))
        })
        .filter_map(|p| p.cavity.as_deref().and_then(|c| c.parse::<u32>().ok()))
        .max()
        .unwrap_or(0)
}

struct ComponentIndex {
    code: String,
    /// Every spelling a connection may use for a connector, mapped to its canonical id.
    connector_aliases: FxHashMap<String, String>,
}

fn normalize_connector(
    raw: &RawSchematic,
    component_refs: &[&str],
    index: usize,
    connector: &RawConnector,
) -> Connector {
    let id = connector
        .id
        .clone()
        .or_else(|| connector.connector_code.clone())
        .or_else(|| connector.connector_engineering_code.clone())
        .unwrap_or_else(|| format!("X{}", index + 1));
    let label = connector
        .label
        .clone()
        .or_else(|| connector.name.clone())
        .or_else(|| connector.connector_engineering_code.clone())
        .unwrap_or_else(|| id.clone());
    let aliases: Vec<&str> = [
        Some(id.as_str()),
        connector.connector_code.as_deref(),
        connector.connector_engineering_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let cavity_count = connector
        .cavity_count
        .unwrap_or_else(|| highest_referenced_cavity(raw, component_refs, &aliases));

    Connector {
        id,
        label,
        gender: normalize_gender(connector.gender.as_deref()),
        color: connector
            .color
            .as_deref()
            .map(expand_wire_color)
            .unwrap_or_default(),
        cavity_count,
    }
}

fn wire_details(raw: &RawConnection) -> Option<WireDetails> {
    let nested = raw.wire_details.clone().unwrap_or_default();
    let fuse_code = nested
        .fuse
        .as_ref()
        .and_then(|f| f.code.clone())
        .or_else(|| raw.fuse_code.clone());
    let fuse_ampere = nested
        .fuse
        .as_ref()
        .and_then(|f| f.ampere.clone())
        .or_else(|| raw.fuse_ampere.clone());

    let details = WireDetails {
        fuse: fuse_code.map(|code| Fuse {
            code,
            ampere: fuse_ampere.unwrap_or_default(),
        }),
        cable_size: nested.cable_size.or_else(|| raw.cable_size.clone()),
        length: nested.length.or(raw.length),
        twist_id: nested.twist_id.or_else(|| raw.twist_id.clone()),
        shield_id: nested.shield_id.or_else(|| raw.shield_id.clone()),
    };
    (!details.is_empty()).then_some(details)
}

fn resolve_point(
    point: &RawConnectionPoint,
    by_raw_id: &FxHashMap<String, usize>,
    by_code: &FxHashMap<String, usize>,
    index: &[ComponentIndex],
) -> Option<ConnectionPoint> {
    let component_ref = point.component_id.as_deref()?;
    let slot = by_raw_id
        .get(component_ref)
        .or_else(|| by_code.get(component_ref))?;
    let component = &index[*slot];
    let connector_ref = point.connector_id.as_deref()?;
    let connector_id = component.connector_aliases.get(connector_ref)?;
    Some(ConnectionPoint {
        component_id: component.code.clone(),
        connector_id: connector_id.clone(),
        cavity: point.cavity.clone().unwrap_or_default(),
    })
}

/// Turns a backend payload into the canonical schematic graph.
///
/// Component codes are resolved once and applied to the component list, every connection endpoint
/// and `masterComponents`, so endpoints always name an existing component. Connections that still
/// do not resolve are dropped.
pub fn normalize(payload: &RawPayload) -> SchematicData {
    let raw = &payload.schematic;

    let mut components = Vec::with_capacity(raw.components.len());
    let mut index = Vec::with_capacity(raw.components.len());
    let mut by_raw_id: FxHashMap<String, usize> = FxHashMap::default();
    let mut by_code: FxHashMap<String, usize> = FxHashMap::default();

    for (i, rc) in raw.components.iter().enumerate() {
        let raw_id = rc
            .id
            .clone()
            .or_else(|| rc.code.clone())
            .unwrap_or_else(|| format!("component-{}", i + 1));
        let code = resolve_component_code(
            rc.code.as_deref(),
            rc.connectors
                .iter()
                .filter_map(|c| c.connector_engineering_code.as_deref()),
            &raw_id,
        );
        if by_code.contains_key(&code) {
            tracing::debug!(code = %code, raw_id = %raw_id, "duplicate component code in payload; keeping first");
            by_raw_id.entry(raw_id).or_insert(by_code[&code]);
            continue;
        }

        let connectors: Vec<Connector> = rc
            .connectors
            .iter()
            .enumerate()
            .map(|(ci, c)| normalize_connector(raw, &[raw_id.as_str(), code.as_str()], ci, c))
            .collect();

        let mut connector_aliases = FxHashMap::default();
        for (rconn, conn) in rc.connectors.iter().zip(&connectors) {
            for alias in [
                Some(&conn.id),
                rconn.connector_code.as_ref(),
                rconn.connector_engineering_code.as_ref(),
            ]
            .into_iter()
            .flatten()
            {
                connector_aliases
                    .entry(alias.clone())
                    .or_insert_with(|| conn.id.clone());
            }
        }

        let label = rc
            .label
            .clone()
            .or_else(|| rc.name.clone())
            .or_else(|| rc.description.clone())
            .unwrap_or_else(|| code.clone());
        let shape = rc
            .shape
            .as_deref()
            .map(ComponentShape::parse)
            .unwrap_or_default();

        let slot = components.len();
        by_raw_id.insert(raw_id, slot);
        by_code.insert(code.clone(), slot);
        index.push(ComponentIndex {
            code: code.clone(),
            connector_aliases,
        });
        components.push(Component {
            id: code,
            label,
            category: rc
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            shape,
            component_type: rc.component_type.clone().unwrap_or_default(),
            connectors,
        });
    }

    let mut connections = Vec::with_capacity(raw.connections.len());
    for (i, rc) in raw.connections.iter().enumerate() {
        let from = resolve_point(&rc.from, &by_raw_id, &by_code, &index);
        let to = resolve_point(&rc.to, &by_raw_id, &by_code, &index);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!(
                index = i,
                from = ?rc.from.component_id,
                to = ?rc.to.component_id,
                "dropping connection with unresolvable endpoint"
            );
            continue;
        };
        connections.push(Connection {
            from,
            to,
            color: rc.color.as_deref().map(expand_wire_color).unwrap_or_default(),
            label: rc
                .label
                .clone()
                .or_else(|| rc.wire_code.clone())
                .unwrap_or_default(),
            wire_details: wire_details(rc),
        });
    }

    let mut master_components: Vec<String> = Vec::with_capacity(raw.master_components.len());
    for m in &raw.master_components {
        let Some(slot) = by_raw_id.get(m).or_else(|| by_code.get(m)) else {
            tracing::debug!(master = %m, "master component not present in payload");
            continue;
        };
        let code = &components[*slot].id;
        if !master_components.contains(code) {
            master_components.push(code.clone());
        }
    }

    let name = raw
        .name
        .clone()
        .or_else(|| payload.item_name.clone())
        .unwrap_or_else(|| payload.kind.default_schematic_name().to_string());

    SchematicData {
        name,
        master_components,
        components,
        connections,
    }
}
