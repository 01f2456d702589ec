//! Multi-select merging of normalized schematic graphs.

use crate::model::{Component, Connection, SchematicData};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub const MERGED_SCHEMATIC_NAME: &str = "Merged Schematic";

/// Active UI context under which supply versions of duplicated components take priority.
pub const SUPPLY_VIEW_CONTEXT: &str = "supply";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MergeMode {
    /// Keep only non-supply components.
    Component,
    /// Keep only supply components.
    Supply,
}

impl MergeMode {
    fn keeps(self, component: &Component) -> bool {
        match self {
            Self::Component => !component.is_supply(),
            Self::Supply => component.is_supply(),
        }
    }
}

/// Picks the primary version of a component id that occurs more than once.
///
/// The priority rule is applied literally: when both a supply and a non-supply version exist, the
/// supply version wins only if `active_context` equals [`SUPPLY_VIEW_CONTEXT`].
fn primary_index(versions: &[&Component], active_context: Option<&str>) -> usize {
    let supply = versions.iter().position(|c| c.is_supply());
    let other = versions.iter().position(|c| !c.is_supply());
    match (supply, other) {
        (Some(s), Some(o)) => {
            if active_context == Some(SUPPLY_VIEW_CONTEXT) {
                s
            } else {
                o
            }
        }
        _ => 0,
    }
}

fn merge_versions(versions: &[&Component], active_context: Option<&str>) -> Component {
    let primary = primary_index(versions, active_context);
    let mut merged = versions[primary].clone();

    let mut seen: FxHashSet<String> = merged.connectors.iter().map(|c| c.id.clone()).collect();
    for (i, version) in versions.iter().enumerate() {
        if i == primary {
            continue;
        }
        for connector in &version.connectors {
            if seen.insert(connector.id.clone()) {
                merged.connectors.push(connector.clone());
            }
        }
    }
    merged
}

/// Combines several graphs into one deduplicated graph.
///
/// Never fails: connections whose endpoints do not resolve after filtering and deduplication are
/// dropped.
pub fn merge(
    graphs: &[SchematicData],
    mode: Option<MergeMode>,
    active_context: Option<&str>,
) -> SchematicData {
    let mut grouped: IndexMap<&str, Vec<&Component>> = IndexMap::new();
    for graph in graphs {
        for component in &graph.components {
            if mode.is_some_and(|m| !m.keeps(component)) {
                continue;
            }
            grouped
                .entry(component.id.as_str())
                .or_default()
                .push(component);
        }
    }

    let components: Vec<Component> = grouped
        .values()
        .map(|versions| merge_versions(versions, active_context))
        .collect();

    let mut merged = SchematicData {
        name: match graphs {
            [] => String::new(),
            [single] => single.name.clone(),
            _ => MERGED_SCHEMATIC_NAME.to_string(),
        },
        master_components: Vec::new(),
        components,
        connections: Vec::new(),
    };

    for graph in graphs {
        for m in &graph.master_components {
            if !merged.master_components.contains(m) {
                merged.master_components.push(m.clone());
            }
        }
    }
    merged.retain_known_masters();

    let mut seen_keys: FxHashSet<String> = FxHashSet::default();
    let mut connections: Vec<Connection> = Vec::new();
    for graph in graphs {
        for connection in &graph.connections {
            if !merged.is_resolvable(connection) {
                tracing::debug!(
                    key = %connection.dedup_key(),
                    "dropping connection with unresolvable endpoint after merge"
                );
                continue;
            }
            if seen_keys.insert(connection.dedup_key()) {
                connections.push(connection.clone());
            }
        }
    }
    merged.connections = connections;

    tracing::debug!(
        inputs = graphs.len(),
        components = merged.components.len(),
        connections = merged.connections.len(),
        "merged schematic graphs"
    );
    merged
}
