//! Click-to-inspect selection and popup state.

use serde::{Deserialize, Serialize};
use wirescope_core::{Fuse, SchematicData};

/// What a pointer click landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HitTarget {
    Component(String),
    Connector {
        component_id: String,
        connector_id: String,
    },
    Wire(usize),
    /// Empty space inside the schematic canvas.
    Canvas,
    /// Anywhere outside the schematic widget.
    Outside,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Selection {
    #[default]
    None,
    Component(String),
    Connector {
        component_id: String,
        connector_id: String,
    },
    Wire(usize),
}

impl Selection {
    fn from_target(target: &HitTarget) -> Option<Self> {
        match target {
            HitTarget::Component(id) => Some(Self::Component(id.clone())),
            HitTarget::Connector {
                component_id,
                connector_id,
            } => Some(Self::Connector {
                component_id: component_id.clone(),
                connector_id: connector_id.clone(),
            }),
            HitTarget::Wire(i) => Some(Self::Wire(*i)),
            HitTarget::Canvas | HitTarget::Outside => None,
        }
    }

    pub fn popup_kind(&self) -> Option<PopupKind> {
        match self {
            Self::None => None,
            Self::Component(_) => Some(PopupKind::Component),
            Self::Connector { .. } => Some(PopupKind::Connector),
            Self::Wire(_) => Some(PopupKind::Wire),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopupKind {
    Component,
    Connector,
    Wire,
}

/// Selection + popup state machine.
///
/// At most one element kind is selected and at most one popup is open. A popup closed through its
/// own close control stays closed for that element until a click on the canvas or outside the
/// widget re-arms it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    selection: Selection,
    popup: Option<PopupKind>,
    /// Elements whose popup was closed since the last canvas or outside click.
    dismissed: Vec<Selection>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn open_popup(&self) -> Option<PopupKind> {
        self.popup
    }

    pub fn click(&mut self, target: &HitTarget) {
        let Some(selection) = Selection::from_target(target) else {
            self.clear();
            return;
        };
        self.popup = if self.dismissed.contains(&selection) {
            None
        } else {
            selection.popup_kind()
        };
        self.selection = selection;
    }

    /// The popup's own close control.
    pub fn close_popup(&mut self) {
        if self.popup.take().is_some() && !self.dismissed.contains(&self.selection) {
            self.dismissed.push(self.selection.clone());
        }
    }

    /// Clears selection and popups, and re-arms dismissed popups.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSummary {
    pub id: String,
    pub label: String,
    pub gender: String,
    pub color: String,
    pub cavity_count: u32,
    pub connection_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PopupContent {
    Component {
        id: String,
        label: String,
        category: String,
        component_type: String,
        connectors: Vec<ConnectorSummary>,
    },
    Connector {
        component_id: String,
        component_label: String,
        connector: ConnectorSummary,
    },
    Wire {
        index: usize,
        label: String,
        color: String,
        from: String,
        to: String,
        fuse: Option<Fuse>,
        cable_size: Option<String>,
        length: Option<f64>,
        twist_id: Option<String>,
        shield_id: Option<String>,
    },
}

fn endpoint_text(component_id: &str, connector_id: &str, cavity: &str) -> String {
    if cavity.is_empty() {
        format!("{component_id} / {connector_id}")
    } else {
        format!("{component_id} / {connector_id} / {cavity}")
    }
}

/// Details shown in the popup for `selection`, or `None` when it no longer resolves.
pub fn popup_content(data: &SchematicData, selection: &Selection) -> Option<PopupContent> {
    let counts = data.connection_counts();
    let summary = |component_id: &str, c: &wirescope_core::Connector| ConnectorSummary {
        id: c.id.clone(),
        label: c.label.clone(),
        gender: c.gender.clone(),
        color: c.color.clone(),
        cavity_count: c.cavity_count,
        connection_count: counts
            .get(&(component_id.to_string(), c.id.clone()))
            .copied()
            .unwrap_or(0),
    };

    match selection {
        Selection::None => None,
        Selection::Component(id) => {
            let component = data.component(id)?;
            Some(PopupContent::Component {
                id: component.id.clone(),
                label: component.label.clone(),
                category: component.category.clone(),
                component_type: component.component_type.clone(),
                connectors: component
                    .connectors
                    .iter()
                    .map(|c| summary(&component.id, c))
                    .collect(),
            })
        }
        Selection::Connector {
            component_id,
            connector_id,
        } => {
            let component = data.component(component_id)?;
            let connector = component.connector(connector_id)?;
            Some(PopupContent::Connector {
                component_id: component.id.clone(),
                component_label: component.label.clone(),
                connector: summary(&component.id, connector),
            })
        }
        Selection::Wire(index) => {
            let c = data.connections.get(*index)?;
            let details = c.wire_details.clone().unwrap_or_default();
            Some(PopupContent::Wire {
                index: *index,
                label: c.label.clone(),
                color: c.color.clone(),
                from: endpoint_text(&c.from.component_id, &c.from.connector_id, &c.from.cavity),
                to: endpoint_text(&c.to.component_id, &c.to.connector_id, &c.to.cavity),
                fuse: details.fuse,
                cable_size: details.cable_size,
                length: details.length,
                twist_id: details.twist_id,
                shield_id: details.shield_id,
            })
        }
    }
}
