//! Two-row schematic layout with orthogonal wire routing.
//!
//! Layout runs in two passes. The measurement pass fills a [`MeasurementCache`] with the
//! rendered width of every component and connector label; the placement pass turns those widths
//! into absolute boxes, attaches wires to connector slots and routes them as
//! vertical-horizontal-vertical polylines.

use crate::config::LayoutConfig;
use crate::geometry::{
    Bounds, Point, component_width, connection_offset, connector_width, distance_to_segment,
    finite_or, row_positions, same_row_offset, segment_intersection,
};
use crate::interaction::HitTarget;
use crate::model::{
    ComponentBox, ConnectorBox, FuseTag, Hop, Row, SchematicLayout, SpliceDot, WireBand, WireEnd,
    WireRoute, connector_key,
};
use crate::text::{MeasurementCache, TextStyle};
use crate::{LayoutOptions, Result};
use rustc_hash::FxHashMap;
use wirescope_core::{Component, Connection, ConnectionPoint, Fuse, SchematicData};

/// First pass: label widths for every component and connector in `data`.
pub fn measure_labels(data: &SchematicData, options: &LayoutOptions) -> MeasurementCache {
    let config = &options.config;
    MeasurementCache::measure_schematic(
        data,
        options.text_measurer.as_ref(),
        &TextStyle::sized(config.component_font_size),
        &TextStyle::sized(config.connector_font_size),
        config.baseline_label_width,
    )
}

pub fn layout_schematic(data: &SchematicData, options: &LayoutOptions) -> Result<SchematicLayout> {
    options.config.validate()?;
    let cache = measure_labels(data, options);
    Ok(place_schematic(data, &cache, &options.config))
}

fn fuse_annotations(data: &SchematicData) -> FxHashMap<&str, Vec<&Fuse>> {
    let mut out: FxHashMap<&str, Vec<&Fuse>> = FxHashMap::default();
    for (_, c) in data.resolved_connections() {
        let Some(fuse) = c.fuse() else {
            continue;
        };
        let list = out.entry(c.from.component_id.as_str()).or_default();
        if !list.iter().any(|f| f.code == fuse.code) {
            list.push(fuse);
        }
    }
    out
}

fn row_top(row: Row, config: &LayoutConfig) -> f64 {
    match row {
        Row::Master => config.margin,
        Row::Bottom => config.margin + config.component_height + config.row_gap,
    }
}

fn build_component_box(
    component: &Component,
    row: Row,
    x: f64,
    width: f64,
    connector_widths: &[f64],
    fuses: &[&Fuse],
    config: &LayoutConfig,
) -> ComponentBox {
    let y = row_top(row, config);
    let height = config.component_height;
    let ch = config.connector_height;
    let fuse_column = if fuses.is_empty() {
        0.0
    } else {
        config.fuse_annotation_width
    };
    // The label band is the part of the box not taken by the connector strip.
    let band_top = match row {
        Row::Master => y,
        Row::Bottom => y + ch,
    };
    let band_height = height - ch;

    let mut connectors = Vec::with_capacity(component.connectors.len());
    let splice = component.is_splice().then(|| SpliceDot {
        cx: x + width / 2.0,
        cy: y + height / 2.0,
        outer_radius: config.splice_radius,
        inner_radius: config.splice_inner_radius,
    });

    if let Some(dot) = splice {
        let attach_y = match row {
            Row::Master => dot.cy + dot.outer_radius,
            Row::Bottom => dot.cy - dot.outer_radius,
        };
        for connector in &component.connectors {
            connectors.push(ConnectorBox {
                component_id: component.id.clone(),
                connector_id: connector.id.clone(),
                label: connector.label.clone(),
                x: dot.cx - dot.outer_radius,
                y: dot.cy - dot.outer_radius,
                width: dot.outer_radius * 2.0,
                height: dot.outer_radius * 2.0,
                attach_y,
            });
        }
    } else {
        let n = connector_widths.len();
        let total: f64 = connector_widths.iter().sum::<f64>()
            + config.connector_gap * n.saturating_sub(1) as f64;
        let (cy, attach_y) = match row {
            Row::Master => (y + height - ch, y + height),
            Row::Bottom => (y, y),
        };
        let mut cx = x + (width - total) / 2.0;
        for (connector, cw) in component.connectors.iter().zip(connector_widths) {
            connectors.push(ConnectorBox {
                component_id: component.id.clone(),
                connector_id: connector.id.clone(),
                label: connector.label.clone(),
                x: cx,
                y: cy,
                width: *cw,
                height: ch,
                attach_y,
            });
            cx += cw + config.connector_gap;
        }
    }

    let (label_x, label_y) = match splice {
        Some(dot) => match row {
            Row::Master => (dot.cx, dot.cy - dot.outer_radius - 6.0),
            Row::Bottom => (dot.cx, dot.cy + dot.outer_radius + config.component_font_size),
        },
        None => (
            x + (width - fuse_column) / 2.0,
            band_top + band_height / 2.0 + config.component_font_size * 0.35,
        ),
    };

    let fuses = fuses
        .iter()
        .enumerate()
        .map(|(i, f)| FuseTag {
            code: f.code.clone(),
            ampere: f.ampere.clone(),
            x: x + width - fuse_column + 4.0,
            y: band_top + config.fuse_annotation_line_height * (i + 1) as f64,
        })
        .collect();

    ComponentBox {
        id: component.id.clone(),
        label: component.label.clone(),
        category: component.category.clone(),
        shape: component.shape,
        row,
        x,
        y,
        width,
        height,
        label_x,
        label_y,
        connectors,
        splice,
        fuses,
    }
}

struct PendingWire<'a> {
    index: usize,
    connection: &'a Connection,
    from: Point,
    to: Point,
    band: WireBand,
}

/// Attach point for one wire end. Ends landing on the same connector are spread evenly across its
/// width in wire order; splice ends all meet at the dot.
fn attach_point<'a>(
    end: &'a ConnectionPoint,
    components: &[ComponentBox],
    box_index: &FxHashMap<&str, usize>,
    ends_per_connector: &FxHashMap<(&'a str, &'a str), usize>,
    next_slot: &mut FxHashMap<(&'a str, &'a str), usize>,
) -> Option<(Point, Row)> {
    let component = &components[*box_index.get(end.component_id.as_str())?];
    let connector = component.connector(&end.connector_id)?;
    if let Some(dot) = component.splice {
        return Some((Point::new(dot.cx, connector.attach_y), component.row));
    }
    let key = (end.component_id.as_str(), end.connector_id.as_str());
    let n = ends_per_connector.get(&key).copied().unwrap_or(1);
    let slot = next_slot.entry(key).or_insert(0);
    let i = *slot;
    *slot += 1;
    let x = connector.x + connector.width * (i + 1) as f64 / (n + 1) as f64;
    Some((Point::new(x, connector.attach_y), component.row))
}

fn route_wires(
    data: &SchematicData,
    components: &[ComponentBox],
    config: &LayoutConfig,
) -> Vec<WireRoute> {
    let box_index: FxHashMap<&str, usize> = components
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let resolved: Vec<(usize, &Connection)> = data.resolved_connections().collect();

    // Pass-local accumulator: how many wire ends land on each connector, and which slot is next.
    let mut ends_per_connector: FxHashMap<(&str, &str), usize> = FxHashMap::default();
    for (_, c) in &resolved {
        for end in [&c.from, &c.to] {
            *ends_per_connector
                .entry((end.component_id.as_str(), end.connector_id.as_str()))
                .or_default() += 1;
        }
    }
    let mut next_slot: FxHashMap<(&str, &str), usize> = FxHashMap::default();

    let mut pending = Vec::with_capacity(resolved.len());
    for (index, connection) in resolved {
        let from = attach_point(
            &connection.from,
            components,
            &box_index,
            &ends_per_connector,
            &mut next_slot,
        );
        let to = attach_point(
            &connection.to,
            components,
            &box_index,
            &ends_per_connector,
            &mut next_slot,
        );
        let (Some((from, from_row)), Some((to, to_row))) = (from, to) else {
            tracing::debug!(index, "skipping wire without placed endpoints");
            continue;
        };
        let band = match (from_row, to_row) {
            (Row::Master, Row::Master) => WireBand::MasterMaster,
            (Row::Bottom, Row::Bottom) => WireBand::BottomBottom,
            _ => WireBand::Cross,
        };
        pending.push(PendingWire {
            index,
            connection,
            from,
            to,
            band,
        });
    }

    let mut band_totals: FxHashMap<WireBand, usize> = FxHashMap::default();
    for w in &pending {
        *band_totals.entry(w.band).or_default() += 1;
    }
    let mut band_seen: FxHashMap<WireBand, usize> = FxHashMap::default();

    let origin = Point::new(config.margin, config.margin);
    let mut wires = Vec::with_capacity(pending.len());
    for w in pending {
        let slot = band_seen.entry(w.band).or_insert(0);
        let i = *slot;
        *slot += 1;
        let total = band_totals.get(&w.band).copied().unwrap_or(1);

        let (y1, y2) = (w.from.y, w.to.y);
        let mid = (y1 + y2) / 2.0;
        let rail_y = match w.band {
            WireBand::Cross => mid + connection_offset(i, total, y1, y2, config.wire_step),
            // Same-row wires turn into the gap between the rows and stay clear of both.
            WireBand::MasterMaster => {
                let near = y1.max(y2);
                near + same_row_offset(
                    i,
                    total,
                    config.same_row_clearance,
                    config.wire_step,
                    row_top(Row::Bottom, config) - near,
                )
            }
            WireBand::BottomBottom => {
                let near = y1.min(y2);
                near - same_row_offset(
                    i,
                    total,
                    config.same_row_clearance,
                    config.wire_step,
                    near - (row_top(Row::Master, config) + config.component_height),
                )
            }
        };
        let rail_y = finite_or(rail_y, finite_or(mid, origin.y));

        let from = w.from.or(origin);
        let to = w.to.or(origin);
        let points = vec![
            from,
            Point::new(from.x, rail_y),
            Point::new(to.x, rail_y),
            to,
        ];

        let c = w.connection;
        wires.push(WireRoute {
            index: w.index,
            from: wire_end(&c.from),
            to: wire_end(&c.to),
            color: c.color.clone(),
            label: c.label.clone(),
            band: w.band,
            points,
            hops: Vec::new(),
            fuse: c.fuse().cloned(),
        });
    }

    detect_hops(&mut wires, config.hop_radius);
    wires
}

fn wire_end(p: &ConnectionPoint) -> WireEnd {
    WireEnd {
        component_id: p.component_id.clone(),
        connector_id: p.connector_id.clone(),
        cavity: p.cavity.clone(),
    }
}

/// Marks every place where a wire's horizontal rail crosses another wire's vertical leg.
///
/// Touching at a leg end (a shared anchor or a corner on the rail) is a connection, not a crossing,
/// and gets no hop. Hops closer than one diameter to each other or to the rail corners are merged
/// away.
pub fn detect_hops(wires: &mut [WireRoute], radius: f64) {
    let rails: Vec<(Point, Point)> = wires.iter().map(WireRoute::rail).collect();
    let legs: Vec<[(Point, Point); 2]> = wires
        .iter()
        .map(|w| [(w.points[0], w.points[1]), (w.points[2], w.points[3])])
        .collect();
    let diameter = radius * 2.0;

    for (a, wire) in wires.iter_mut().enumerate() {
        let (r0, r1) = rails[a];
        let direction = if r1.x >= r0.x { 1.0 } else { -1.0 };
        let mut hops: Vec<Hop> = Vec::new();

        for (b, pair) in legs.iter().enumerate() {
            if a == b {
                continue;
            }
            for &(l0, l1) in pair {
                if (l1.y - l0.y).abs() < f64::EPSILON {
                    continue;
                }
                let Some(p) =
                    segment_intersection(r0.x, r0.y, r1.x, r1.y, l0.x, l0.y, l1.x, l1.y)
                else {
                    continue;
                };
                if p.distance(l0) < radius || p.distance(l1) < radius {
                    continue;
                }
                if (p.x - r0.x).abs() < diameter || (p.x - r1.x).abs() < diameter {
                    continue;
                }
                hops.push(Hop {
                    x: p.x,
                    y: r0.y,
                    radius,
                });
            }
        }

        hops.sort_by(|h1, h2| (direction * h1.x).total_cmp(&(direction * h2.x)));
        hops.dedup_by(|next, kept| (next.x - kept.x).abs() < diameter);
        wire.hops = hops;
    }
}

/// Second pass: absolute placement from measured widths.
pub fn place_schematic(
    data: &SchematicData,
    cache: &MeasurementCache,
    config: &LayoutConfig,
) -> SchematicLayout {
    let fuses = fuse_annotations(data);
    let mut components = Vec::with_capacity(data.components.len());

    for row in [Row::Master, Row::Bottom] {
        let members: Vec<&Component> = data
            .components
            .iter()
            .filter(|c| data.is_master(&c.id) == (row == Row::Master))
            .collect();

        let connector_widths: Vec<Vec<f64>> = members
            .iter()
            .map(|c| {
                c.connectors
                    .iter()
                    .map(|k| connector_width(cache.connector(&c.id, &k.id), config))
                    .collect()
            })
            .collect();
        let widths: Vec<f64> = members
            .iter()
            .zip(&connector_widths)
            .map(|(c, cw)| {
                component_width(
                    cache.component(&c.id),
                    cw,
                    c.shape,
                    fuses.contains_key(c.id.as_str()),
                    config,
                )
            })
            .collect();
        let xs = row_positions(&widths, config.margin, config.component_gap);

        for (((component, cw), width), x) in members.iter().zip(&connector_widths).zip(&widths).zip(xs)
        {
            let component_fuses = fuses
                .get(component.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            components.push(build_component_box(
                component,
                row,
                x,
                *width,
                cw,
                component_fuses,
                config,
            ));
        }
    }

    let wires = route_wires(data, &components, config);

    let mut bounds: Option<Bounds> = None;
    let mut include = |b: Bounds| match bounds.as_mut() {
        Some(cur) => cur.union(&b),
        None => bounds = Some(b),
    };
    for c in &components {
        include(c.bounds());
        for f in &c.fuses {
            include(Bounds::from_rect(
                f.x,
                f.y - config.fuse_annotation_line_height,
                config.fuse_annotation_width,
                config.fuse_annotation_line_height,
            ));
        }
    }
    for w in &wires {
        if let Some(b) = Bounds::from_points(w.points.iter().copied()) {
            include(b);
        }
        for h in &w.hops {
            include(Bounds::from_rect(h.x - h.radius, h.y - h.radius, h.radius * 2.0, h.radius));
        }
    }
    let bounds = bounds.unwrap_or(Bounds::from_rect(0.0, 0.0, 0.0, 0.0));

    let connection_counts = data
        .connection_counts()
        .into_iter()
        .map(|((component, connector), n)| (connector_key(&component, &connector), n))
        .collect();

    tracing::debug!(
        components = components.len(),
        wires = wires.len(),
        hops = wires.iter().map(|w| w.hops.len()).sum::<usize>(),
        "placed schematic"
    );

    SchematicLayout {
        name: data.name.clone(),
        components,
        wires,
        bounds,
        connection_counts,
    }
}

impl SchematicLayout {
    /// What sits under `p` (layout coordinates): connectors above components above wires.
    pub fn hit_test(&self, p: Point, tolerance: f64) -> HitTarget {
        for component in &self.components {
            if component.splice.is_some() {
                continue;
            }
            for connector in &component.connectors {
                if connector.bounds().contains(p) {
                    return HitTarget::Connector {
                        component_id: connector.component_id.clone(),
                        connector_id: connector.connector_id.clone(),
                    };
                }
            }
        }
        for component in &self.components {
            let hit = match component.splice {
                Some(dot) => p.distance(Point::new(dot.cx, dot.cy)) <= dot.outer_radius + tolerance,
                None => component.bounds().contains(p),
            };
            if hit {
                return HitTarget::Component(component.id.clone());
            }
        }
        for wire in &self.wires {
            if wire
                .segments()
                .any(|(a, b)| distance_to_segment(p, a, b) <= tolerance)
            {
                return HitTarget::Wire(wire.index);
            }
        }
        HitTarget::Canvas
    }
}
