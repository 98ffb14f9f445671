//! The chip database seam: reading the netlist in and writing origins back.

use serde::{Deserialize, Serialize};

use qplace_common::{InternalError, PlaceResult, Point, Rect, Region};
use qplace_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::graph::PlacementGraph;
use crate::ids::{CellId, InstanceId, NetId, NodeId, PadId};

/// Note emitted once the placement graph has been built.
pub const GRAPH_BUILT: DiagnosticCode = DiagnosticCode::new(Category::Note, 1);

/// Error emitted when no usable core region can be found.
pub const NO_CORE_REGION: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);

/// Placement status of a database instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceStatus {
    /// Not yet placed; movable.
    #[default]
    Unplaced,
    /// Placed by a placer; movable.
    Placed,
    /// Fixed in place; its pins act as pads.
    Fixed,
}

/// A movable instance as seen by the placer.
#[derive(Clone, PartialEq, Debug)]
pub struct MovableInstance {
    /// Database handle used for write-back.
    pub handle: CellId,
    /// Current footprint in database units.
    pub footprint: Rect,
    /// Connected nets, without repeats.
    pub nets: Vec<NetId>,
}

/// A fixed connection point: a pin of a fixed instance or an IO pin.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FixedPin {
    /// The net the pin is on.
    pub net: NetId,
    /// Centre of the pin shape.
    pub center: Point,
}

/// Read and write access to a chip database.
pub trait ChipDatabase {
    /// Placement rows; invalid rectangles are ignored.
    fn rows(&self) -> Vec<Rect>;

    /// The core box, if the database has one.
    fn core_box(&self) -> Option<Rect>;

    /// The core outline polygon.
    fn core_polygon(&self) -> Vec<Point>;

    /// Number of nets; net ids are `0..net_count()`.
    fn net_count(&self) -> usize;

    /// All movable instances.
    fn movable_instances(&self) -> Vec<MovableInstance>;

    /// Connected pins of fixed instances and connected IO pins.
    fn fixed_pins(&self) -> Vec<FixedPin>;

    /// Moves an instance so its lower-left corner is at `origin`.
    fn set_instance_location(&mut self, handle: CellId, origin: Point) -> PlaceResult<()>;

    /// Sets an instance's placement status.
    fn set_instance_status(&mut self, handle: CellId, status: PlaceStatus) -> PlaceResult<()>;
}

/// Picks the region to place into.
///
/// An explicit override wins; otherwise the union of valid rows, then the
/// core box, then the bounding box of the core polygon.
pub fn derive_region(db: &dyn ChipDatabase, region_override: Option<Rect>) -> Option<Rect> {
    if let Some(rect) = region_override.filter(Rect::is_valid) {
        return Some(rect);
    }
    let rows = db
        .rows()
        .into_iter()
        .filter(Rect::is_valid)
        .reduce(|acc, row| acc.union(&row));
    if rows.is_some() {
        return rows;
    }
    if let Some(core) = db.core_box().filter(Rect::is_valid) {
        return Some(core);
    }
    Rect::bounding(&db.core_polygon()).filter(Rect::is_valid)
}

/// Like [`derive_region`], but reports `E201` when nothing is usable.
pub fn derive_region_or_report(
    db: &dyn ChipDatabase,
    region_override: Option<Rect>,
    sink: &DiagnosticSink,
) -> Option<Rect> {
    let region = derive_region(db, region_override);
    if region.is_none() {
        sink.emit(
            Diagnostic::error(NO_CORE_REGION, "no valid core region to place into")
                .with_note("the design has no valid rows, core box or core polygon")
                .with_help("set [region] in qplace.toml"),
        );
    }
    region
}

/// A graph instance and the database instance it stands for.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlacedInstance {
    /// Id in the placement graph.
    pub id: InstanceId,
    /// Database handle.
    pub handle: CellId,
    /// Footprint size in database units.
    pub width: i64,
    /// Footprint height in database units.
    pub height: i64,
}

/// Builds the global placement graph from the database.
///
/// Instances without any connected net are left out. Every movable instance
/// starts at its footprint centre, and every fixed pin becomes a pad.
pub fn build_graph(
    db: &dyn ChipDatabase,
    region: Rect,
    sink: &DiagnosticSink,
) -> PlaceResult<(PlacementGraph, Vec<PlacedInstance>)> {
    let mut graph = PlacementGraph::new(Region::from(region));
    let mut placed = Vec::new();

    for (k, movable) in db.movable_instances().into_iter().enumerate() {
        if movable.nets.is_empty() {
            continue;
        }
        let id = InstanceId::from_raw(
            u32::try_from(k).map_err(|_| InternalError::new("instance count exceeds u32 range"))?,
        );
        for &net in &movable.nets {
            graph.add_net(net, NodeId::Instance(id));
        }
        graph.add_instance(id, movable.nets);
        let (cx, cy) = movable.footprint.center();
        graph.set_location(id, cx, cy)?;
        placed.push(PlacedInstance {
            id,
            handle: movable.handle,
            width: movable.footprint.width(),
            height: movable.footprint.height(),
        });
    }

    for (k, pin) in db.fixed_pins().into_iter().enumerate() {
        let id = PadId::from_raw(
            u32::try_from(k).map_err(|_| InternalError::new("pad count exceeds u32 range"))?,
        );
        graph.add_pad(id, pin.net, pin.center.x as f32, pin.center.y as f32)?;
        graph.add_net(pin.net, NodeId::Pad(id));
    }

    sink.emit(Diagnostic::note(
        GRAPH_BUILT,
        format!(
            "placement graph: {} instances, {} pads, {} nets in {region}",
            graph.instance_count(),
            graph.pad_count(),
            graph.net_count()
        ),
    ));
    Ok((graph, placed))
}

/// Writes graph coordinates back as grid-aligned origins.
///
/// Each origin is the instance centre minus half its footprint, rounded to
/// the grid and clamped so the footprint stays inside `region`. Returns the
/// number of instances written.
pub fn finalize(
    db: &mut dyn ChipDatabase,
    graph: &PlacementGraph,
    placed: &[PlacedInstance],
    region: Rect,
    grid: i64,
) -> PlaceResult<usize> {
    let grid = grid.max(1);
    let mut count = 0;
    for inst in placed {
        let Some((x, y)) = graph.location(inst.id) else {
            continue;
        };
        let origin = Point::new(
            snap_origin(x, inst.width, region.llx, region.urx, grid),
            snap_origin(y, inst.height, region.lly, region.ury, grid),
        );
        db.set_instance_location(inst.handle, origin)?;
        db.set_instance_status(inst.handle, PlaceStatus::Placed)?;
        count += 1;
    }
    Ok(count)
}

fn snap_origin(center: f32, size: i64, lo: i64, hi: i64, grid: i64) -> i64 {
    let raw = f64::from(center) - size as f64 / 2.0;
    let rounded = if raw.is_finite() {
        (raw / grid as f64).round() as i64 * grid
    } else {
        lo
    };
    rounded.min(hi - size).max(lo)
}
