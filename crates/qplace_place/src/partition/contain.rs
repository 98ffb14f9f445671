//! Containment of one half of a cut into a self-contained sub-graph.

use std::collections::HashSet;

use qplace_common::{PlaceResult, Region};

use crate::graph::PlacementGraph;
use crate::ids::{InstanceId, NetId, NodeId, PadId};

use super::{Cut, CutAxis, CutSide};

/// Builds the sub-graph for the instances of one half.
///
/// The sub-graph holds exactly the instances in `half`, seeded with their
/// current coordinates in `parent`, and every net touching them. Each net
/// endpoint outside the half becomes a virtual pad: fixed pads are clamped
/// into `region`, and instances from outside the half are clamped and then
/// pushed onto the region edge facing the cut.
pub fn build_subgraph(
    parent: &PlacementGraph,
    half: &[InstanceId],
    region: Region,
    cut: Cut,
) -> PlaceResult<PlacementGraph> {
    let members: HashSet<InstanceId> = half.iter().copied().collect();
    let mut sub = PlacementGraph::new(region);

    for &id in half {
        sub.add_instance(id, parent.instance_nets(id).to_vec());
        if let Some((x, y)) = parent.location(id) {
            sub.set_location(id, x, y)?;
        }
    }

    let mut done: HashSet<NetId> = HashSet::new();
    let mut next_pad = 0u32;
    for &id in half {
        for &net_id in parent.instance_nets(id) {
            if !done.insert(net_id) {
                continue;
            }
            let Some(net) = parent.net(net_id) else {
                continue;
            };

            for pad in net.pads.iter().filter_map(|&p| parent.pad(p)) {
                let (x, y) = region.clamp(pad.x, pad.y);
                add_virtual_pad(&mut sub, &mut next_pad, net_id, x, y)?;
            }

            for &other in &net.instances {
                if members.contains(&other) {
                    sub.add_net(net_id, NodeId::Instance(other));
                    continue;
                }
                let Some((x, y)) = parent.location(other) else {
                    continue;
                };
                let (x, y) = snap_to_cut(region, cut, region.clamp(x, y));
                add_virtual_pad(&mut sub, &mut next_pad, net_id, x, y)?;
            }
        }
    }

    Ok(sub)
}

fn add_virtual_pad(
    sub: &mut PlacementGraph,
    next_pad: &mut u32,
    net: NetId,
    x: f32,
    y: f32,
) -> PlaceResult<()> {
    let id = PadId::from_raw(*next_pad);
    *next_pad += 1;
    sub.add_pad(id, net, x, y)?;
    sub.add_net(net, NodeId::Pad(id));
    Ok(())
}

/// Moves a point onto the region edge that lies on the cut line.
fn snap_to_cut(region: Region, cut: Cut, (x, y): (f32, f32)) -> (f32, f32) {
    match (cut.axis, cut.side) {
        (CutAxis::X, CutSide::Lower) => (region.urx, y),
        (CutAxis::X, CutSide::Upper) => (region.llx, y),
        (CutAxis::Y, CutSide::Lower) => (x, region.ury),
        (CutAxis::Y, CutSide::Upper) => (x, region.lly),
    }
}
