//! The placement connectivity graph.
//!
//! A [`PlacementGraph`] owns the instances, pads and nets of one placement
//! problem (the whole chip or one quadrant) together with the region the
//! instances must land in. Instances carry mutable coordinates; pads are
//! fixed. Nets are created lazily the first time an endpoint is attached.

use crate::ids::{InstanceId, NetId, NodeId, PadId};
use qplace_common::{InternalError, Region};
use std::collections::{BTreeSet, HashMap};

/// Nets with this many endpoints or more are ignored by the quadratic model.
///
/// They contribute no weight and act as boundaries when collecting connected
/// groups, which bounds both group size and assembly cost.
pub const MAX_NET_DEGREE: usize = 100;

/// Contract violations on graph operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Coordinate and key arrays of a bulk write disagree in length.
    #[error("location arrays disagree in length: {xs} x values, {ys} y values, {keys} keys")]
    LengthMismatch {
        /// Number of x values.
        xs: usize,
        /// Number of y values.
        ys: usize,
        /// Number of instance keys.
        keys: usize,
    },
    /// An instance id is not part of this graph.
    #[error("instance {0} is not part of this graph")]
    UnknownInstance(InstanceId),
    /// A pad id was added twice.
    #[error("pad {0} already exists in this graph")]
    DuplicatePad(PadId),
}

impl From<GraphError> for InternalError {
    fn from(err: GraphError) -> Self {
        InternalError::new(err.to_string())
    }
}

/// A movable instance and its net memberships.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The instance id.
    pub id: InstanceId,
    /// Current x coordinate of the instance centre.
    pub x: f32,
    /// Current y coordinate of the instance centre.
    pub y: f32,
    /// Nets this instance belongs to, in insertion order.
    pub nets: Vec<NetId>,
}

/// A fixed attachment point of a single net.
#[derive(Debug, Clone, Copy)]
pub struct Pad {
    /// The pad id.
    pub id: PadId,
    /// The owning net.
    pub net: NetId,
    /// Fixed x coordinate.
    pub x: f32,
    /// Fixed y coordinate.
    pub y: f32,
}

/// The endpoints of one net.
#[derive(Debug, Clone)]
pub struct Net {
    /// The net id.
    pub id: NetId,
    /// Movable endpoints in insertion order.
    pub instances: Vec<InstanceId>,
    /// Fixed endpoints in insertion order.
    pub pads: Vec<PadId>,
}

impl Net {
    /// Number of endpoints (instances plus pads).
    pub fn degree(&self) -> usize {
        self.instances.len() + self.pads.len()
    }
}

/// The nets, instances and pads reachable from one seed net.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectedGroup {
    /// Nets in the group.
    pub nets: BTreeSet<NetId>,
    /// Instances in the group.
    pub instances: BTreeSet<InstanceId>,
    /// Pads in the group.
    pub pads: BTreeSet<PadId>,
}

/// Connectivity and coordinates for one placement problem.
#[derive(Debug, Clone)]
pub struct PlacementGraph {
    region: Region,
    instances: Vec<Instance>,
    instance_index: HashMap<InstanceId, usize>,
    pads: Vec<Pad>,
    pad_index: HashMap<PadId, usize>,
    nets: Vec<Net>,
    net_index: HashMap<NetId, usize>,
}

impl PlacementGraph {
    /// Creates an empty graph over the given region.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            instances: Vec::new(),
            instance_index: HashMap::new(),
            pads: Vec::new(),
            pad_index: HashMap::new(),
            nets: Vec::new(),
            net_index: HashMap::new(),
        }
    }

    /// Returns the placement region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Replaces the placement region.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Adds an instance with its net memberships.
    ///
    /// New instances start at the region centre. Adding an existing id
    /// replaces its net list and keeps its coordinates.
    pub fn add_instance(&mut self, id: InstanceId, nets: Vec<NetId>) {
        if let Some(&idx) = self.instance_index.get(&id) {
            self.instances[idx].nets = nets;
            return;
        }
        let (x, y) = self.region.center();
        self.instance_index.insert(id, self.instances.len());
        self.instances.push(Instance { id, x, y, nets });
    }

    /// Adds a fixed pad owned by `net` at `(x, y)`.
    ///
    /// This records the pad only; attach it to the net with [`add_net`](Self::add_net).
    pub fn add_pad(&mut self, id: PadId, net: NetId, x: f32, y: f32) -> Result<(), GraphError> {
        if self.pad_index.contains_key(&id) {
            return Err(GraphError::DuplicatePad(id));
        }
        self.pad_index.insert(id, self.pads.len());
        self.pads.push(Pad { id, net, x, y });
        Ok(())
    }

    /// Appends an endpoint to a net, creating the net on first reference.
    pub fn add_net(&mut self, net: NetId, node: NodeId) {
        let idx = match self.net_index.get(&net) {
            Some(&idx) => idx,
            None => {
                let idx = self.nets.len();
                self.net_index.insert(net, idx);
                self.nets.push(Net {
                    id: net,
                    instances: Vec::new(),
                    pads: Vec::new(),
                });
                idx
            }
        };
        match node {
            NodeId::Instance(id) => self.nets[idx].instances.push(id),
            NodeId::Pad(id) => self.nets[idx].pads.push(id),
        }
    }

    /// Returns the instance with the given id.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instance_index.get(&id).map(|&idx| &self.instances[idx])
    }

    /// Returns the pad with the given id.
    pub fn pad(&self, id: PadId) -> Option<&Pad> {
        self.pad_index.get(&id).map(|&idx| &self.pads[idx])
    }

    /// Returns the net with the given id.
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.net_index.get(&id).map(|&idx| &self.nets[idx])
    }

    /// Returns the degree of a net, or 0 if the net is unknown.
    pub fn net_degree(&self, id: NetId) -> usize {
        self.net(id).map_or(0, Net::degree)
    }

    /// Returns the nets an instance belongs to, or an empty slice if unknown.
    pub fn instance_nets(&self, id: InstanceId) -> &[NetId] {
        self.instance(id)
            .map(|inst| inst.nets.as_slice())
            .unwrap_or(&[])
    }

    /// Returns all instances in insertion order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Returns all pads in insertion order.
    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    /// Returns all nets in creation order.
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Returns all instance ids in insertion order.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|inst| inst.id).collect()
    }

    /// Returns all net ids in creation order.
    pub fn net_ids(&self) -> Vec<NetId> {
        self.nets.iter().map(|net| net.id).collect()
    }

    /// Returns whether the instance belongs to this graph.
    pub fn contains_instance(&self, id: InstanceId) -> bool {
        self.instance_index.contains_key(&id)
    }

    /// Returns the number of instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Returns the number of pads.
    pub fn pad_count(&self) -> usize {
        self.pads.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Maps each instance to a dense matrix index in the order given.
    ///
    /// Repeated ids keep their first index.
    pub fn local_order(&self, instances: &[InstanceId]) -> HashMap<InstanceId, usize> {
        let mut order = HashMap::with_capacity(instances.len());
        for &id in instances {
            let next = order.len();
            order.entry(id).or_insert(next);
        }
        order
    }

    /// Returns the coordinates of one instance.
    pub fn location(&self, id: InstanceId) -> Option<(f32, f32)> {
        self.instance(id).map(|inst| (inst.x, inst.y))
    }

    /// Moves one instance.
    pub fn set_location(&mut self, id: InstanceId, x: f32, y: f32) -> Result<(), GraphError> {
        let idx = *self
            .instance_index
            .get(&id)
            .ok_or(GraphError::UnknownInstance(id))?;
        self.instances[idx].x = x;
        self.instances[idx].y = y;
        Ok(())
    }

    /// Writes coordinates for many instances at once.
    ///
    /// Fails without touching any coordinate when the three slices differ in
    /// length or when any key is not part of the graph.
    pub fn set_locations(
        &mut self,
        xs: &[f32],
        ys: &[f32],
        keys: &[InstanceId],
    ) -> Result<(), GraphError> {
        if xs.len() != keys.len() || ys.len() != keys.len() {
            return Err(GraphError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
                keys: keys.len(),
            });
        }
        let slots = keys
            .iter()
            .map(|id| {
                self.instance_index
                    .get(id)
                    .copied()
                    .ok_or(GraphError::UnknownInstance(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for ((slot, &x), &y) in slots.into_iter().zip(xs).zip(ys) {
            self.instances[slot].x = x;
            self.instances[slot].y = y;
        }
        Ok(())
    }

    /// Reads coordinates in the order given by `keys`.
    pub fn locations(&self, keys: &[InstanceId]) -> Result<(Vec<f32>, Vec<f32>), GraphError> {
        let mut xs = Vec::with_capacity(keys.len());
        let mut ys = Vec::with_capacity(keys.len());
        for &id in keys {
            let (x, y) = self.location(id).ok_or(GraphError::UnknownInstance(id))?;
            xs.push(x);
            ys.push(y);
        }
        Ok((xs, ys))
    }

    /// Collects the connected group reachable from `seed`.
    ///
    /// Expansion walks net → instance → net with an explicit worklist. Nets
    /// of degree [`MAX_NET_DEGREE`] or more, and nets unknown to the graph,
    /// are neither included nor expanded through.
    pub fn collect_connected_group(&self, seed: NetId) -> ConnectedGroup {
        let mut group = ConnectedGroup::default();
        let mut worklist = vec![seed];

        while let Some(net_id) = worklist.pop() {
            if group.nets.contains(&net_id) {
                continue;
            }
            let Some(net) = self.net(net_id) else {
                continue;
            };
            if net.degree() >= MAX_NET_DEGREE {
                continue;
            }
            group.nets.insert(net_id);
            group.pads.extend(net.pads.iter().copied());

            for &inst in &net.instances {
                if group.instances.insert(inst) {
                    worklist.extend(
                        self.instance_nets(inst)
                            .iter()
                            .filter(|n| !group.nets.contains(*n)),
                    );
                }
            }
        }

        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(i: u32) -> InstanceId {
        InstanceId::from_raw(i)
    }

    fn net(i: u32) -> NetId {
        NetId::from_raw(i)
    }

    fn pad(i: u32) -> PadId {
        PadId::from_raw(i)
    }

    /// Two instances on net 0, instance 1 also on net 1 with a pad.
    fn small_graph() -> PlacementGraph {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 100.0, 100.0));
        g.add_instance(inst(0), vec![net(0)]);
        g.add_instance(inst(1), vec![net(0), net(1)]);
        g.add_net(net(0), NodeId::Instance(inst(0)));
        g.add_net(net(0), NodeId::Instance(inst(1)));
        g.add_net(net(1), NodeId::Instance(inst(1)));
        g.add_pad(pad(0), net(1), 90.0, 10.0).unwrap();
        g.add_net(net(1), NodeId::Pad(pad(0)));
        g
    }

    #[test]
    fn empty_graph() {
        let g = PlacementGraph::new(Region::default());
        assert_eq!(g.instance_count(), 0);
        assert_eq!(g.pad_count(), 0);
        assert_eq!(g.net_count(), 0);
    }

    #[test]
    fn nets_created_lazily() {
        let g = small_graph();
        assert_eq!(g.net_count(), 2);
        assert_eq!(g.net_ids(), vec![net(0), net(1)]);
        assert_eq!(g.net_degree(net(0)), 2);
        assert_eq!(g.net_degree(net(1)), 2);
        assert_eq!(g.net_degree(net(9)), 0);
    }

    #[test]
    fn new_instances_start_at_region_center() {
        let g = small_graph();
        assert_eq!(g.location(inst(0)), Some((50.0, 50.0)));
    }

    #[test]
    fn duplicate_pad_rejected() {
        let mut g = small_graph();
        let err = g.add_pad(pad(0), net(1), 0.0, 0.0).unwrap_err();
        assert_eq!(err, GraphError::DuplicatePad(pad(0)));
        assert_eq!(g.pad(pad(0)).unwrap().x, 90.0);
    }

    #[test]
    fn local_order_is_dense_and_stable() {
        let g = small_graph();
        let order = g.local_order(&[inst(7), inst(3), inst(7), inst(5)]);
        assert_eq!(order.len(), 3);
        assert_eq!(order[&inst(7)], 0);
        assert_eq!(order[&inst(3)], 1);
        assert_eq!(order[&inst(5)], 2);
    }

    #[test]
    fn set_and_get_locations() {
        let mut g = small_graph();
        g.set_locations(&[1.0, 2.0], &[3.0, 4.0], &[inst(1), inst(0)])
            .unwrap();
        let (xs, ys) = g.locations(&[inst(0), inst(1)]).unwrap();
        assert_eq!(xs, vec![2.0, 1.0]);
        assert_eq!(ys, vec![4.0, 3.0]);
    }

    #[test]
    fn set_locations_length_mismatch_does_not_mutate() {
        let mut g = small_graph();
        let err = g
            .set_locations(&[1.0, 2.0], &[3.0], &[inst(0), inst(1)])
            .unwrap_err();
        assert!(matches!(err, GraphError::LengthMismatch { xs: 2, ys: 1, keys: 2 }));
        let err = g
            .set_locations(&[1.0, 2.0], &[3.0, 4.0], &[inst(0)])
            .unwrap_err();
        assert!(matches!(err, GraphError::LengthMismatch { .. }));
        assert_eq!(g.location(inst(0)), Some((50.0, 50.0)));
        assert_eq!(g.location(inst(1)), Some((50.0, 50.0)));
    }

    #[test]
    fn set_locations_unknown_key_does_not_mutate() {
        let mut g = small_graph();
        let err = g
            .set_locations(&[1.0, 2.0], &[3.0, 4.0], &[inst(0), inst(42)])
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownInstance(inst(42)));
        assert_eq!(g.location(inst(0)), Some((50.0, 50.0)));
    }

    #[test]
    fn locations_unknown_key_errors() {
        let g = small_graph();
        assert!(g.locations(&[inst(5)]).is_err());
    }

    #[test]
    fn re_adding_instance_replaces_nets() {
        let mut g = small_graph();
        g.set_location(inst(0), 5.0, 6.0).unwrap();
        g.add_instance(inst(0), vec![net(0), net(1)]);
        assert_eq!(g.instance_count(), 2);
        assert_eq!(g.instance_nets(inst(0)), &[net(0), net(1)]);
        assert_eq!(g.location(inst(0)), Some((5.0, 6.0)));
    }

    #[test]
    fn connected_group_spans_shared_instances() {
        let g = small_graph();
        let group = g.collect_connected_group(net(0));
        assert_eq!(group.nets, BTreeSet::from([net(0), net(1)]));
        assert_eq!(group.instances, BTreeSet::from([inst(0), inst(1)]));
        assert_eq!(group.pads, BTreeSet::from([pad(0)]));
    }

    #[test]
    fn connected_group_unknown_seed_is_empty() {
        let g = small_graph();
        assert_eq!(g.collect_connected_group(net(77)), ConnectedGroup::default());
    }

    #[test]
    fn connected_group_stops_at_high_degree_net() {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 10.0, 10.0));
        // net 0: instances 0 and 1; instance 1 also on a huge net 1 which
        // connects to instance 2 and a crowd of pads.
        g.add_instance(inst(0), vec![net(0)]);
        g.add_instance(inst(1), vec![net(0), net(1)]);
        g.add_instance(inst(2), vec![net(1), net(2)]);
        g.add_net(net(0), NodeId::Instance(inst(0)));
        g.add_net(net(0), NodeId::Instance(inst(1)));
        g.add_net(net(1), NodeId::Instance(inst(1)));
        g.add_net(net(1), NodeId::Instance(inst(2)));
        for p in 0..MAX_NET_DEGREE as u32 {
            g.add_pad(pad(p), net(1), 0.0, 0.0).unwrap();
            g.add_net(net(1), NodeId::Pad(pad(p)));
        }
        g.add_net(net(2), NodeId::Instance(inst(2)));

        let group = g.collect_connected_group(net(0));
        assert_eq!(group.nets, BTreeSet::from([net(0)]));
        assert_eq!(group.instances, BTreeSet::from([inst(0), inst(1)]));
        assert!(group.pads.is_empty());

        let group = g.collect_connected_group(net(1));
        assert_eq!(group, ConnectedGroup::default());
    }

    #[test]
    fn connected_group_handles_long_chains() {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 10.0, 10.0));
        let n = 20_000u32;
        for i in 0..n {
            g.add_instance(inst(i), vec![net(i), net(i + 1)]);
            g.add_net(net(i), NodeId::Instance(inst(i)));
            g.add_net(net(i + 1), NodeId::Instance(inst(i)));
        }
        let group = g.collect_connected_group(net(0));
        assert_eq!(group.instances.len(), n as usize);
        assert_eq!(group.nets.len(), n as usize + 1);
    }

    #[test]
    fn graph_error_converts_to_internal() {
        let err: InternalError = GraphError::UnknownInstance(inst(3)).into();
        assert!(err.message.contains("instance 3"));
    }
}
