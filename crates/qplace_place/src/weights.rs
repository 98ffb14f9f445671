//! Clique-model assembly of the placement system.
//!
//! Every net is expanded into a clique over its instances with weight
//! `1 / (degree - 1)`. Pads on the net pull each of its instances towards
//! their fixed location through the right-hand sides.

use std::collections::HashMap;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::graph::{PlacementGraph, MAX_NET_DEGREE};
use crate::ids::{InstanceId, NetId};

/// Returns the clique weight for a net of the given degree.
///
/// Nets with a single endpoint or `MAX_NET_DEGREE` or more endpoints carry
/// no weight.
pub fn net_weight(degree: usize) -> f32 {
    if degree > 1 && degree < MAX_NET_DEGREE {
        1.0 / (degree - 1) as f32
    } else {
        0.0
    }
}

/// An assembled placement system `A x = bx`, `A y = by`.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Shared system matrix over the local instance order.
    pub matrix: CsrMatrix<f32>,
    /// X right-hand side.
    pub bx: DVector<f32>,
    /// Y right-hand side.
    pub by: DVector<f32>,
    /// Instances whose diagonal is zero; the solver cannot place them.
    pub floating: Vec<InstanceId>,
}

impl Assembly {
    /// Returns whether the system carries no connectivity at all.
    pub fn is_degenerate(&self) -> bool {
        self.matrix.nrows() == 0 || self.matrix.values().iter().all(|&v| v == 0.0)
    }
}

/// Assembles the system for `instances` over the nets in `nets`.
///
/// The position of an instance in `instances` fixes its row. Net members
/// that are not in `instances` are ignored.
pub fn assemble(
    graph: &PlacementGraph,
    instances: &[InstanceId],
    nets: &[NetId],
) -> Assembly {
    let order = graph.local_order(instances);
    let n = order.len();
    let mut coo = CooMatrix::new(n, n);
    let mut diagonal = vec![0.0f32; n];
    let mut bx = DVector::zeros(n);
    let mut by = DVector::zeros(n);

    for &net_id in nets {
        let Some(net) = graph.net(net_id) else {
            continue;
        };
        let weight = net_weight(net.degree());
        if weight == 0.0 {
            continue;
        }
        let locals = local_rows(&order, &net.instances);

        for (a, &i) in locals.iter().enumerate() {
            for &j in &locals[a + 1..] {
                if i == j {
                    continue;
                }
                coo.push(i, j, -weight);
                coo.push(j, i, -weight);
                diagonal[i] += weight;
                diagonal[j] += weight;
            }
        }

        if net.pads.is_empty() {
            continue;
        }
        let pull = net.pads.len() as f32 * weight;
        for &i in &locals {
            diagonal[i] += pull;
            for pad in net.pads.iter().filter_map(|&p| graph.pad(p)) {
                bx[i] += weight * pad.x;
                by[i] += weight * pad.y;
            }
        }
    }

    for (row, &val) in diagonal.iter().enumerate() {
        if val != 0.0 {
            coo.push(row, row, val);
        }
    }

    let mut floating: Vec<InstanceId> = order
        .iter()
        .filter(|&(_, &row)| diagonal[row] == 0.0)
        .map(|(&id, _)| id)
        .collect();
    floating.sort();

    Assembly {
        matrix: CsrMatrix::from(&coo),
        bx,
        by,
        floating,
    }
}

fn local_rows(order: &HashMap<InstanceId, usize>, members: &[InstanceId]) -> Vec<usize> {
    members.iter().filter_map(|id| order.get(id).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{NodeId, PadId};
    use nalgebra::DMatrix;
    use qplace_common::Region;
    use rand::rngs::StdRng;
    use rand::seq::index::sample;
    use rand::{Rng, SeedableRng};

    fn inst(i: u32) -> InstanceId {
        InstanceId::from_raw(i)
    }

    fn net(i: u32) -> NetId {
        NetId::from_raw(i)
    }

    fn connect(g: &mut PlacementGraph, n: NetId, members: &[InstanceId]) {
        for &m in members {
            g.add_net(n, NodeId::Instance(m));
        }
    }

    fn dense(a: &CsrMatrix<f32>) -> DMatrix<f32> {
        DMatrix::from(a)
    }

    #[test]
    fn weight_formula() {
        assert_eq!(net_weight(0), 0.0);
        assert_eq!(net_weight(1), 0.0);
        assert_eq!(net_weight(2), 1.0);
        assert_eq!(net_weight(3), 0.5);
        assert_eq!(net_weight(5), 0.25);
        assert!((net_weight(99) - 1.0 / 98.0).abs() < f32::EPSILON);
        assert_eq!(net_weight(100), 0.0);
        assert_eq!(net_weight(1000), 0.0);
    }

    #[test]
    fn three_pin_clique_is_symmetric_laplacian() {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 10.0, 10.0));
        let ids = [inst(4), inst(9), inst(2)];
        for &id in &ids {
            g.add_instance(id, vec![net(0)]);
        }
        connect(&mut g, net(0), &ids);

        let asm = assemble(&g, &ids, &[net(0)]);
        let d = dense(&asm.matrix);
        for i in 0..3 {
            assert!((d[(i, i)] - 1.0).abs() < 1e-6);
            for j in 0..3 {
                assert_eq!(d[(i, j)], d[(j, i)]);
                if i != j {
                    assert!((d[(i, j)] + 0.5).abs() < 1e-6);
                }
            }
        }
        assert!(asm.bx.iter().all(|&v| v == 0.0));
        assert!(asm.floating.is_empty());
    }

    /// 150 instances on 200 overlapping random nets, some with pads, plus
    /// one net spanning every instance.
    #[test]
    fn random_overlapping_netlist_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 500.0, 500.0));
        let ids: Vec<InstanceId> = (0..150).map(inst).collect();
        let mut instance_nets: Vec<Vec<NetId>> = vec![Vec::new(); ids.len()];
        let mut nets = Vec::new();
        let mut pad_id = 0;

        for k in 0..200u32 {
            let degree = rng.gen_range(2..=6);
            for idx in sample(&mut rng, ids.len(), degree) {
                g.add_net(net(k), NodeId::Instance(ids[idx]));
                instance_nets[idx].push(net(k));
            }
            for _ in 0..rng.gen_range(0..=2) {
                let (x, y) = (rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0));
                g.add_pad(PadId::from_raw(pad_id), net(k), x, y).unwrap();
                g.add_net(net(k), NodeId::Pad(PadId::from_raw(pad_id)));
                pad_id += 1;
            }
            nets.push(net(k));
        }
        let wide = net(1000);
        connect(&mut g, wide, &ids);
        for (idx, &id) in ids.iter().enumerate() {
            instance_nets[idx].push(wide);
            g.add_instance(id, instance_nets[idx].clone());
        }

        let narrow = dense(&assemble(&g, &ids, &nets).matrix);
        nets.push(wide);
        let asm = assemble(&g, &ids, &nets);
        let d = dense(&asm.matrix);
        assert_eq!(d.nrows(), ids.len());
        for i in 0..d.nrows() {
            assert!(d[(i, i)] >= 0.0);
            for j in 0..i {
                assert!(
                    (d[(i, j)] - d[(j, i)]).abs() < 1e-6,
                    "A[{i},{j}] = {} but A[{j},{i}] = {}",
                    d[(i, j)],
                    d[(j, i)]
                );
                assert!(d[(i, j)] <= 0.0);
            }
        }
        // The net over all 150 instances is past the degree limit.
        assert_eq!(d, narrow);
    }

    #[test]
    fn entries_are_row_major() {
        let mut g = PlacementGraph::new(Region::default());
        let ids = [inst(0), inst(1), inst(2)];
        for &id in &ids {
            g.add_instance(id, vec![net(0)]);
        }
        connect(&mut g, net(0), &ids);
        let asm = assemble(&g, &ids, &[net(0)]);
        let keys: Vec<(usize, usize)> = asm.matrix.triplet_iter().map(|(r, c, _)| (r, c)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 9);
    }

    #[test]
    fn pads_feed_diagonal_and_rhs() {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 100.0, 100.0));
        g.add_instance(inst(0), vec![net(0)]);
        g.add_instance(inst(1), vec![net(0)]);
        connect(&mut g, net(0), &[inst(0), inst(1)]);
        g.add_pad(PadId::from_raw(0), net(0), 10.0, 20.0).unwrap();
        g.add_net(net(0), NodeId::Pad(PadId::from_raw(0)));

        // degree 3 -> weight 0.5
        let asm = assemble(&g, &[inst(0), inst(1)], &[net(0)]);
        let d = dense(&asm.matrix);
        assert!((d[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((d[(0, 1)] + 0.5).abs() < 1e-6);
        assert_eq!(asm.bx.as_slice(), &[5.0, 5.0]);
        assert_eq!(asm.by.as_slice(), &[10.0, 10.0]);
    }

    #[test]
    fn single_instance_on_pad_net_is_anchored() {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 100.0, 100.0));
        g.add_instance(inst(0), vec![net(0)]);
        g.add_net(net(0), NodeId::Instance(inst(0)));
        g.add_pad(PadId::from_raw(0), net(0), 30.0, 70.0).unwrap();
        g.add_net(net(0), NodeId::Pad(PadId::from_raw(0)));

        let asm = assemble(&g, &[inst(0)], &[net(0)]);
        assert_eq!(dense(&asm.matrix)[(0, 0)], 1.0);
        assert_eq!(asm.bx.as_slice(), &[30.0]);
        assert_eq!(asm.by.as_slice(), &[70.0]);
        assert!(!asm.is_degenerate());
    }

    #[test]
    fn oversized_and_single_pin_nets_are_skipped() {
        let mut g = PlacementGraph::new(Region::default());
        let ids: Vec<InstanceId> = (0..MAX_NET_DEGREE as u32).map(inst).collect();
        for &id in &ids {
            g.add_instance(id, vec![net(0)]);
        }
        connect(&mut g, net(0), &ids);
        g.add_net(net(1), NodeId::Instance(ids[0]));

        let asm = assemble(&g, &ids, &[net(0), net(1)]);
        assert!(asm.is_degenerate());
        assert_eq!(asm.matrix.nnz(), 0);
        assert_eq!(asm.floating.len(), ids.len());
    }

    #[test]
    fn unconnected_instance_is_floating() {
        let mut g = PlacementGraph::new(Region::default());
        for i in 0..3 {
            g.add_instance(inst(i), vec![net(0)]);
        }
        connect(&mut g, net(0), &[inst(0), inst(1)]);
        let asm = assemble(&g, &[inst(0), inst(1), inst(2)], &[net(0)]);
        assert_eq!(asm.floating, vec![inst(2)]);
        assert!(!asm.is_degenerate());
    }

    #[test]
    fn empty_input_is_degenerate() {
        let g = PlacementGraph::new(Region::default());
        let asm = assemble(&g, &[], &[]);
        assert!(asm.is_degenerate());
        assert!(asm.bx.is_empty());
    }

    #[test]
    fn local_order_ignores_global_ids() {
        let mut g = PlacementGraph::new(Region::default());
        let ids = [inst(1000), inst(7)];
        for &id in &ids {
            g.add_instance(id, vec![net(3)]);
        }
        connect(&mut g, net(3), &ids);
        let asm = assemble(&g, &ids, &[net(3)]);
        assert_eq!(asm.matrix.nrows(), 2);
        assert_eq!(dense(&asm.matrix)[(0, 1)], -1.0);
    }
}
