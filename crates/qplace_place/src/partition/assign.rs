//! Splitting an instance set into two halves along one axis.

use std::cmp::Ordering;

use crate::graph::PlacementGraph;
use crate::ids::InstanceId;

use super::CutAxis;

/// Orders instances by their current coordinates along one axis.
///
/// Ties on the primary coordinate fall back to the other coordinate, then to
/// the instance id, so the order is total and deterministic.
#[derive(Clone, Copy)]
pub struct AxisOrder<'g> {
    graph: &'g PlacementGraph,
    axis: CutAxis,
}

impl<'g> AxisOrder<'g> {
    /// Creates an ordering over `graph` along `axis`.
    pub fn new(graph: &'g PlacementGraph, axis: CutAxis) -> Self {
        Self { graph, axis }
    }

    fn key(&self, id: InstanceId) -> (f32, f32) {
        let (x, y) = self.graph.location(id).unwrap_or((f32::NAN, f32::NAN));
        match self.axis {
            CutAxis::X => (x, y),
            CutAxis::Y => (y, x),
        }
    }

    /// Compares two instances.
    pub fn compare(&self, a: InstanceId, b: InstanceId) -> Ordering {
        let (ka0, ka1) = self.key(a);
        let (kb0, kb1) = self.key(b);
        ka0.total_cmp(&kb0)
            .then_with(|| ka1.total_cmp(&kb1))
            .then_with(|| a.cmp(&b))
    }
}

/// Splits `instances` into (lower, upper) halves along `axis`.
///
/// The lower half receives `floor(len / 2)` instances, so a single instance
/// always lands in the upper half.
pub fn assign(
    graph: &PlacementGraph,
    instances: &[InstanceId],
    axis: CutAxis,
) -> (Vec<InstanceId>, Vec<InstanceId>) {
    let order = AxisOrder::new(graph, axis);
    let mut sorted = instances.to_vec();
    sorted.sort_by(|&a, &b| order.compare(a, b));
    let upper = sorted.split_off(sorted.len() / 2);
    (sorted, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NetId;
    use qplace_common::Region;

    fn graph(points: &[(u32, f32, f32)]) -> PlacementGraph {
        let mut g = PlacementGraph::new(Region::new(0.0, 0.0, 100.0, 100.0));
        for &(id, x, y) in points {
            let id = InstanceId::from_raw(id);
            g.add_instance(id, vec![NetId::from_raw(0)]);
            g.set_location(id, x, y).unwrap();
        }
        g
    }

    fn ids(raw: &[u32]) -> Vec<InstanceId> {
        raw.iter().copied().map(InstanceId::from_raw).collect()
    }

    #[test]
    fn splits_by_x() {
        let g = graph(&[(0, 90.0, 0.0), (1, 10.0, 0.0), (2, 50.0, 0.0), (3, 20.0, 0.0)]);
        let (lower, upper) = assign(&g, &ids(&[0, 1, 2, 3]), CutAxis::X);
        assert_eq!(lower, ids(&[1, 3]));
        assert_eq!(upper, ids(&[2, 0]));
    }

    #[test]
    fn splits_by_y() {
        let g = graph(&[(0, 0.0, 5.0), (1, 0.0, 1.0), (2, 0.0, 3.0)]);
        let (lower, upper) = assign(&g, &ids(&[0, 1, 2]), CutAxis::Y);
        assert_eq!(lower, ids(&[1]));
        assert_eq!(upper, ids(&[2, 0]));
    }

    #[test]
    fn ties_break_on_other_axis_then_id() {
        let g = graph(&[(5, 10.0, 2.0), (3, 10.0, 1.0), (4, 10.0, 1.0), (1, 10.0, 9.0)]);
        let order = AxisOrder::new(&g, CutAxis::X);
        let mut all = ids(&[5, 3, 4, 1]);
        all.sort_by(|&a, &b| order.compare(a, b));
        assert_eq!(all, ids(&[3, 4, 5, 1]));
    }

    #[test]
    fn odd_counts_favour_upper_half() {
        let g = graph(&[(0, 1.0, 0.0)]);
        let (lower, upper) = assign(&g, &ids(&[0]), CutAxis::X);
        assert!(lower.is_empty());
        assert_eq!(upper, ids(&[0]));

        let (lower, upper) = assign(&g, &[], CutAxis::X);
        assert!(lower.is_empty() && upper.is_empty());
    }
}
