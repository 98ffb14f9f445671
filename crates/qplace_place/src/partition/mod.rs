//! Building blocks for recursive quadrisection.
//!
//! A partition step sorts the instances of a region along one axis, hands the
//! lower half to one sub-region and the upper half to the other, and builds a
//! self-contained sub-graph for each half in which every connection leaving
//! the half is replaced by a virtual pad on the sub-region boundary.

mod assign;
mod contain;

pub use assign::{assign, AxisOrder};
pub use contain::build_subgraph;

/// The axis a region is cut across.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CutAxis {
    /// A vertical cut line; halves are left and right.
    X,
    /// A horizontal cut line; halves are bottom and top.
    Y,
}

/// Which half of a cut a sub-region is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CutSide {
    /// Left of a vertical cut, or below a horizontal one.
    Lower,
    /// Right of a vertical cut, or above a horizontal one.
    Upper,
}

/// A cut axis together with the side a sub-region lies on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cut {
    /// Axis of the cut.
    pub axis: CutAxis,
    /// Side of the sub-region.
    pub side: CutSide,
}

impl Cut {
    /// Creates a cut descriptor.
    pub fn new(axis: CutAxis, side: CutSide) -> Self {
        Self { axis, side }
    }
}
