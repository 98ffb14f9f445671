//! Opaque ID newtypes for placement entities.
//!
//! [`InstanceId`], [`PadId`], [`NetId`] and [`CellId`] are thin `u32`
//! wrappers. Instances and pads live in separate id spaces; a net endpoint
//! is named by the tagged [`NodeId`] so the two can never be confused.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// A movable instance in a placement graph.
    ///
    /// Sub-graphs built during partitioning reuse the global graph's ids.
    InstanceId
);

define_id!(
    /// A fixed pad in a placement graph. Local to the graph that owns it.
    PadId
);

define_id!(
    /// A net, numbered densely over the design's nets.
    NetId
);

define_id!(
    /// An instance handle in the chip database.
    CellId
);

/// One endpoint of a net: either a movable instance or a fixed pad.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeId {
    /// A movable instance.
    Instance(InstanceId),
    /// A fixed pad.
    Pad(PadId),
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Instance(id) => write!(f, "inst{id}"),
            NodeId::Pad(id) => write!(f, "pad{id}"),
        }
    }
}
