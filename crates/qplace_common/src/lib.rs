//! Shared foundational types used across the qplace workspace.
//!
//! This crate provides the integer database geometry ([`Point`], [`Rect`]),
//! the single-precision placement [`Region`], and the common result types.

#![warn(missing_docs)]

pub mod geom;
pub mod result;

pub use geom::{Point, Rect, Region};
pub use result::{InternalError, PlaceResult};
