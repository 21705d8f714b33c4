//! Integer-exact geometry primitives: points, directed lines and the
//! nine-way split classification the BSP builder and portal extractor
//! both drive off of.

mod classify;
mod line;
mod point;

pub use classify::{classify, SplitClass};
pub use line::{collinear3, intersect_raw, raw_cross, side_of_point, Line, Side};
pub use point::{IPoint, Point};

pub use crate::ids::LineId;
