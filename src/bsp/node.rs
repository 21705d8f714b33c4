use crate::geometry::LineId;
use crate::ids::{LeafId, PortalId, SegId};

/// Either an interior node or a terminal convex leaf.
#[derive(Debug)]
pub enum Child {
    Leaf(LeafId),
    Node(Box<BspNode>),
}

/// An interior BSP node: a splitter line, the segments lying on it, the
/// extent of the splitter actually carved out by ancestors, and (once
/// `portals::build_portals` has run) the portals that tile that extent.
#[derive(Debug)]
pub struct BspNode {
    pub splitter: LineId,
    pub left: Child,
    pub right: Child,
    pub on_line: Vec<SegId>,
    pub t_split_start: f64,
    pub t_split_end: f64,
    pub portals: Vec<PortalId>,
}
