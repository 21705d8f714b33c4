//! Leaf adjacency graph: one node per BSP leaf, an edge for every
//! transparent portal, and an out-of-bounds flag propagated from any
//! portal that opens onto the unbounded exterior.

use log::debug;

use crate::bsp::{Child, Tree};
use crate::config::Config;
use crate::error::Result;
use crate::geometry::Line;
use crate::ids::{LeafId, PortalId};
use crate::portals::Portal;

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub neighbour: LeafId,
    pub portal: PortalId,
}

#[derive(Debug, Default)]
pub struct LeafNode {
    pub oob: bool,
    pub adj: Vec<Edge>,
}

/// The leaf adjacency graph, self-contained: it carries its own copies
/// of the line and portal tables so a `LeafGraph` can answer PVS
/// queries without the `Tree` that produced it staying alive.
pub struct LeafGraph {
    pub nodes: Vec<LeafNode>,
    pub(crate) lines: Vec<Line>,
    pub(crate) portals: Vec<Portal>,
}

impl LeafGraph {
    pub fn build(tree: &Tree) -> Self {
        let mut nodes: Vec<LeafNode> = (0..tree.leaf_count as usize)
            .map(|_| LeafNode::default())
            .collect();

        walk(&tree.root, &mut nodes, &tree.portals);

        seed_and_propagate_oob(&mut nodes, &tree.portals);

        debug!(
            "leaf graph: {} leaves, {} oob",
            nodes.len(),
            nodes.iter().filter(|n| n.oob).count()
        );

        LeafGraph {
            nodes,
            lines: tree.lines.clone(),
            portals: tree.portals.clone(),
        }
    }

    /// Compute the byte-mask PVS for `leaf`. Errors if `leaf` was marked
    /// out-of-bounds during graph construction.
    pub fn get_leaf_pvs(&self, leaf: LeafId, config: &Config) -> Result<crate::bitset::Bitset> {
        crate::pvs::compute_pvs(self, leaf, config)
    }
}

fn walk(child: &Child, nodes: &mut [LeafNode], portals: &[Portal]) {
    match child {
        Child::Leaf(_) => {}
        Child::Node(node) => {
            for &pid in &node.portals {
                let portal = &portals[pid.index()];
                if portal.opaque {
                    continue;
                }
                if let (Some(l), Some(r)) = (portal.left_leaf, portal.right_leaf) {
                    nodes[l.index()].adj.push(Edge { neighbour: r, portal: pid });
                    nodes[r.index()].adj.push(Edge { neighbour: l, portal: pid });
                }
            }
            walk(&node.left, nodes, portals);
            walk(&node.right, nodes, portals);
        }
    }
}

fn seed_and_propagate_oob(nodes: &mut [LeafNode], portals: &[Portal]) {
    let mut stack = Vec::new();
    for portal in portals {
        if portal.opaque {
            continue;
        }
        if portal.t_start.is_infinite() || portal.t_end.is_infinite() {
            if let (Some(l), Some(r)) = (portal.left_leaf, portal.right_leaf) {
                for leaf in [l, r] {
                    if !nodes[leaf.index()].oob {
                        nodes[leaf.index()].oob = true;
                        stack.push(leaf);
                    }
                }
            }
        }
    }

    while let Some(leaf) = stack.pop() {
        let adj = nodes[leaf.index()].adj.clone();
        for edge in adj {
            if !nodes[edge.neighbour.index()].oob {
                nodes[edge.neighbour.index()].oob = true;
                stack.push(edge.neighbour);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn open_world_propagates_oob_through_transparent_edges() {
        // A single opaque wall with no enclosing room: the whole plane
        // is one unbounded, out-of-bounds leaf.
        let segs = vec![0, 0, 10, 0, 1];
        let config = Config::default();
        let mut tree = crate::bsp::Tree::build(&segs, &config).unwrap();
        tree.build_portals(&config).unwrap();
        let graph = tree.build_leaf_graph();
        assert!(graph.nodes.iter().any(|n| n.oob));
    }
}
