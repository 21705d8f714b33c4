//! Potentially visible set computation: a frustum-cropped depth-first
//! search through the leaf adjacency graph, starting from every portal
//! adjacent to the query leaf.

mod frustum;

use log::trace;

use crate::bitset::Bitset;
use crate::config::Config;
use crate::error::{PvsError, Result};
use crate::graph::LeafGraph;
use crate::ids::{LeafId, PortalId};
use crate::portals::Portal;

use frustum::Frustum;

pub(crate) fn compute_pvs(graph: &LeafGraph, source: LeafId, config: &Config) -> Result<Bitset> {
    if graph.nodes[source.index()].oob {
        return Err(PvsError::OobLeaf(source));
    }

    let n = graph.nodes.len();
    let mut visible = Bitset::new(n);
    let mut visited = vec![false; n];

    visible.set(source.index());
    visited[source.index()] = true;

    let mut frustums: Vec<Frustum> = Vec::new();
    let edges = graph.nodes[source.index()].adj.clone();
    for edge in edges {
        visible.set(edge.neighbour.index());
        if visited[edge.neighbour.index()] {
            continue;
        }
        visited[edge.neighbour.index()] = true;
        descend(graph, edge.neighbour, edge.portal, &mut frustums, &mut visible, &mut visited, config);
        visited[edge.neighbour.index()] = false;
    }

    trace!("pvs of leaf {source}: {} visible leaf(es)", visible.count_visible());
    Ok(visible)
}

fn descend(
    graph: &LeafGraph,
    leaf: LeafId,
    entry_portal: PortalId,
    frustums: &mut Vec<Frustum>,
    visible: &mut Bitset,
    visited: &mut [bool],
    config: &Config,
) {
    let entry: Portal = graph.portals[entry_portal.index()].clone();
    let edges = graph.nodes[leaf.index()].adj.clone();

    for edge in edges {
        if edge.portal.index() == entry_portal.index() {
            continue;
        }

        let candidate = graph.portals[edge.portal.index()].clone();
        let candidate_line = &graph.lines[candidate.line.index()];

        let mut t_start = candidate.t_start;
        let mut t_end = candidate.t_end;
        let mut inside = true;
        for f in frustums.iter() {
            match f.crop(candidate_line, t_start, t_end, config.epsilon) {
                Some((a, b)) => {
                    t_start = a;
                    t_end = b;
                }
                None => {
                    inside = false;
                    break;
                }
            }
        }
        if !inside {
            continue;
        }

        visible.set(edge.neighbour.index());
        if visited[edge.neighbour.index()] {
            continue;
        }

        let next_frustum = Frustum::build(&entry, &candidate, &graph.lines);
        visited[edge.neighbour.index()] = true;
        frustums.push(next_frustum);
        descend(graph, edge.neighbour, edge.portal, frustums, visible, visited, config);
        frustums.pop();
        visited[edge.neighbour.index()] = false;
    }
}
