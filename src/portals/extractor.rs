use log::trace;

use crate::bsp::{BspNode, Child, Segment, Tree};
use crate::config::Config;
use crate::error::{PvsError, Result};
use crate::geometry::{classify, Line, LineId, SplitClass};
use crate::ids::{LeafId, PortalId, SegId};

use super::boundary::BoundaryArena;
use super::Portal;

pub(crate) fn build_portals(tree: &mut Tree, config: &Config) -> Result<()> {
    let mut boundary = BoundaryArena::new();
    let lines = std::mem::take(&mut tree.lines);
    let segments = std::mem::take(&mut tree.segments);
    let mut portals = std::mem::take(&mut tree.portals);
    let mut root = std::mem::replace(&mut tree.root, Child::Leaf(LeafId(0)));

    let result = descend(&mut root, &lines, &segments, &mut portals, &mut boundary, None, config);

    tree.lines = lines;
    tree.segments = segments;
    tree.portals = portals;
    tree.root = root;

    result
}

fn descend(
    child: &mut Child,
    lines: &[Line],
    segments: &[Segment],
    portals: &mut Vec<Portal>,
    boundary: &mut BoundaryArena,
    adjacent_head: Option<usize>,
    config: &Config,
) -> Result<()> {
    match child {
        Child::Leaf(leaf_id) => {
            if let Some(head) = adjacent_head {
                stamp_leaf(portals, boundary, head, *leaf_id)?;
            }
            Ok(())
        }
        Child::Node(node) => {
            process_node(node, lines, segments, portals, boundary, adjacent_head, config)
        }
    }
}

fn stamp_leaf(
    portals: &mut [Portal],
    boundary: &BoundaryArena,
    head: usize,
    leaf: LeafId,
) -> Result<()> {
    let mut idx = head;
    let mut guard = 0usize;
    loop {
        let entry = boundary.get(idx);
        let portal = &mut portals[entry.portal.index()];
        if entry.left {
            portal.left_leaf = Some(leaf);
        } else {
            portal.right_leaf = Some(leaf);
        }
        idx = entry.next;
        guard += 1;
        if idx == head {
            break;
        }
        if guard > 1_000_000 {
            return Err(PvsError::GeometricInvariant(
                "boundary portal list failed to close while stamping a leaf".into(),
            ));
        }
    }
    Ok(())
}

fn process_node(
    node: &mut BspNode,
    lines: &[Line],
    segments: &[Segment],
    portals: &mut Vec<Portal>,
    boundary: &mut BoundaryArena,
    adjacent_head: Option<usize>,
    config: &Config,
) -> Result<()> {
    let splitter_id = node.splitter;
    let splitter = lines[splitter_id.index()];

    let (first_l, first_r) =
        split_boundary(lines, portals, boundary, adjacent_head, splitter_id, &splitter, config)?;

    let own = sweep_portals(&node.on_line, segments, node.t_split_start, node.t_split_end, config.epsilon);
    trace!("node on line {splitter_id}: {} own portal(s)", own.len());

    let own_portal_ids: Vec<PortalId> = own
        .into_iter()
        .map(|(t_start, t_end, opaque)| {
            let pid = PortalId(portals.len() as u32);
            portals.push(Portal {
                line: splitter_id,
                t_start,
                t_end,
                opaque,
                left_leaf: None,
                right_leaf: None,
            });
            pid
        })
        .collect();

    // Right subspace: own portals in decreasing-t order, `left = false`.
    let right_items: Vec<(PortalId, bool)> =
        own_portal_ids.iter().rev().map(|&pid| (pid, false)).collect();
    let (right_start, right_end) = boundary.push_chain(&right_items);
    let right_head = splice_side(boundary, right_start, right_end, first_r, first_l)?;
    descend(&mut node.right, lines, segments, portals, boundary, Some(right_head), config)?;

    // Left subspace: own portals in increasing-t order, `left = true`.
    let left_items: Vec<(PortalId, bool)> =
        own_portal_ids.iter().map(|&pid| (pid, true)).collect();
    let (left_start, left_end) = boundary.push_chain(&left_items);
    let left_head = splice_side(boundary, left_start, left_end, first_l, first_r)?;
    descend(&mut node.left, lines, segments, portals, boundary, Some(left_head), config)?;

    node.portals = own_portal_ids;
    Ok(())
}

/// Walk the inherited boundary list (if any), classifying each entry
/// against this node's splitter and splitting any that straddle it.
/// Returns the arena indices where the left run and right run begin.
fn split_boundary(
    lines: &[Line],
    portals: &mut Vec<Portal>,
    boundary: &mut BoundaryArena,
    adjacent_head: Option<usize>,
    splitter_id: LineId,
    splitter: &Line,
    config: &Config,
) -> Result<(Option<usize>, Option<usize>)> {
    let head = match adjacent_head {
        Some(h) => h,
        None => return Ok((None, None)),
    };

    let mut first_l: Option<usize> = None;
    let mut first_r: Option<usize> = None;
    let mut prside: i8 = -1;
    let mut cur = head;
    let mut loop_count = 0u8;

    loop {
        let entry = boundary.get(cur);
        let next_idx = entry.next;
        let portal = portals[entry.portal.index()].clone();
        let feature_line = lines[portal.line.index()];

        let (class, t_cross) = classify(
            splitter_id,
            splitter,
            portal.line,
            &feature_line,
            portal.t_start,
            portal.t_end,
            config.epsilon,
        );

        match class {
            SplitClass::Col => {
                return Err(PvsError::GeometricInvariant(
                    "a boundary portal lies on the interior splitter".into(),
                ))
            }
            c if c.is_left() => {
                if prside == 0 {
                    first_l = Some(cur);
                }
                prside = 1;
            }
            c if c.is_right() => {
                if prside == 1 {
                    first_r = Some(cur);
                }
                prside = 0;
            }
            c if c.is_split() => {
                let t = t_cross.expect("split classification must carry a crossing parameter");
                let mut new_portal = portal.clone();
                if entry.left {
                    new_portal.t_start = t;
                    portals[entry.portal.index()].t_end = t;
                } else {
                    new_portal.t_end = t;
                    portals[entry.portal.index()].t_start = t;
                }
                let new_pid = PortalId(portals.len() as u32);
                portals.push(new_portal);
                let new_idx = boundary.push(new_pid, entry.left, next_idx);
                boundary.set_next(cur, new_idx);

                if prside != -1 {
                    if prside == 1 {
                        first_r = Some(new_idx);
                    } else {
                        first_l = Some(new_idx);
                    }
                    prside = 1 - prside;
                }
            }
            _ => unreachable!(),
        }

        cur = next_idx;
        if next_idx == head {
            loop_count += 1;
            if loop_count == 2 {
                break;
            }
        }
    }

    if first_l.is_none() && first_r.is_none() {
        if prside == 0 {
            first_r = Some(head);
        } else {
            first_l = Some(head);
        }
    }

    Ok((first_l, first_r))
}

/// Splice the own-portal chain `[own_start, own_end]` together with
/// whichever run of the inherited boundary belongs to this side
/// (`first_this`..predecessor-of-`first_other`), returning the new
/// circular list's head.
fn splice_side(
    boundary: &mut BoundaryArena,
    own_start: usize,
    own_end: usize,
    first_this: Option<usize>,
    first_other: Option<usize>,
) -> Result<usize> {
    match first_this {
        None => {
            boundary.set_next(own_end, own_start);
            Ok(own_start)
        }
        Some(ft) => {
            let pred = match first_other {
                None => boundary.find_predecessor(ft, ft)?,
                Some(fo) => boundary.find_predecessor(ft, fo)?,
            };
            boundary.set_next(pred, own_start);
            boundary.set_next(own_end, ft);
            Ok(own_start)
        }
    }
}

/// Sweep the opaque on-line segments over `[t_split_start, t_split_end]`
/// and emit alternating opaque/transparent tiles covering the whole
/// extent. Equal-position events order closings before openings.
fn sweep_portals(
    on_line: &[SegId],
    segments: &[Segment],
    t_split_start: f64,
    t_split_end: f64,
    eps: f64,
) -> Vec<(f64, f64, bool)> {
    #[derive(Clone, Copy)]
    struct Event {
        p: f64,
        d: i8,
    }

    let mut events = Vec::new();
    for &sid in on_line {
        let seg = &segments[sid.index()];
        if seg.opaque {
            events.push(Event { p: seg.t_start, d: 1 });
            events.push(Event { p: seg.t_end, d: -1 });
        }
    }
    events.push(Event { p: t_split_start, d: -1 });
    events.push(Event { p: t_split_end, d: 1 });

    events.sort_by(|a, b| {
        if (a.p - b.p).abs() < eps {
            a.d.cmp(&b.d)
        } else {
            a.p.partial_cmp(&b.p).unwrap()
        }
    });

    let mut tiles = Vec::new();
    let mut coverage: i32 = 1;
    let mut prev: Option<f64> = None;
    let n = events.len();

    for (i, ev) in events.iter().enumerate() {
        if i == 0 && ev.d == 1 {
            prev = Some(ev.p);
        }
        if i == n - 1 && ev.d == -1 {
            let start = prev.unwrap_or(ev.p);
            tiles.push((start, ev.p, true));
            break;
        }

        if ev.d == 1 {
            if coverage == 0 {
                if let Some(start) = prev {
                    tiles.push((start, ev.p, false));
                }
                prev = Some(ev.p);
            }
            coverage += 1;
        } else {
            if coverage == 1 {
                match prev {
                    None => {
                        prev = Some(ev.p);
                        coverage -= 1;
                        continue;
                    }
                    Some(start) => {
                        tiles.push((start, ev.p, true));
                        prev = Some(ev.p);
                    }
                }
            }
            coverage -= 1;
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_of_fully_opaque_span_is_one_opaque_tile() {
        let segments = vec![Segment {
            line: LineId(0),
            t_start: 0.0,
            t_end: 1.0,
            opaque: true,
        }];
        let on_line = vec![SegId(0)];
        let tiles = sweep_portals(&on_line, &segments, 0.0, 1.0, 0.0625);
        assert_eq!(tiles, vec![(0.0, 1.0, true)]);
    }

    #[test]
    fn sweep_with_no_opaque_segments_is_one_transparent_tile() {
        let segments: Vec<Segment> = Vec::new();
        let tiles = sweep_portals(&[], &segments, 0.0, 1.0, 0.0625);
        assert_eq!(tiles, vec![(0.0, 1.0, false)]);
    }

    #[test]
    fn sweep_with_a_gap_produces_three_tiles() {
        let segments = vec![
            Segment { line: LineId(0), t_start: 0.0, t_end: 0.3, opaque: true },
            Segment { line: LineId(0), t_start: 0.7, t_end: 1.0, opaque: true },
        ];
        let on_line = vec![SegId(0), SegId(1)];
        let tiles = sweep_portals(&on_line, &segments, 0.0, 1.0, 0.0625);
        assert_eq!(
            tiles,
            vec![(0.0, 0.3, true), (0.3, 0.7, false), (0.7, 1.0, true)]
        );
    }
}
