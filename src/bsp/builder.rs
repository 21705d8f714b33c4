use std::collections::BTreeMap;

use log::{debug, trace};

use crate::config::Config;
use crate::error::{PvsError, Result};
use crate::geometry::{classify, collinear3, intersect_raw, IPoint, Line, LineId, SplitClass};
use crate::ids::{LeafId, SegId};

use super::node::{BspNode, Child};
use super::{Segment, Tree};

const MAX_DEPTH: usize = 1024;

pub(crate) fn build(segs_flat: &[i32], config: &Config) -> Result<Tree> {
    let (lines, mut segments) = ingest(segs_flat)?;
    debug!(
        "ingested {} segment(s) onto {} line(s)",
        segments.len(),
        lines.len()
    );

    let seg_ids: Vec<SegId> = (0..segments.len() as u32).map(SegId).collect();
    let mut alloc = LeafAllocator::new();
    let root = build_node(&lines, &mut segments, seg_ids, config, &mut alloc, 0)?;

    debug!("bsp tree built with {} leaves", alloc.count());

    Ok(Tree {
        lines,
        segments,
        leaf_count: alloc.count(),
        root,
        portals: Vec::new(),
    })
}

fn ingest(segs_flat: &[i32]) -> Result<(Vec<Line>, Vec<Segment>)> {
    if segs_flat.is_empty() {
        return Err(PvsError::InvalidInput("empty segment array".into()));
    }
    if segs_flat.len() % 5 != 0 {
        return Err(PvsError::InvalidInput(format!(
            "segment array length {} is not a multiple of 5",
            segs_flat.len()
        )));
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();

    for chunk in segs_flat.chunks_exact(5) {
        let (ax, ay, bx, by, opq) = (chunk[0], chunk[1], chunk[2], chunk[3], chunk[4]);
        let a = IPoint::new(ax, ay);
        let b = IPoint::new(bx, by);
        if a == b {
            return Err(PvsError::InvalidInput(format!(
                "zero-length segment at ({ax}, {ay})"
            )));
        }
        let opaque = opq != 0;

        let mut found: Option<(LineId, f64, f64)> = None;
        for (i, line) in lines.iter().enumerate() {
            if collinear3(a, line.a, line.b) && collinear3(b, line.a, line.b) {
                let (t_start, t_end) = line.params_of(a, b);
                found = Some((LineId(i as u32), t_start, t_end));
                break;
            }
        }

        let (line_id, t_start, t_end) = match found {
            Some(v) => v,
            None => {
                let id = LineId(lines.len() as u32);
                lines.push(Line::new(a, b));
                (id, 0.0, 1.0)
            }
        };

        segments.push(Segment {
            line: line_id,
            t_start,
            t_end,
            opaque,
        });
    }

    merge_coincident(&mut segments)?;
    Ok((lines, segments))
}

/// Merge overlapping same-opacity segments on the same line; error if
/// overlapping segments disagree on opacity.
fn merge_coincident(segments: &mut Vec<Segment>) -> Result<()> {
    let mut by_line: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, s) in segments.iter().enumerate() {
        by_line.entry(s.line.0).or_default().push(i);
    }

    let mut keep = vec![true; segments.len()];
    for idxs in by_line.into_values() {
        let mut idxs = idxs;
        idxs.sort_by(|&a, &b| {
            segments[a]
                .t_start
                .partial_cmp(&segments[b].t_start)
                .unwrap()
        });
        let mut cur = idxs[0];
        for &next in &idxs[1..] {
            if segments[next].t_start < segments[cur].t_end {
                if segments[next].opaque != segments[cur].opaque {
                    return Err(PvsError::InvalidInput(
                        "overlapping input segments on the same line disagree on opacity".into(),
                    ));
                }
                segments[cur].t_end = segments[cur].t_end.max(segments[next].t_end);
                keep[next] = false;
            } else {
                cur = next;
            }
        }
    }

    let mut i = 0;
    segments.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
    Ok(())
}

struct LeafAllocator {
    next: u32,
}

impl LeafAllocator {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn alloc(&mut self) -> LeafId {
        let id = LeafId(self.next);
        self.next += 1;
        id
    }

    fn count(&self) -> u32 {
        self.next
    }
}

fn choose_partition(
    lines: &[Line],
    segments: &[Segment],
    seg_ids: &[SegId],
    eps: f64,
) -> Result<LineId> {
    if seg_ids.is_empty() {
        return Err(PvsError::InvalidInput(
            "cannot choose a partition with no segments".into(),
        ));
    }

    let mut best: Option<(usize, LineId)> = None;
    for &cand in seg_ids {
        let cand_line_id = segments[cand.index()].line;
        let cand_line = &lines[cand_line_id.index()];

        let mut splits = 0usize;
        for &other in seg_ids {
            let other_seg = &segments[other.index()];
            let other_line = &lines[other_seg.line.index()];
            let (class, _) = classify(
                cand_line_id,
                cand_line,
                other_seg.line,
                other_line,
                other_seg.t_start,
                other_seg.t_end,
                eps,
            );
            if class.is_split() {
                splits += 1;
            }
        }

        match &best {
            None => best = Some((splits, cand_line_id)),
            Some((best_splits, _)) if splits < *best_splits => best = Some((splits, cand_line_id)),
            _ => {}
        }
    }

    Ok(best.unwrap().1)
}

fn split_segment(seg: &Segment, t: f64, class: SplitClass) -> (Segment, Segment) {
    let near = Segment {
        line: seg.line,
        t_start: seg.t_start,
        t_end: t,
        opaque: seg.opaque,
    };
    let far = Segment {
        line: seg.line,
        t_start: t,
        t_end: seg.t_end,
        opaque: seg.opaque,
    };
    match class {
        SplitClass::SFl => (far, near),
        SplitClass::SFr => (near, far),
        _ => unreachable!("split_segment called with a non-split class"),
    }
}

fn build_node(
    lines: &[Line],
    segments: &mut Vec<Segment>,
    seg_ids: Vec<SegId>,
    config: &Config,
    alloc: &mut LeafAllocator,
    depth: usize,
) -> Result<Child> {
    if depth > MAX_DEPTH {
        return Err(PvsError::GeometricInvariant(format!(
            "bsp recursion exceeded {MAX_DEPTH} levels; input is likely degenerate"
        )));
    }

    let splitter_id = choose_partition(lines, segments, &seg_ids, config.epsilon)?;
    let splitter = lines[splitter_id.index()];
    trace!("depth {depth}: chose splitter line {splitter_id} from {} segs", seg_ids.len());

    let mut on_line = Vec::new();
    let mut left_ids = Vec::new();
    let mut right_ids = Vec::new();

    for sid in seg_ids {
        let seg = segments[sid.index()].clone();
        let feature_line = lines[seg.line.index()];
        let (class, t_cross) = classify(
            splitter_id,
            &splitter,
            seg.line,
            &feature_line,
            seg.t_start,
            seg.t_end,
            config.epsilon,
        );
        match class {
            SplitClass::Col => on_line.push(sid),
            c if c.is_left() => left_ids.push(sid),
            c if c.is_right() => right_ids.push(sid),
            c if c.is_split() => {
                let t = t_cross.expect("split classification must carry a crossing parameter");
                let (left_part, right_part) = split_segment(&seg, t, c);
                let left_sid = SegId(segments.len() as u32);
                segments.push(left_part);
                let right_sid = SegId(segments.len() as u32);
                segments.push(right_part);
                left_ids.push(left_sid);
                right_ids.push(right_sid);
            }
            _ => unreachable!(),
        }
    }

    let mut left_child = if left_ids.is_empty() {
        Child::Leaf(alloc.alloc())
    } else {
        build_node(lines, segments, left_ids, config, alloc, depth + 1)?
    };
    let mut right_child = if right_ids.is_empty() {
        Child::Leaf(alloc.alloc())
    } else {
        build_node(lines, segments, right_ids, config, alloc, depth + 1)?
    };

    if let Child::Node(n) = &mut left_child {
        crop_split_segs(n, lines, splitter_id, &splitter, true)?;
    }
    if let Child::Node(n) = &mut right_child {
        crop_split_segs(n, lines, splitter_id, &splitter, false)?;
    }

    Ok(Child::Node(Box::new(BspNode {
        splitter: splitter_id,
        left: left_child,
        right: right_child,
        on_line,
        t_split_start: f64::NEG_INFINITY,
        t_split_end: f64::INFINITY,
        portals: Vec::new(),
    })))
}

/// Narrow `node`'s (and every interior descendant's) splitter extent
/// against an ancestor splitter `crop_line`, on the `left`/`right` side
/// that ancestor resolved this subtree onto.
fn crop_split_segs(
    node: &mut BspNode,
    lines: &[Line],
    crop_line_id: LineId,
    crop_line: &Line,
    left: bool,
) -> Result<()> {
    if node.splitter == crop_line_id {
        return Err(PvsError::GeometricInvariant(
            "splitter line reused as its own descendant's splitter".into(),
        ));
    }

    let node_line = lines[node.splitter.index()];
    let (numer, denom) = intersect_raw(crop_line, &node_line);
    if denom != 0 {
        let t = numer as f64 / denom as f64;
        let narrows_end = (left && denom > 0) || (!left && denom < 0);
        if narrows_end {
            node.t_split_end = node.t_split_end.min(t);
        } else {
            node.t_split_start = node.t_split_start.max(t);
        }
    }

    if let Child::Node(n) = &mut node.left {
        crop_split_segs(n, lines, crop_line_id, crop_line, left)?;
    }
    if let Child::Node(n) = &mut node.right {
        crop_split_segs(n, lines, crop_line_id, crop_line, left)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_room() -> Vec<i32> {
        // A single closed 10x10 opaque room, four walls.
        vec![
            0, 0, 10, 0, 1, //
            10, 0, 10, 10, 1, //
            10, 10, 0, 10, 1, //
            0, 10, 0, 0, 1,
        ]
    }

    #[test]
    fn single_room_builds_a_tree_with_an_interior_leaf() {
        let config = Config::default();
        let tree = build(&square_room(), &config).unwrap();
        assert!(tree.leaf_count >= 1);
        assert_eq!(tree.lines.len(), 4);
    }

    #[test]
    fn rejects_malformed_length() {
        let config = Config::default();
        let err = build(&[0, 0, 1, 1], &config).unwrap_err();
        assert!(matches!(err, PvsError::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_length_segment() {
        let config = Config::default();
        let err = build(&[0, 0, 0, 0, 1], &config).unwrap_err();
        assert!(matches!(err, PvsError::InvalidInput(_)));
    }

    #[test]
    fn merges_overlapping_same_opacity_segments() {
        let config = Config::default();
        let segs = vec![
            0, 0, 10, 0, 1, //
            5, 0, 15, 0, 1, //
            15, 0, 15, 10, 1, //
            15, 10, 0, 10, 1, //
            0, 10, 0, 0, 1,
        ];
        let tree = build(&segs, &config).unwrap();
        assert!(tree.leaf_count >= 1);
        // the two overlapping bottom-edge pieces merged into one line segment
        assert_eq!(tree.lines.len(), 4);
    }

    #[test]
    fn rejects_conflicting_opacity_overlap() {
        let config = Config::default();
        let segs = vec![
            0, 0, 10, 0, 1, //
            5, 0, 15, 0, 0,
        ];
        let err = build(&segs, &config).unwrap_err();
        assert!(matches!(err, PvsError::InvalidInput(_)));
    }
}
