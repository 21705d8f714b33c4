use crate::bitset::Bitset;
use crate::geometry::{raw_cross, side_of_point, Point, Side};
use crate::ids::LeafId;

use super::node::Child;
use super::Tree;

impl Tree {
    /// Descend the tree classifying `(x, y)` against each splitter in
    /// turn until a leaf is reached.
    pub fn find_leaf_of_point(&self, x: f64, y: f64) -> LeafId {
        let p = Point::new(x, y);
        let mut child = &self.root;
        loop {
            match child {
                Child::Leaf(id) => return *id,
                Child::Node(node) => {
                    let line = &self.lines[node.splitter.index()];
                    child = match side_of_point(line, p) {
                        Side::Left => &node.left,
                        Side::Right => &node.right,
                    };
                }
            }
        }
    }

    /// Every leaf the segment `a..b` passes through, splitting it at
    /// each splitter it crosses.
    pub fn find_leaves_of_segment(&self, a: (f64, f64), b: (f64, f64)) -> Bitset {
        let mut bits = Bitset::new(self.leaf_count as usize);
        self.collect_leaves(&self.root, Point::new(a.0, a.1), Point::new(b.0, b.1), &mut bits);
        bits
    }

    fn collect_leaves(&self, child: &Child, a: Point, b: Point, bits: &mut Bitset) {
        match child {
            Child::Leaf(id) => bits.set(id.index()),
            Child::Node(node) => {
                let line = &self.lines[node.splitter.index()];
                let ca = raw_cross(line, a);
                let cb = raw_cross(line, b);
                let a_left = ca > 0.0;
                let b_left = cb > 0.0;

                if a_left == b_left {
                    let next = if a_left { &node.left } else { &node.right };
                    self.collect_leaves(next, a, b, bits);
                } else {
                    let denom = cb - ca;
                    let s = -ca / denom;
                    let mid = Point::new(a.x + s * (b.x - a.x), a.y + s * (b.y - a.y));
                    let (left_pt, right_pt) = if a_left { (a, b) } else { (b, a) };
                    self.collect_leaves(&node.left, left_pt, mid, bits);
                    self.collect_leaves(&node.right, right_pt, mid, bits);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn two_rooms_with_doorway() -> Vec<i32> {
        // Two 10x10 rooms side by side, sharing a wall with a 4-unit
        // gap (transparent) in the middle as a doorway.
        vec![
            0, 0, 10, 0, 1, //
            10, 0, 10, 3, 1, //
            10, 3, 10, 7, 0, //
            10, 7, 10, 10, 1, //
            10, 10, 0, 10, 1, //
            0, 10, 0, 0, 1, //
            10, 0, 20, 0, 1, //
            20, 0, 20, 10, 1, //
            20, 10, 10, 10, 1,
        ]
    }

    #[test]
    fn point_location_distinguishes_rooms() {
        let config = Config::default();
        let tree = crate::bsp::Tree::build(&two_rooms_with_doorway(), &config).unwrap();
        let left_leaf = tree.find_leaf_of_point(5.0, 5.0);
        let right_leaf = tree.find_leaf_of_point(15.0, 5.0);
        assert_ne!(left_leaf.index(), right_leaf.index());
    }
}
