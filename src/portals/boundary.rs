use crate::error::{PvsError, Result};
use crate::ids::PortalId;

/// One link in a circular list of portals bounding the convex subspace
/// currently being descended into. `left` records which side of *this*
/// portal's own splitter the current subspace sits on — independent of
/// the node's own left/right split — so a leaf descent knows whether to
/// stamp `left_leaf` or `right_leaf` on the referenced `Portal`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoundaryEntry {
    pub portal: PortalId,
    pub left: bool,
    pub next: usize,
}

/// Append-only arena backing every boundary circular list built during
/// portal extraction. Entries are never freed; a handful of small
/// structs per recursion level is negligible for a batch precompute.
#[derive(Default)]
pub(crate) struct BoundaryArena {
    entries: Vec<BoundaryEntry>,
}

impl BoundaryArena {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, portal: PortalId, left: bool, next: usize) -> usize {
        let idx = self.entries.len();
        self.entries.push(BoundaryEntry { portal, left, next });
        idx
    }

    pub fn get(&self, idx: usize) -> BoundaryEntry {
        self.entries[idx]
    }

    pub fn set_next(&mut self, idx: usize, next: usize) {
        self.entries[idx].next = next;
    }

    /// Chain a contiguous run of fresh entries `(portal, left)` in
    /// order, returning `(first, last)` arena indices. Does not close
    /// the chain into a circle.
    pub fn push_chain(&mut self, items: &[(PortalId, bool)]) -> (usize, usize) {
        assert!(!items.is_empty(), "a portal tiling is never empty");
        let mut start = None;
        let mut prev: Option<usize> = None;
        for &(pid, left) in items {
            let idx = self.push(pid, left, usize::MAX);
            if let Some(p) = prev {
                self.set_next(p, idx);
            }
            start.get_or_insert(idx);
            prev = Some(idx);
        }
        (start.unwrap(), prev.unwrap())
    }

    /// Starting at `start`, follow `.next` links until finding the
    /// entry whose `.next` equals `target`.
    pub fn find_predecessor(&self, start: usize, target: usize) -> Result<usize> {
        let mut idx = start;
        for _ in 0..=self.entries.len() {
            if self.get(idx).next == target {
                return Ok(idx);
            }
            idx = self.get(idx).next;
        }
        Err(PvsError::GeometricInvariant(
            "boundary portal list is not circular as expected".into(),
        ))
    }
}
