use serde::{Deserialize, Serialize};

/// A byte-per-leaf visibility mask: `leaf i` is set iff entry `i` is
/// nonzero. A byte rather than a single bit per leaf, matching the
/// PVS output shape described for host consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitset(Vec<u8>);

impl Bitset {
    pub fn new(len: usize) -> Self {
        Self(vec![0u8; len])
    }

    pub fn set(&mut self, i: usize) {
        self.0[i] = 1;
    }

    pub fn get(&self, i: usize) -> bool {
        self.0[i] != 0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn count_visible(&self) -> usize {
        self.0.iter().filter(|&&b| b != 0).count()
    }
}
