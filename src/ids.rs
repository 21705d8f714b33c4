//! Arena-index newtypes. The tree owns all geometry and topology in flat
//! `Vec`s; every cross-reference between nodes, segments, lines and
//! portals is one of these rather than a pointer.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(LineId);
arena_id!(SegId);
arena_id!(LeafId);
arena_id!(PortalId);
