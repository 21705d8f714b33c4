//! Potentially visible set precomputation for 2D worlds built from
//! integer wall segments: BSP construction, portal extraction and
//! leaf-graph PVS.
//!
//! ```no_run
//! use pvs2d::{Config, Tree};
//!
//! let segs = [0, 0, 10, 0, 1, 10, 0, 10, 10, 1, 10, 10, 0, 10, 1, 0, 10, 0, 0, 1];
//! let config = Config::default();
//! let mut tree = Tree::build(&segs, &config).unwrap();
//! tree.build_portals(&config).unwrap();
//! let graph = tree.build_leaf_graph();
//! let leaf = tree.find_leaf_of_point(5.0, 5.0);
//! let pvs = graph.get_leaf_pvs(leaf, &config).unwrap();
//! assert!(pvs.get(leaf.index()));
//! ```

pub mod bsp;
mod bitset;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
mod ids;
pub mod portals;
pub mod pvs;

pub use bitset::Bitset;
pub use bsp::{Child, Tree};
pub use config::Config;
pub use error::PvsError;
pub use graph::LeafGraph;
pub use ids::{LeafId, LineId, PortalId, SegId};
