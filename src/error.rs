//! Error taxonomy for the pvs2d pipeline.

use thiserror::Error;

use crate::ids::LeafId;

#[derive(Debug, Error)]
pub enum PvsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("geometric invariant violated: {0}")]
    GeometricInvariant(String),

    #[error("leaf {0} is out of bounds")]
    OobLeaf(LeafId),
}

pub type Result<T> = std::result::Result<T, PvsError>;
