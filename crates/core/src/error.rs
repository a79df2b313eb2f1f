//! Error types for urbmorph

use crate::vector::ObjectId;
use thiserror::Error;

/// Main error type for urbmorph operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Identifiers are not the consecutive range 0..n: position {position} holds id {found}")]
    NonConsecutiveIds { position: usize, found: ObjectId },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Feature {id} has no attribute '{name}'")]
    MissingAttribute { id: ObjectId, name: String },

    #[error("Feature {id} attribute '{name}' is unusable: {reason}")]
    InvalidAttribute {
        id: ObjectId,
        name: String,
        reason: String,
    },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for urbmorph operations
pub type Result<T> = std::result::Result<T, Error>;
