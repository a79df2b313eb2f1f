//! # urbmorph Core
//!
//! Core types and traits for the urbmorph urban-morphology library.
//!
//! This crate provides:
//! - `FeatureCollection`: ordered object sets with geometry and attributes
//! - `Contiguity`: keyed adjacency relations (Queen, k-th order)
//! - `GeometryOps`: the geometry operations the measurements consume
//! - `Algorithm`: the common shape of every measured character

pub mod contiguity;
pub mod error;
pub mod vector;

pub use contiguity::{Contiguity, Neighbors};
pub use error::{Error, Result};
pub use vector::{AttributeKey, AttributeValue, Feature, FeatureCollection, GeoOps, GeometryOps, ObjectId};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::contiguity::{Contiguity, Neighbors};
    pub use crate::error::{Error, Result};
    pub use crate::vector::{
        AttributeKey, AttributeValue, Feature, FeatureCollection, GeoOps, GeometryOps, ObjectId,
    };
    pub use crate::Algorithm;
}

/// A morphometric character measured over feature collections.
///
/// Implementors are unit structs that forward to the free function of the
/// same name. `Params::default()` names the conventional columns (`uID`,
/// `bID`, `area`, ...) and the usual radius or contiguity order.
pub trait Algorithm {
    /// Collections the character is measured on, plus any supplied contiguity
    type Input;
    /// One value per object, or per joined row for the area ratios
    type Output;
    /// Column names and numeric settings
    type Params: Default;

    fn name(&self) -> &'static str;

    /// One-line summary of what is measured
    fn description(&self) -> &'static str;

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output>;

    /// Measure with the conventional columns and settings
    fn execute_default(&self, input: Self::Input) -> Result<Self::Output> {
        self.execute(input, Self::Params::default())
    }
}
