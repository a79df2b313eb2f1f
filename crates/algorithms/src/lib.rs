//! # urbmorph Algorithms
//!
//! Morphometric measurements of urban form.
//!
//! ## Available Algorithm Categories
//!
//! - **intensity**: frequency, covered/floor area ratio, elements in block,
//!   gross density, blocks count, courtyards

pub mod intensity;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::intensity::{
        blocks_count, connected_components, courtyards, covered_area_ratio, elements_in_block,
        floor_area_ratio, frequency, gross_density, neighbors_within_radius, AreaRatioParams,
        BlocksCount, BlocksCountParams, CourtyardParams, Courtyards, CoveredAreaRatio,
        ElementsInBlock, ElementsInBlockParams, FloorAreaRatio, Frequency, FrequencyParams,
        GrossDensity, GrossDensityParams, JoinedValue, PointIndex, RadiusNeighbor, SpatialIndex,
    };
    pub use urbmorph_core::prelude::*;
}
