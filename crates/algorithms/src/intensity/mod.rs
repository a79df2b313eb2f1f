//! Intensity characters of urban form
//!
//! Per-feature measurements over buildings, plots, blocks and tessellation cells:
//! - **Frequency**: features within a radius
//! - **Covered / floor area ratio**: paired areas joined on an id column
//! - **Elements in block**: features per block, optionally per unit area
//! - **Gross density / blocks count**: aggregates over a k-order neighborhood
//! - **Courtyards**: holes in the merged outline of touching features

mod courtyards;
mod group;
mod neighborhood;
mod radius;
mod ratio;

pub use courtyards::{connected_components, courtyards, courtyards_with, CourtyardParams, Courtyards};
pub use group::{elements_in_block, ElementsInBlock, ElementsInBlockParams};
pub use neighborhood::{
    blocks_count, blocks_count_with, gross_density, gross_density_with, BlocksCount,
    BlocksCountParams, GrossDensity, GrossDensityParams,
};
pub use radius::{
    frequency, neighbors_within_radius, Frequency, FrequencyParams, PointIndex, RadiusNeighbor,
    SpatialIndex,
};
pub use ratio::{
    covered_area_ratio, floor_area_ratio, AreaRatioParams, CoveredAreaRatio, FloorAreaRatio,
    JoinedValue,
};

use std::borrow::Cow;
use std::collections::BTreeSet;

use geo::Point;
use tracing::debug;
use urbmorph_core::vector::{FeatureCollection, GeometryOps, ObjectId};
use urbmorph_core::{Contiguity, Error, Neighbors, Result};

/// Centroid of every feature, in collection order.
fn centroids(features: &FeatureCollection, ops: &impl GeometryOps) -> Result<Vec<Point<f64>>> {
    features
        .iter()
        .map(|f| {
            ops.centroid(&f.geometry)
                .ok_or_else(|| Error::Geometry(format!("feature {} has no centroid", f.id)))
        })
        .collect()
}

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: radius.to_string(),
            reason: "must be a finite, non-negative number".into(),
        });
    }
    Ok(())
}

/// `id` together with its neighbors, deduplicated and sorted.
fn neighborhood<N: Neighbors + ?Sized>(neighbors: &N, id: ObjectId) -> BTreeSet<ObjectId> {
    let mut set: BTreeSet<ObjectId> = neighbors.neighbors(id).iter().copied().collect();
    set.insert(id);
    set
}

/// Use the caller's relation, or build Queen contiguity of `order` from `features`.
fn resolve_contiguity<'a>(
    features: &FeatureCollection,
    supplied: Option<&'a Contiguity>,
    order: usize,
) -> Result<Cow<'a, Contiguity>> {
    match supplied {
        Some(w) => Ok(Cow::Borrowed(w)),
        None => {
            debug!(order, "building Queen contiguity");
            let queen = Contiguity::queen(features);
            let w = if order == 1 { queen } else { queen.higher_order(order)? };
            Ok(Cow::Owned(w))
        }
    }
}
