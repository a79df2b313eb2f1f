//! Gross density and blocks count over topological neighborhoods
//!
//! The neighborhood of a tessellation cell is the cell itself plus every cell
//! its contiguity relation lists (usually Queen contiguity of order `k`).
//! Both measures require ids `0..n` so that a neighbor id addresses a cell.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;
use urbmorph_core::vector::{AttributeKey, FeatureCollection, GeoOps, GeometryOps, ObjectId};
use urbmorph_core::{Algorithm, Contiguity, Error, Neighbors, Result};

use super::{neighborhood, resolve_contiguity};
use crate::maybe_rayon::*;

/// Parameters for gross density
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossDensityParams {
    /// Area attribute of the tessellation cells
    pub area_column: String,
    /// Building attribute summed in the numerator (e.g. floor area)
    pub character_column: String,
    /// Attribute linking buildings to cells
    pub unique_id: String,
    /// Contiguity order used when no relation is supplied
    pub order: usize,
}

impl Default for GrossDensityParams {
    fn default() -> Self {
        Self {
            area_column: "area".into(),
            character_column: "fa".into(),
            unique_id: "uID".into(),
            order: 3,
        }
    }
}

/// Parameters for blocks count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksCountParams {
    /// Block id attribute of the tessellation cells
    pub block_id: String,
    /// Contiguity order used when no relation is supplied
    pub order: usize,
}

impl Default for BlocksCountParams {
    fn default() -> Self {
        Self {
            block_id: "bID".into(),
            order: 5,
        }
    }
}

/// Gross density algorithm
#[derive(Debug, Clone, Default)]
pub struct GrossDensity;

impl Algorithm for GrossDensity {
    type Input = (FeatureCollection, FeatureCollection, Option<Contiguity>);
    type Output = Vec<f64>;
    type Params = GrossDensityParams;

    fn name(&self) -> &'static str {
        "GrossDensity"
    }

    fn description(&self) -> &'static str {
        "Building character summed over a k-order neighborhood per unit of its area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (objects, buildings, contiguity) = input;
        gross_density(&objects, &buildings, contiguity.as_ref(), params)
    }
}

/// Blocks count algorithm
#[derive(Debug, Clone, Default)]
pub struct BlocksCount;

impl Algorithm for BlocksCount {
    type Input = (FeatureCollection, Option<Contiguity>);
    type Output = Vec<f64>;
    type Params = BlocksCountParams;

    fn name(&self) -> &'static str {
        "BlocksCount"
    }

    fn description(&self) -> &'static str {
        "Distinct blocks in a k-order neighborhood per unit of its area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (tessellation, contiguity) = input;
        blocks_count(&tessellation, contiguity.as_ref(), params)
    }
}

/// Gross density of every cell.
///
/// If `contiguity` is `None`, Queen contiguity of `params.order` is built
/// from `objects` first.
///
/// # Errors
/// `NonConsecutiveIds` if `objects` ids are not `0..n`, before anything is
/// computed.
pub fn gross_density(
    objects: &FeatureCollection,
    buildings: &FeatureCollection,
    contiguity: Option<&Contiguity>,
    params: GrossDensityParams,
) -> Result<Vec<f64>> {
    check_order(params.order)?;
    objects.ensure_consecutive_ids()?;
    let w = resolve_contiguity(objects, contiguity, params.order)?;
    gross_density_with(objects, buildings, w.as_ref(), params)
}

/// Gross density over an explicit neighbor relation.
///
/// For each cell: the sum of `character_column` over buildings whose
/// `unique_id` matches a cell of the neighborhood, divided by the summed
/// `area_column` of the neighborhood. Each building is counted once.
pub fn gross_density_with<N: Neighbors + Sync + ?Sized>(
    objects: &FeatureCollection,
    buildings: &FeatureCollection,
    neighbors: &N,
    params: GrossDensityParams,
) -> Result<Vec<f64>> {
    objects.ensure_consecutive_ids()?;
    debug!(
        objects = objects.len(),
        buildings = buildings.len(),
        "computing gross density"
    );

    let keys: Vec<Option<AttributeKey>> = objects
        .iter()
        .map(|f| f.key(&params.unique_id))
        .collect::<Result<_>>()?;
    let areas: Vec<f64> = objects
        .iter()
        .map(|f| f.number(&params.area_column))
        .collect::<Result<_>>()?;

    let mut character: HashMap<AttributeKey, f64> = HashMap::new();
    for b in buildings.iter() {
        if let Some(key) = b.key(&params.unique_id)? {
            *character.entry(key).or_insert(0.0) += b.number(&params.character_column)?;
        }
    }

    let n = objects.len();
    let values: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| -> Result<f64> {
            let hood = neighborhood(neighbors, i);
            check_members(&hood, n)?;

            let matched: BTreeSet<&AttributeKey> =
                hood.iter().filter_map(|&j| keys[j].as_ref()).collect();
            let total: f64 = matched
                .into_iter()
                .filter_map(|k| character.get(k))
                .sum();
            let area: f64 = hood.iter().map(|&j| areas[j]).sum();
            Ok(total / area)
        })
        .collect::<Result<_>>()?;

    debug!("gross density computed");
    Ok(values)
}

/// Weighted blocks count of every cell.
///
/// If `contiguity` is `None`, Queen contiguity of `params.order` is built
/// from `tessellation` first.
pub fn blocks_count(
    tessellation: &FeatureCollection,
    contiguity: Option<&Contiguity>,
    params: BlocksCountParams,
) -> Result<Vec<f64>> {
    check_order(params.order)?;
    tessellation.ensure_consecutive_ids()?;
    let w = resolve_contiguity(tessellation, contiguity, params.order)?;
    blocks_count_with(tessellation, w.as_ref(), params)
}

/// Blocks count over an explicit neighbor relation: distinct block ids in the
/// neighborhood divided by the summed geometric area of the neighborhood.
/// Cells with a null block id add area but no block.
pub fn blocks_count_with<N: Neighbors + Sync + ?Sized>(
    tessellation: &FeatureCollection,
    neighbors: &N,
    params: BlocksCountParams,
) -> Result<Vec<f64>> {
    tessellation.ensure_consecutive_ids()?;
    debug!(cells = tessellation.len(), "computing blocks count");

    let ops = GeoOps;
    let blocks: Vec<Option<AttributeKey>> = tessellation
        .iter()
        .map(|f| f.key(&params.block_id))
        .collect::<Result<_>>()?;
    let areas: Vec<f64> = tessellation.iter().map(|f| ops.area(&f.geometry)).collect();

    let n = tessellation.len();
    let values: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| -> Result<f64> {
            let hood = neighborhood(neighbors, i);
            check_members(&hood, n)?;

            let distinct: BTreeSet<&AttributeKey> =
                hood.iter().filter_map(|&j| blocks[j].as_ref()).collect();
            let area: f64 = hood.iter().map(|&j| areas[j]).sum();
            Ok(distinct.len() as f64 / area)
        })
        .collect::<Result<_>>()?;

    debug!("blocks count computed");
    Ok(values)
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(Error::InvalidParameter {
            name: "order",
            value: order.to_string(),
            reason: "contiguity order must be >= 1".into(),
        });
    }
    Ok(())
}

/// A neighbor id past the end of the collection means the relation was built
/// for different features.
fn check_members(hood: &BTreeSet<ObjectId>, n: usize) -> Result<()> {
    match hood.last() {
        Some(&last) if last >= n => Err(Error::Algorithm(format!(
            "contiguity refers to id {} but the collection has {} features",
            last, n
        ))),
        _ => Ok(()),
    }
}
