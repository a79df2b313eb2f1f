//! Elements in block
//!
//! Number of elements (buildings, plots) assigned to each block, optionally
//! divided by the block area.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use urbmorph_core::vector::{AttributeKey, FeatureCollection, GeoOps, GeometryOps};
use urbmorph_core::{Algorithm, Result};

use crate::maybe_rayon::*;

/// Parameters for elements in block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementsInBlockParams {
    /// Block id attribute of the blocks
    pub left_id: String,
    /// Block id attribute of the elements
    pub right_id: String,
    /// Divide counts by block area
    pub weighted: bool,
}

impl Default for ElementsInBlockParams {
    fn default() -> Self {
        Self {
            left_id: "bID".into(),
            right_id: "bID".into(),
            weighted: false,
        }
    }
}

/// Elements in block algorithm
#[derive(Debug, Clone, Default)]
pub struct ElementsInBlock;

impl Algorithm for ElementsInBlock {
    type Input = (FeatureCollection, FeatureCollection);
    type Output = Vec<f64>;
    type Params = ElementsInBlockParams;

    fn name(&self) -> &'static str {
        "ElementsInBlock"
    }

    fn description(&self) -> &'static str {
        "Number of elements per block, optionally per unit of block area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        elements_in_block(&input.0, &input.1, params)
    }
}

/// Count the elements belonging to each block.
///
/// Blocks no element refers to get 0. With `weighted`, the count is divided
/// by the block's geometric area.
///
/// # Returns
/// One value per block, in collection order
pub fn elements_in_block(
    blocks: &FeatureCollection,
    elements: &FeatureCollection,
    params: ElementsInBlockParams,
) -> Result<Vec<f64>> {
    debug!(
        blocks = blocks.len(),
        elements = elements.len(),
        weighted = params.weighted,
        "computing elements in block"
    );

    let mut counts: HashMap<AttributeKey, usize> = HashMap::new();
    for e in elements.iter() {
        if let Some(key) = e.key(&params.right_id)? {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let ops = GeoOps;
    let values: Vec<f64> = par_features(blocks)
        .map(|block| -> Result<f64> {
            let count = block
                .key(&params.left_id)?
                .and_then(|key| counts.get(&key).copied())
                .unwrap_or(0) as f64;
            if params.weighted {
                Ok(count / ops.area(&block.geometry))
            } else {
                Ok(count)
            }
        })
        .collect::<Result<_>>()?;

    debug!("elements in block computed");
    Ok(values)
}
