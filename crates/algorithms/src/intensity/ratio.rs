//! Covered area ratio and floor area ratio
//!
//! Both join covering features (e.g. buildings) onto covered features
//! (e.g. plots) by an id column and divide the covering area by the covered
//! area. Covered features without a match produce no row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use urbmorph_core::vector::{AttributeKey, FeatureCollection, ObjectId};
use urbmorph_core::{Algorithm, Result};

/// Parameters for area ratios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRatioParams {
    /// Area attribute of the covered features
    pub area_column: String,
    /// Area (or floor area) attribute of the covering features
    pub look_for_area_column: String,
    /// Attribute both collections are joined on
    pub id_column: String,
}

impl Default for AreaRatioParams {
    fn default() -> Self {
        Self {
            area_column: "area".into(),
            look_for_area_column: "area".into(),
            id_column: "uID".into(),
        }
    }
}

/// One joined row: the covered feature it belongs to and its ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedValue {
    pub id: ObjectId,
    pub value: f64,
}

/// Covered area ratio algorithm
#[derive(Debug, Clone, Default)]
pub struct CoveredAreaRatio;

impl Algorithm for CoveredAreaRatio {
    type Input = (FeatureCollection, FeatureCollection);
    type Output = Vec<JoinedValue>;
    type Params = AreaRatioParams;

    fn name(&self) -> &'static str {
        "CoveredAreaRatio"
    }

    fn description(&self) -> &'static str {
        "Ratio of covering footprint area to covered feature area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        covered_area_ratio(&input.0, &input.1, params)
    }
}

/// Floor area ratio algorithm
#[derive(Debug, Clone, Default)]
pub struct FloorAreaRatio;

impl Algorithm for FloorAreaRatio {
    type Input = (FeatureCollection, FeatureCollection);
    type Output = Vec<JoinedValue>;
    type Params = AreaRatioParams;

    fn name(&self) -> &'static str {
        "FloorAreaRatio"
    }

    fn description(&self) -> &'static str {
        "Ratio of covering floor area to covered feature area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        floor_area_ratio(&input.0, &input.1, params)
    }
}

/// Covered area ratio: `look_for area / object area` per joined pair.
///
/// # Arguments
/// * `objects` - Covered features (e.g. plots)
/// * `look_for` - Covering features (e.g. buildings)
/// * `params` - Column names
///
/// # Returns
/// One row per matched pair, in `objects` order. A zero object area yields
/// an infinite or NaN ratio.
pub fn covered_area_ratio(
    objects: &FeatureCollection,
    look_for: &FeatureCollection,
    params: AreaRatioParams,
) -> Result<Vec<JoinedValue>> {
    debug!(objects = objects.len(), look_for = look_for.len(), "computing covered area ratio");
    let rows = joined_ratio(objects, look_for, &params)?;
    debug!(rows = rows.len(), "covered area ratio computed");
    Ok(rows)
}

/// Floor area ratio: `look_for floor area / object area` per joined pair.
///
/// Same join semantics as [`covered_area_ratio`]; `look_for_area_column`
/// names the floor area attribute.
pub fn floor_area_ratio(
    objects: &FeatureCollection,
    look_for: &FeatureCollection,
    params: AreaRatioParams,
) -> Result<Vec<JoinedValue>> {
    debug!(objects = objects.len(), look_for = look_for.len(), "computing floor area ratio");
    let rows = joined_ratio(objects, look_for, &params)?;
    debug!(rows = rows.len(), "floor area ratio computed");
    Ok(rows)
}

/// Inner join on `id_column`. Several `look_for` rows with the same key give
/// several output rows, in `look_for` order.
fn joined_ratio(
    objects: &FeatureCollection,
    look_for: &FeatureCollection,
    params: &AreaRatioParams,
) -> Result<Vec<JoinedValue>> {
    let mut covering: HashMap<AttributeKey, Vec<f64>> = HashMap::new();
    for f in look_for.iter() {
        if let Some(key) = f.key(&params.id_column)? {
            let area = f.number(&params.look_for_area_column)?;
            covering.entry(key).or_default().push(area);
        }
    }

    let mut rows = Vec::with_capacity(objects.len());
    for f in objects.iter() {
        let Some(key) = f.key(&params.id_column)? else {
            continue;
        };
        let Some(areas) = covering.get(&key) else {
            continue;
        };
        let own = f.number(&params.area_column)?;
        rows.extend(areas.iter().map(|a| JoinedValue { id: f.id, value: a / own }));
    }

    Ok(rows)
}
