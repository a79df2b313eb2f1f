//! Courtyards
//!
//! Features that touch, directly or through other features, form one joined
//! structure. The structure's outline is obtained by buffering every member
//! slightly and dissolving them; the buffer fuses members that meet at a single
//! corner. Each interior ring of that outline is a courtyard, and every member
//! of the structure receives the structure's courtyard count.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use urbmorph_core::vector::{FeatureCollection, GeoOps, GeometryOps, ObjectId};
use urbmorph_core::{Algorithm, Contiguity, Error, Neighbors, Result};

use super::resolve_contiguity;

/// Parameters for courtyards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtyardParams {
    /// Buffer applied to every member before dissolving, in CRS units
    pub buffer: f64,
}

impl Default for CourtyardParams {
    fn default() -> Self {
        Self { buffer: 0.01 }
    }
}

/// Courtyards algorithm
#[derive(Debug, Clone, Default)]
pub struct Courtyards;

impl Algorithm for Courtyards {
    type Input = (FeatureCollection, Option<Contiguity>);
    type Output = Vec<Option<usize>>;
    type Params = CourtyardParams;

    fn name(&self) -> &'static str {
        "Courtyards"
    }

    fn description(&self) -> &'static str {
        "Number of courtyards enclosed by each joined structure of touching features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (objects, contiguity) = input;
        courtyards(&objects, contiguity.as_ref(), params)
    }
}

/// Partition `ids` into connected components of `neighbors`.
///
/// Components come in the order of their first member in `ids`, members in
/// breadth-first discovery order. Neighbor ids not in `ids` are ignored.
pub fn connected_components<N: Neighbors + ?Sized>(
    ids: &[ObjectId],
    neighbors: &N,
) -> Vec<Vec<ObjectId>> {
    let members: HashSet<ObjectId> = ids.iter().copied().collect();
    let mut visited = HashSet::with_capacity(ids.len());

    ids.iter()
        .filter_map(|&start| {
            visited
                .insert(start)
                .then(|| expand(start, neighbors, &members, &mut visited))
        })
        .collect()
}

/// Breadth-first expansion from `start`; `start` must already be in `visited`.
fn expand<N: Neighbors + ?Sized>(
    start: ObjectId,
    neighbors: &N,
    members: &HashSet<ObjectId>,
    visited: &mut HashSet<ObjectId>,
) -> Vec<ObjectId> {
    let mut component = vec![start];
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for &next in neighbors.neighbors(current) {
            if members.contains(&next) && visited.insert(next) {
                component.push(next);
                queue.push_back(next);
            }
        }
    }

    component
}

/// Courtyard count of every feature.
///
/// If `contiguity` is `None`, first-order Queen contiguity is built from
/// `objects`.
///
/// # Returns
/// One value per feature in collection order. `None` marks members of a
/// structure whose outline could not be derived; the failure is logged and
/// the other structures are still computed.
///
/// # Errors
/// `NonConsecutiveIds` if ids are not `0..n`.
pub fn courtyards(
    objects: &FeatureCollection,
    contiguity: Option<&Contiguity>,
    params: CourtyardParams,
) -> Result<Vec<Option<usize>>> {
    objects.ensure_consecutive_ids()?;
    let w = resolve_contiguity(objects, contiguity, 1)?;
    courtyards_with(objects, w.as_ref(), &GeoOps, params)
}

/// Courtyard count over an explicit neighbor relation and geometry engine.
pub fn courtyards_with<N, G>(
    objects: &FeatureCollection,
    neighbors: &N,
    ops: &G,
    params: CourtyardParams,
) -> Result<Vec<Option<usize>>>
where
    N: Neighbors + ?Sized,
    G: GeometryOps + ?Sized,
{
    objects.ensure_consecutive_ids()?;
    if params.buffer.is_nan() || params.buffer < 0.0 {
        return Err(Error::InvalidParameter {
            name: "buffer",
            value: params.buffer.to_string(),
            reason: "must be non-negative".into(),
        });
    }

    let n = objects.len();
    if let Some((id, bad)) = (0..n)
        .flat_map(|id| neighbors.neighbors(id).iter().map(move |&j| (id, j)))
        .find(|&(_, j)| j >= n)
    {
        return Err(Error::Algorithm(format!(
            "contiguity links {} to id {} but the collection has {} features",
            id, bad, n
        )));
    }

    debug!(objects = n, buffer = params.buffer, "computing courtyards");

    let ids = objects.ids();
    let members: HashSet<ObjectId> = ids.iter().copied().collect();
    let mut visited: HashSet<ObjectId> = HashSet::with_capacity(n);
    let mut memo: HashMap<ObjectId, Option<usize>> = HashMap::with_capacity(n);
    let mut structures = 0usize;

    for &id in &ids {
        if memo.contains_key(&id) {
            continue;
        }
        visited.insert(id);
        let component = expand(id, neighbors, &members, &mut visited);
        structures += 1;

        let geoms: Vec<_> = component.iter().map(|&j| &objects.features[j].geometry).collect();
        let count = ops
            .buffered_union(&geoms, params.buffer)
            .and_then(|outline| ops.interior_ring_count(&outline));

        let count = match count {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(
                    first = id,
                    members = component.len(),
                    error = %e,
                    "could not derive courtyards of structure"
                );
                None
            }
        };

        for member in component {
            memo.insert(member, count);
        }
    }

    debug!(structures, "courtyards computed");
    Ok(ids.iter().map(|id| memo.get(id).copied().flatten()).collect())
}
