//! Contiguity relations between features
//!
//! A [`Contiguity`] maps each feature identifier to the sorted identifiers of
//! the features it touches. It is keyed by identifier rather than position,
//! so lookups never depend on the order of the collection it was built from.
//!
//! Builders:
//! - [`Contiguity::queen`]: features sharing at least one vertex are neighbors
//! - [`Contiguity::higher_order`]: everything reachable within `k` steps
//! - [`Contiguity::from_lists`] / [`Contiguity::from_map`]: caller-supplied

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use geo::CoordsIter;

use crate::error::{Error, Result};
use crate::vector::{FeatureCollection, ObjectId};

/// Read access to a neighbor relation.
pub trait Neighbors {
    /// Neighbors of `id`, excluding `id` itself. Unknown ids have none.
    fn neighbors(&self, id: ObjectId) -> &[ObjectId];
}

/// Symmetric-or-not adjacency relation keyed by feature identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contiguity {
    neighbors: HashMap<ObjectId, Vec<ObjectId>>,
}

impl Neighbors for Contiguity {
    fn neighbors(&self, id: ObjectId) -> &[ObjectId] {
        self.neighbors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Contiguity {
    /// Build from a map of neighbor lists. Lists are sorted and deduplicated,
    /// and self-references are dropped.
    pub fn from_map(map: HashMap<ObjectId, Vec<ObjectId>>) -> Self {
        let neighbors = map
            .into_iter()
            .map(|(id, list)| (id, normalize(id, list)))
            .collect();
        Self { neighbors }
    }

    /// Build from positional neighbor lists: entry `i` lists the neighbors of id `i`.
    pub fn from_lists(lists: Vec<Vec<ObjectId>>) -> Self {
        Self::from_map(lists.into_iter().enumerate().collect())
    }

    /// Queen contiguity: two features are neighbors when their geometries share
    /// at least one vertex (an edge or a single corner).
    ///
    /// Vertices are matched exactly. A vertex lying in the middle of another
    /// feature's edge does not make the two neighbors.
    pub fn queen(features: &FeatureCollection) -> Self {
        let mut by_vertex: HashMap<(u64, u64), Vec<ObjectId>> = HashMap::new();

        for feature in features.iter() {
            let mut seen = HashSet::new();
            for c in feature.geometry.coords_iter() {
                // +0.0 folds -0.0 into 0.0 so both hash alike
                let key = ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits());
                if seen.insert(key) {
                    by_vertex.entry(key).or_default().push(feature.id);
                }
            }
        }

        let mut sets: HashMap<ObjectId, BTreeSet<ObjectId>> =
            features.iter().map(|f| (f.id, BTreeSet::new())).collect();

        for ids in by_vertex.values().filter(|ids| ids.len() > 1) {
            for &a in ids {
                for &b in ids {
                    if a != b {
                        sets.entry(a).or_default().insert(b);
                    }
                }
            }
        }

        let neighbors = sets
            .into_iter()
            .map(|(id, set)| (id, set.into_iter().collect()))
            .collect();
        Self { neighbors }
    }

    /// Relation of order `k`: every id reachable from `id` in at most `k`
    /// steps, excluding `id` itself. Order 1 is a copy of `self`.
    pub fn higher_order(&self, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidParameter {
                name: "order",
                value: k.to_string(),
                reason: "contiguity order must be >= 1".into(),
            });
        }

        let neighbors = self
            .neighbors
            .keys()
            .map(|&id| (id, self.within_steps(id, k)))
            .collect();
        Ok(Self { neighbors })
    }

    /// Number of ids with an entry in the relation
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Whether `id` has an entry (possibly with no neighbors)
    pub fn contains(&self, id: ObjectId) -> bool {
        self.neighbors.contains_key(&id)
    }

    fn within_steps(&self, origin: ObjectId, k: usize) -> Vec<ObjectId> {
        let mut depth: HashMap<ObjectId, usize> = HashMap::from([(origin, 0)]);
        let mut queue = VecDeque::from([origin]);

        while let Some(current) = queue.pop_front() {
            let d = depth[&current];
            if d == k {
                continue;
            }
            for &next in self.neighbors(current) {
                if !depth.contains_key(&next) {
                    depth.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }

        let mut reached: Vec<ObjectId> = depth.into_keys().filter(|&id| id != origin).collect();
        reached.sort_unstable();
        reached
    }
}

fn normalize(id: ObjectId, mut list: Vec<ObjectId>) -> Vec<ObjectId> {
    list.retain(|&n| n != id);
    list.sort_unstable();
    list.dedup();
    list
}
