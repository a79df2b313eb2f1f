//! Radius neighborhoods and frequency
//!
//! [`PointIndex`] keeps points in an R-tree. A radius query takes the
//! candidates inside the `2r x 2r` box around the center, keeps those strictly
//! closer than `r`, and orders them by distance with ties broken by id.

use geo::{Coord, Point, Rect};
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree, AABB};
use serde::{Deserialize, Serialize};
use tracing::debug;
use urbmorph_core::vector::{FeatureCollection, GeoOps, ObjectId};
use urbmorph_core::{Algorithm, Result};

use super::{centroids, check_radius};
use crate::maybe_rayon::*;

/// Candidate lookup and exact distance, the two capabilities a radius query needs.
pub trait SpatialIndex {
    /// Ids whose location lies inside the closed box `bbox`, in no particular order.
    fn query(&self, bbox: &Rect<f64>) -> Vec<ObjectId>;

    /// Exact distance between `center` and the location of `id`.
    /// `None` if the id is not indexed.
    fn exact_distance(&self, center: &Point<f64>, id: ObjectId) -> Option<f64>;
}

type IndexedPoint = GeomWithData<[f64; 2], ObjectId>;

/// R-tree over points; ids are positions in the input slice.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
    points: Vec<Point<f64>>,
}

impl PointIndex {
    /// Bulk-load the index.
    pub fn build(points: &[Point<f64>]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(id, p)| GeomWithData::new([p.x(), p.y()], id))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
            points: points.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl SpatialIndex for PointIndex {
    fn query(&self, bbox: &Rect<f64>) -> Vec<ObjectId> {
        let env = AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        self.tree.locate_in_envelope(&env).map(|item| item.data).collect()
    }

    fn exact_distance(&self, center: &Point<f64>, id: ObjectId) -> Option<f64> {
        self.points.get(id).map(|p| {
            [p.x(), p.y()]
                .distance_2(&[center.x(), center.y()])
                .sqrt()
        })
    }
}

/// A point found by a radius query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusNeighbor {
    pub distance: f64,
    pub id: ObjectId,
}

/// All indexed points strictly closer than `radius` to `center`.
///
/// Sorted ascending by distance, equal distances by ascending id. A point at
/// exactly `radius` is excluded.
pub fn neighbors_within_radius<I: SpatialIndex + ?Sized>(
    index: &I,
    center: Point<f64>,
    radius: f64,
) -> Vec<RadiusNeighbor> {
    let bbox = Rect::new(
        Coord { x: center.x() - radius, y: center.y() - radius },
        Coord { x: center.x() + radius, y: center.y() + radius },
    );

    let mut found: Vec<RadiusNeighbor> = index
        .query(&bbox)
        .into_iter()
        .filter_map(|id| {
            let distance = index.exact_distance(&center, id)?;
            (distance < radius).then_some(RadiusNeighbor { distance, id })
        })
        .collect();

    found.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    found
}

/// Parameters for frequency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyParams {
    /// Search radius in CRS units
    pub radius: f64,
}

impl Default for FrequencyParams {
    fn default() -> Self {
        Self { radius: 400.0 }
    }
}

/// Frequency algorithm
#[derive(Debug, Clone, Default)]
pub struct Frequency;

impl Algorithm for Frequency {
    type Input = (FeatureCollection, FeatureCollection);
    type Output = Vec<usize>;
    type Params = FrequencyParams;

    fn name(&self) -> &'static str {
        "Frequency"
    }

    fn description(&self) -> &'static str {
        "Number of features whose centroid lies within a radius"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        frequency(&input.0, &input.1, params)
    }
}

/// Count, for every feature of `objects`, the centroids of `look_for` lying
/// strictly within `params.radius` of its centroid.
///
/// Passing the same collection twice counts each feature itself.
///
/// # Returns
/// One count per feature of `objects`, in collection order
pub fn frequency(
    objects: &FeatureCollection,
    look_for: &FeatureCollection,
    params: FrequencyParams,
) -> Result<Vec<usize>> {
    check_radius(params.radius)?;
    debug!(
        objects = objects.len(),
        look_for = look_for.len(),
        radius = params.radius,
        "computing frequency"
    );

    let ops = GeoOps;
    let centers = centroids(objects, &ops)?;
    let index = PointIndex::build(&centroids(look_for, &ops)?);

    let counts: Vec<usize> = centers
        .into_par_iter()
        .map(|c| neighbors_within_radius(&index, c, params.radius).len())
        .collect();

    debug!("frequency computed");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use urbmorph_core::Error;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point<f64>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let index = PointIndex::build(&pts(&[(4.0, 0.0), (4.0 - 1e-9, 0.0)]));
        let found = neighbors_within_radius(&index, Point::new(0.0, 0.0), 4.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let index = PointIndex::build(&pts(&[(2.0, 0.0), (0.0, 1.0), (-2.0, 0.0), (0.0, -1.0)]));
        let found = neighbors_within_radius(&index, Point::new(0.0, 0.0), 5.0);
        let ids: Vec<ObjectId> = found.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3, 0, 2]);
        assert!((found[0].distance - 1.0).abs() < 1e-10);
        assert!((found[3].distance - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_box_corner_outside_circle() {
        // (3, 3) is inside the 8x8 query box but ~4.24 away
        let index = PointIndex::build(&pts(&[(3.0, 3.0)]));
        assert!(neighbors_within_radius(&index, Point::new(0.0, 0.0), 4.0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = PointIndex::build(&[]);
        assert!(index.is_empty());
        assert!(neighbors_within_radius(&index, Point::new(0.0, 0.0), 10.0).is_empty());
    }

    #[test]
    fn test_unknown_id_has_no_distance() {
        let index = PointIndex::build(&pts(&[(1.0, 1.0)]));
        assert_eq!(index.len(), 1);
        assert!(index.exact_distance(&Point::new(0.0, 0.0), 5).is_none());
    }

    #[test]
    fn test_frequency_counts_self() {
        let fc = FeatureCollection::from_geometries(pts(&[(0.0, 0.0), (1.0, 0.0), (10.0, 0.0)]));
        let counts = frequency(&fc, &fc, FrequencyParams { radius: 2.0 }).unwrap();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_frequency_negative_radius() {
        let fc = FeatureCollection::from_geometries(pts(&[(0.0, 0.0)]));
        assert!(matches!(
            frequency(&fc, &fc, FrequencyParams { radius: -1.0 }),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_frequency_infinite_radius() {
        let fc = FeatureCollection::from_geometries(pts(&[(0.0, 0.0), (1e9, 0.0)]));
        assert!(matches!(
            frequency(&fc, &fc, FrequencyParams { radius: f64::INFINITY }),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_frequency_repeatable() {
        let fc = FeatureCollection::from_geometries(pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (9.0, 9.0)]));
        let params = FrequencyParams { radius: 1.5 };
        let first = frequency(&fc, &fc, params.clone()).unwrap();
        assert_eq!(first, vec![3, 3, 3, 1]);
        assert_eq!(frequency(&fc, &fc, params).unwrap(), first);
    }

    #[test]
    fn test_frequency_via_algorithm() {
        let objects = FeatureCollection::from_geometries(pts(&[(0.0, 0.0)]));
        let look_for = FeatureCollection::from_geometries(pts(&[(100.0, 0.0), (500.0, 0.0)]));
        let counts = Frequency.execute_default((objects, look_for)).unwrap();
        assert_eq!(counts, vec![1]);
    }
}
