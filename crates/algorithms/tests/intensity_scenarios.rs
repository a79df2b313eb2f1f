//! End-to-end scenarios for the intensity characters.

use geo::{LineString, Point, Polygon};
use urbmorph_algorithms::intensity::{
    blocks_count, connected_components, courtyards, elements_in_block, frequency, gross_density,
    BlocksCountParams, CourtyardParams, ElementsInBlockParams, FrequencyParams, GrossDensityParams,
};
use urbmorph_core::{Contiguity, Error, Feature, FeatureCollection, ObjectId};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        vec![],
    )
}

/// B is a C-shaped block open to the east, A closes it, C leans on B's west side.
fn closed_yard() -> FeatureCollection {
    let a = rect(10.0, 0.0, 12.0, 10.0);
    let b = Polygon::new(
        LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 2.0),
            (2.0, 2.0),
            (2.0, 8.0),
            (10.0, 8.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]),
        vec![],
    );
    let c = rect(-3.0, 4.0, 0.0, 6.0);
    FeatureCollection::from_geometries(vec![a, b, c])
}

#[test]
fn chain_with_one_hole_shares_one_courtyard() {
    let w = Contiguity::from_lists(vec![vec![1], vec![0, 2], vec![1]]);

    let components = connected_components(&[0, 1, 2], &w);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].len(), 3);

    let counts = courtyards(&closed_yard(), Some(&w), CourtyardParams::default()).unwrap();
    assert_eq!(counts, vec![Some(1), Some(1), Some(1)]);
}

#[test]
fn disjoint_polygons_have_no_courtyards() {
    let fc = FeatureCollection::from_geometries(vec![
        rect(0.0, 0.0, 1.0, 1.0),
        rect(5.0, 5.0, 6.0, 6.0),
    ]);
    let w = Contiguity::queen(&fc);
    assert_eq!(connected_components(&fc.ids(), &w), vec![vec![0], vec![1]]);

    let counts = courtyards(&fc, None, CourtyardParams::default()).unwrap();
    assert_eq!(counts, vec![Some(0), Some(0)]);
}

#[test]
fn courtyards_are_uniform_within_components() {
    // Two structures: a closed ring of four bars and a lone square.
    let fc = FeatureCollection::from_geometries(vec![
        rect(0.0, 0.0, 10.0, 2.0),
        rect(30.0, 30.0, 31.0, 31.0),
        rect(0.0, 8.0, 10.0, 10.0),
        rect(0.0, 2.0, 2.0, 8.0),
        rect(8.0, 2.0, 10.0, 8.0),
    ]);
    let w = Contiguity::queen(&fc);
    let components = connected_components(&fc.ids(), &w);

    let mut seen: Vec<ObjectId> = components.iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, fc.ids());

    let counts = courtyards(&fc, Some(&w), CourtyardParams::default()).unwrap();
    for component in &components {
        let first = counts[component[0]];
        assert!(component.iter().all(|&id| counts[id] == first));
    }
    assert_eq!(counts, vec![Some(1), Some(0), Some(1), Some(1), Some(1)]);

    let again = courtyards(&fc, Some(&w), CourtyardParams::default()).unwrap();
    assert_eq!(counts, again);
}

#[test]
fn frequency_counts_points_inside_radius() {
    let objects = FeatureCollection::from_geometries(vec![Point::new(0.0, 0.0)]);
    let look_for = FeatureCollection::from_geometries(vec![
        Point::new(0.0, 0.0),
        Point::new(3.0, 0.0),
        Point::new(5.0, 0.0),
    ]);
    let counts = frequency(&objects, &look_for, FrequencyParams { radius: 4.0 }).unwrap();
    assert_eq!(counts, vec![2]);
}

#[test]
fn frequency_preserves_object_order() {
    let objects = FeatureCollection::from_geometries(vec![
        Point::new(100.0, 0.0),
        Point::new(0.0, 0.0),
        Point::new(50.0, 0.0),
    ]);
    let look_for = FeatureCollection::from_geometries(vec![
        Point::new(1.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(51.0, 0.0),
    ]);
    let counts = frequency(&objects, &look_for, FrequencyParams { radius: 5.0 }).unwrap();
    assert_eq!(counts, vec![0, 2, 1]);
}

fn block_with_element_counts() -> (FeatureCollection, FeatureCollection) {
    // 2 x 5 block, area 10
    let blocks: FeatureCollection = vec![Feature::new(0, rect(0.0, 0.0, 2.0, 5.0)).with_property("bID", 1)]
        .into_iter()
        .collect();
    let elements: FeatureCollection = [1, 1, 2]
        .into_iter()
        .enumerate()
        .map(|(i, bid)| Feature::new(i, Point::new(1.0, 1.0)).with_property("bID", bid))
        .collect();
    (blocks, elements)
}

#[test]
fn elements_in_block_unweighted() {
    let (blocks, elements) = block_with_element_counts();
    let values = elements_in_block(&blocks, &elements, ElementsInBlockParams::default()).unwrap();
    assert_eq!(values, vec![2.0]);
}

#[test]
fn elements_in_block_weighted() {
    let (blocks, elements) = block_with_element_counts();
    let params = ElementsInBlockParams { weighted: true, ..Default::default() };
    let values = elements_in_block(&blocks, &elements, params).unwrap();
    assert!((values[0] - 0.2).abs() < 1e-10);
}

#[test]
fn non_consecutive_ids_are_rejected() {
    let fc: FeatureCollection = [0, 2, 3]
        .into_iter()
        .map(|i| {
            Feature::new(i, rect(i as f64, 0.0, i as f64 + 1.0, 1.0))
                .with_property("uID", i as i64)
                .with_property("bID", 1)
                .with_property("area", 1.0)
        })
        .collect();
    let buildings = FeatureCollection::new();

    assert!(matches!(
        gross_density(&fc, &buildings, None, GrossDensityParams::default()),
        Err(Error::NonConsecutiveIds { .. })
    ));
    assert!(matches!(
        blocks_count(&fc, None, BlocksCountParams::default()),
        Err(Error::NonConsecutiveIds { .. })
    ));
    assert!(matches!(
        courtyards(&fc, None, CourtyardParams::default()),
        Err(Error::NonConsecutiveIds { .. })
    ));
}

#[test]
fn gross_density_on_built_grid() {
    // 3 x 3 grid of unit cells, one building of floor area 9 in the center cell
    let cells: FeatureCollection = (0..9)
        .map(|i| {
            let (x, y) = ((i % 3) as f64, (i / 3) as f64);
            Feature::new(i, rect(x, y, x + 1.0, y + 1.0))
                .with_property("uID", i as i64)
                .with_property("area", 1.0)
        })
        .collect();
    let buildings: FeatureCollection = vec![Feature::new(0, Point::new(1.5, 1.5))
        .with_property("uID", 4)
        .with_property("fa", 9.0)]
    .into_iter()
    .collect();

    let params = GrossDensityParams { order: 1, ..Default::default() };
    let values = gross_density(&cells, &buildings, None, params).unwrap();

    // Corner cell 0 touches 1, 3, 4: 9 / 4
    assert!((values[0] - 9.0 / 4.0).abs() < 1e-10);
    // Edge cell 1 touches 0, 2, 3, 4, 5: 9 / 6
    assert!((values[1] - 9.0 / 6.0).abs() < 1e-10);
    // Center touches all: 9 / 9
    assert!((values[4] - 1.0).abs() < 1e-10);

    let order_two = GrossDensityParams { order: 2, ..Default::default() };
    let wide = gross_density(&cells, &buildings, None, order_two).unwrap();
    assert!(wide.iter().all(|v| (v - 1.0).abs() < 1e-10));
}
