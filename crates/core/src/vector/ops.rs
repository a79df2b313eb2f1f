//! Geometry operations consumed by the measurements
//!
//! The measurements never touch geometry algorithms directly; they go through
//! [`GeometryOps`] so a caller can substitute its own engine. [`GeoOps`] is the
//! default, backed by the `geo` crate.

use geo::{unary_union, Area, Buffer, Centroid, Geometry, MultiPolygon, Point};

use crate::error::{Error, Result};

/// Geometry capabilities required by the intensity measurements.
pub trait GeometryOps {
    /// Centroid of a geometry, `None` for empty geometries
    fn centroid(&self, geom: &Geometry<f64>) -> Option<Point<f64>>;

    /// Unsigned area (0 for points and lines)
    fn area(&self, geom: &Geometry<f64>) -> f64;

    /// Buffer every geometry by `distance`, then dissolve them into one shape.
    fn buffered_union(&self, geoms: &[&Geometry<f64>], distance: f64) -> Result<Geometry<f64>>;

    /// Number of interior rings (holes) of a single polygonal shape.
    fn interior_ring_count(&self, geom: &Geometry<f64>) -> Result<usize>;
}

/// `geo`-backed geometry operations
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl GeometryOps for GeoOps {
    fn centroid(&self, geom: &Geometry<f64>) -> Option<Point<f64>> {
        geom.centroid()
    }

    fn area(&self, geom: &Geometry<f64>) -> f64 {
        geom.unsigned_area()
    }

    fn buffered_union(&self, geoms: &[&Geometry<f64>], distance: f64) -> Result<Geometry<f64>> {
        if distance.is_nan() || distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "buffer",
                value: distance.to_string(),
                reason: "must be non-negative".into(),
            });
        }

        let parts: Vec<MultiPolygon<f64>> = geoms
            .iter()
            .map(|g| {
                if distance > 0.0 {
                    Ok(g.buffer(distance))
                } else {
                    polygonal(g)
                }
            })
            .collect::<Result<_>>()?;

        let mut merged = unary_union(parts.iter());
        if merged.0.len() == 1 {
            Ok(Geometry::Polygon(merged.0.remove(0)))
        } else {
            Ok(Geometry::MultiPolygon(merged))
        }
    }

    fn interior_ring_count(&self, geom: &Geometry<f64>) -> Result<usize> {
        match geom {
            Geometry::Polygon(p) => Ok(p.interiors().len()),
            Geometry::Rect(_) | Geometry::Triangle(_) => Ok(0),
            Geometry::MultiPolygon(mp) => match mp.0.as_slice() {
                [single] => Ok(single.interiors().len()),
                [] => Err(Error::Geometry("merged shape is empty".into())),
                parts => Err(Error::Geometry(format!(
                    "merged shape splits into {} polygons",
                    parts.len()
                ))),
            },
            other => Err(Error::Geometry(format!(
                "interior rings are undefined for {}",
                geometry_kind(other)
            ))),
        }
    }
}

/// Polygonal content of a geometry, used when no buffering is requested.
fn polygonal(geom: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon::new(vec![t.to_polygon()])),
        other => Err(Error::Geometry(format!(
            "cannot dissolve {} without a positive buffer",
            geometry_kind(other)
        ))),
    }
}

fn geometry_kind(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
