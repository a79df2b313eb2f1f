//! Vector data structures
//!
//! - `Feature`: identifier + geometry + attributes
//! - `FeatureCollection`: an ordered object set
//! - `AttributeValue` / `AttributeKey`: attribute cells and their hashable join form

mod ops;

pub use ops::{GeoOps, GeometryOps};

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Identifier of a feature within its collection
pub type ObjectId = usize;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Hashable form of an attribute value, used for joins and frequency tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeKey {
    Bool(bool),
    Int(i64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value.
    ///
    /// `Null` reads as NaN so that it propagates through sums the way a
    /// missing cell does. Strings have no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Null => Some(f64::NAN),
            AttributeValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::String(_) => None,
        }
    }

    /// Join key for the value. Integral floats key as integers, so `1.0`
    /// and `1` match. Null, NaN and fractional floats never match anything.
    pub fn key(&self) -> Option<AttributeKey> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Bool(b) => Some(AttributeKey::Bool(*b)),
            AttributeValue::Int(i) => Some(AttributeKey::Int(*i)),
            AttributeValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(AttributeKey::Int(*f as i64))
                } else {
                    None
                }
            }
            AttributeValue::String(s) => Some(AttributeKey::String(s.clone())),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

/// A feature with identifier, geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature identifier
    pub id: ObjectId,
    /// Feature geometry
    pub geometry: Geometry<f64>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with no attributes
    pub fn new(id: ObjectId, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            id,
            geometry: geometry.into(),
            properties: HashMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Read a numeric attribute.
    pub fn number(&self, name: &str) -> Result<f64> {
        let value = self.get_property(name).ok_or_else(|| Error::MissingAttribute {
            id: self.id,
            name: name.to_string(),
        })?;
        value.as_f64().ok_or_else(|| Error::InvalidAttribute {
            id: self.id,
            name: name.to_string(),
            reason: format!("expected a number, got {:?}", value),
        })
    }

    /// Read an attribute as a join key. `Ok(None)` means the cell is present
    /// but cannot match (null, NaN, fractional float).
    pub fn key(&self, name: &str) -> Result<Option<AttributeKey>> {
        self.get_property(name)
            .map(AttributeValue::key)
            .ok_or_else(|| Error::MissingAttribute {
                id: self.id,
                name: name.to_string(),
            })
    }
}

/// Ordered collection of features (an object set)
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    /// Build a collection with positional identifiers `0..n`.
    pub fn from_geometries<G: Into<Geometry<f64>>>(geometries: impl IntoIterator<Item = G>) -> Self {
        geometries
            .into_iter()
            .enumerate()
            .map(|(i, g)| Feature::new(i, g))
            .collect()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Feature at a position (not an identifier lookup)
    pub fn get(&self, position: usize) -> Option<&Feature> {
        self.features.get(position)
    }

    /// Identifiers in collection order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.features.iter().map(|f| f.id).collect()
    }

    /// Fail unless identifiers are exactly `0..n` in order, which is what
    /// lets an identifier double as a position.
    pub fn ensure_consecutive_ids(&self) -> Result<()> {
        match self.features.iter().enumerate().find(|(pos, f)| f.id != *pos) {
            Some((position, f)) => Err(Error::NonConsecutiveIds {
                position,
                found: f.id,
            }),
            None => Ok(()),
        }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
