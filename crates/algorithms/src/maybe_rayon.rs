//! Per-feature loops that run on rayon when `parallel` is enabled.
//!
//! Measurements call `into_par_iter()` on ranges of object ids or
//! [`par_features`] on a collection. Without the feature both fall back to the
//! standard iterators, so the `.map().collect::<Result<_>>()` chains read the
//! same in either build.

use urbmorph_core::{Feature, FeatureCollection};

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

/// Features of `collection` in order, spread over the rayon pool.
#[cfg(feature = "parallel")]
pub fn par_features(collection: &FeatureCollection) -> rayon::slice::Iter<'_, Feature> {
    collection.features.par_iter()
}

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Single-threaded `into_par_iter` for ranges and slices
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;

/// Features of `collection` in order.
#[cfg(not(feature = "parallel"))]
pub fn par_features(collection: &FeatureCollection) -> std::slice::Iter<'_, Feature> {
    collection.features.iter()
}
