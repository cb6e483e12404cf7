//! # Cluster Values
//!
//! A cluster value turns one configuration into the scalar that Mayer sampling averages and
//! samples from. It combines one or more diagram classes computed by the subset-recursion
//! engine and caches its result per geometry version.
//!
//! ## Current and Trial Sides
//!
//! Every cluster keeps state for both buffers of a [`PairGeometryCache`]: bond tables and
//! cached values for the settled configuration and for the pending trial. The notification
//! hooks keep that state aligned with the cache:
//!
//! - `trial_notify` invalidates only the trial-side value
//! - `accept_notify` swaps the two sides, matching the O(1) buffer swap of the cache
//! - `reject_notify` leaves the current side untouched
//!
//! ## Implementations
//!
//! - [`wheatley::WheatleyCluster`] - one diagram class over one bond source
//! - [`sum::ClusterSum`] - weighted combinations of several clusters
//! - [`selector::DiagramSelector`] - switches between retained diagram classes
//! - [`weights`] - combinatorial prefactors for turning diagram sums into virial coefficients

mod bonds;
pub mod selector;
pub mod sum;
pub mod weights;
pub mod wheatley;

use crate::core::geometry::pair_cache::{GeometryBuffer, PairGeometryCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Current,
    Trial,
}

impl Side {
    #[inline]
    pub fn select(self, cache: &PairGeometryCache) -> &GeometryBuffer {
        match self {
            Self::Current => cache.current(),
            Self::Trial => cache.trial(),
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Trial => 1,
        }
    }
}

pub trait ClusterValue: Send {
    fn n_points(&self) -> usize;

    /// Value of the cluster for the `side` buffer of `cache` at inverse temperature `beta`.
    ///
    /// Repeated calls for an unchanged buffer return the cached result.
    fn evaluate(&mut self, cache: &PairGeometryCache, side: Side, beta: f64) -> f64;

    fn trial_notify(&mut self) {}

    fn accept_notify(&mut self) {}

    fn reject_notify(&mut self) {}
}

impl<T: ClusterValue + ?Sized> ClusterValue for Box<T> {
    fn n_points(&self) -> usize {
        (**self).n_points()
    }

    fn evaluate(&mut self, cache: &PairGeometryCache, side: Side, beta: f64) -> f64 {
        (**self).evaluate(cache, side, beta)
    }

    fn trial_notify(&mut self) {
        (**self).trial_notify()
    }

    fn accept_notify(&mut self) {
        (**self).accept_notify()
    }

    fn reject_notify(&mut self) {
        (**self).reject_notify()
    }
}

/// Identifies one geometry buffer state at one β across every cache a cluster may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stamp {
    cache_id: u64,
    version: u64,
    beta_bits: u64,
}

impl Stamp {
    pub(crate) fn of(geometry: &GeometryBuffer, beta: f64) -> Self {
        Self {
            cache_id: geometry.cache_id(),
            version: geometry.version(),
            beta_bits: beta.to_bits(),
        }
    }

    /// Stamp of the buffer state `geometry` was derived from.
    pub(crate) fn parent_of(geometry: &GeometryBuffer, beta: f64) -> Self {
        Self {
            version: geometry.parent_version(),
            ..Self::of(geometry, beta)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedValue {
    stamp: Stamp,
    value: f64,
}

/// Last computed value for each side, keyed by cache identity, geometry version and β.
#[derive(Debug, Clone, Default)]
pub(crate) struct SidedValues {
    slots: [Option<CachedValue>; 2],
}

impl SidedValues {
    pub(crate) fn get(&self, side: Side, geometry: &GeometryBuffer, beta: f64) -> Option<f64> {
        let stamp = Stamp::of(geometry, beta);
        self.slots[side.index()]
            .filter(|c| c.stamp == stamp)
            .map(|c| c.value)
    }

    pub(crate) fn store(&mut self, side: Side, geometry: &GeometryBuffer, beta: f64, value: f64) {
        self.slots[side.index()] = Some(CachedValue {
            stamp: Stamp::of(geometry, beta),
            value,
        });
    }

    pub(crate) fn invalidate(&mut self, side: Side) {
        self.slots[side.index()] = None;
    }

    pub(crate) fn swap(&mut self) {
        self.slots.swap(0, 1);
    }
}
