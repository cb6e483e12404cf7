//! # Bond Functions
//!
//! Pairwise Mayer bonds `f = exp(-βu) - 1` and multiplicative many-body corrections.
//!
//! ## Capabilities
//!
//! A bond is evaluated either from the squared distance alone ([`RadialBond`]) or from the
//! full point geometry ([`PointSetBond`]), e.g. for molecules whose interaction depends on
//! more than the separation of their reference sites. The choice is made once, when the
//! [`BondSource`] is built, so the diagram engine never inspects concrete bond types.
//!
//! ## Implementations
//!
//! - [`mayer`] - Hard-sphere step and the soft Mayer function over a [`potentials::PairPotential`]
//! - [`compose`] - Sum and product compositions and a fixed-temperature wrapper
//! - [`many_body`] - Non-additive three-body correction factors
//!
//! Bond functions are pure. Deciding when a bond needs recomputation is the job of the
//! cluster value that owns the bond table.

pub mod compose;
pub mod many_body;
pub mod mayer;
pub mod potentials;

use super::geometry::pair_cache::GeometryBuffer;

/// A Mayer bond that depends only on the squared separation of two points.
pub trait RadialBond: Send + Sync {
    fn f(&self, r2: f64, beta: f64) -> f64;

    #[inline]
    fn e(&self, r2: f64, beta: f64) -> f64 {
        self.f(r2, beta) + 1.0
    }
}

impl<T: RadialBond + ?Sized> RadialBond for Box<T> {
    #[inline]
    fn f(&self, r2: f64, beta: f64) -> f64 {
        (**self).f(r2, beta)
    }
}

/// A Mayer bond evaluated from the whole geometry of the pair `(i, j)`, with `i < j`.
pub trait PointSetBond: Send + Sync {
    fn f(&self, i: usize, j: usize, geometry: &GeometryBuffer, beta: f64) -> f64;
}

impl<F> PointSetBond for F
where
    F: Fn(usize, usize, &GeometryBuffer, f64) -> f64 + Send + Sync,
{
    fn f(&self, i: usize, j: usize, geometry: &GeometryBuffer, beta: f64) -> f64 {
        self(i, j, geometry, beta)
    }
}

/// A multiplicative correction to the product of e-bonds over a subset of at least three points.
///
/// `subset` is a bitmask over point indices. The returned factor is `exp(-β U_nonadd)` for the
/// non-additive energy of exactly those points.
pub trait ManyBodyBond: Send + Sync {
    fn correction(&self, subset: u32, geometry: &GeometryBuffer, beta: f64) -> f64;
}

pub enum BondSource {
    Radial(Box<dyn RadialBond>),
    PointSet(Box<dyn PointSetBond>),
}

impl BondSource {
    pub fn radial(bond: impl RadialBond + 'static) -> Self {
        Self::Radial(Box::new(bond))
    }

    pub fn point_set(bond: impl PointSetBond + 'static) -> Self {
        Self::PointSet(Box::new(bond))
    }

    /// Mayer bond between `i < j` in `geometry`.
    #[inline]
    pub fn f(&self, i: usize, j: usize, geometry: &GeometryBuffer, beta: f64) -> f64 {
        match self {
            Self::Radial(bond) => bond.f(geometry.r2(i, j), beta),
            Self::PointSet(bond) => bond.f(i, j, geometry, beta),
        }
    }
}

impl std::fmt::Debug for BondSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Radial(_) => f.write_str("BondSource::Radial"),
            Self::PointSet(_) => f.write_str("BondSource::PointSet"),
        }
    }
}
