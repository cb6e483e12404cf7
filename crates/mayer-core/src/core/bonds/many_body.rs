use super::ManyBodyBond;
use crate::core::geometry::pair_cache::GeometryBuffer;
use crate::engine::diagram::subset::members;
use itertools::Itertools;

/// Axilrod–Teller triple-dipole energy from the three squared side lengths of a triangle.
///
/// `u = ν (1 + 3 cos γ1 cos γ2 cos γ3) / (r12 r13 r23)^3`, with the cosines written through
/// the law of cosines so no square roots of individual sides are needed.
#[inline]
pub fn axilrod_teller(r2_ij: f64, r2_ik: f64, r2_jk: f64, nu: f64) -> f64 {
    let product = r2_ij * r2_ik * r2_jk;
    let cosines = (r2_ij + r2_ik - r2_jk) * (r2_ij + r2_jk - r2_ik) * (r2_ik + r2_jk - r2_ij)
        / (8.0 * product);
    nu * (1.0 + 3.0 * cosines) / (product * product.sqrt())
}

/// Non-additive three-body correction: `exp(-β Σ u_AT)` over every triplet of the subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxilrodTeller {
    pub nu: f64,
}

impl AxilrodTeller {
    pub fn new(nu: f64) -> Self {
        Self { nu }
    }

    pub fn subset_energy(&self, subset: u32, geometry: &GeometryBuffer) -> f64 {
        members(subset)
            .tuple_combinations::<(usize, usize, usize)>()
            .map(|(i, j, k)| {
                axilrod_teller(
                    geometry.r2(i, j),
                    geometry.r2(i, k),
                    geometry.r2(j, k),
                    self.nu,
                )
            })
            .sum()
    }
}

impl ManyBodyBond for AxilrodTeller {
    fn correction(&self, subset: u32, geometry: &GeometryBuffer, beta: f64) -> f64 {
        (-beta * self.subset_energy(subset, geometry)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::pair_cache::PairGeometryCache;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-12;

    fn equilateral(side: f64) -> PairGeometryCache {
        PairGeometryCache::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(side, 0.0, 0.0),
            Point3::new(0.5 * side, 0.5 * side * 3f64.sqrt(), 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn axilrod_teller_equilateral_triangle_matches_closed_form() {
        // cos 60° cubed is 1/8, so u = ν (1 + 3/8) / r^9.
        let r: f64 = 1.2;
        let energy = axilrod_teller(r * r, r * r, r * r, 2.0);
        assert!((energy - 2.0 * 1.375 / r.powi(9)).abs() < TOLERANCE);
    }

    #[test]
    fn axilrod_teller_collinear_triplet_is_attractive() {
        // Angles 0°, 0°, 180°: ν (1 + 3 * (-1)) / (1 * 2 * 1)^3.
        let energy = axilrod_teller(1.0, 4.0, 1.0, 1.0);
        assert!((energy - (-0.25)).abs() < TOLERANCE);
    }

    #[test]
    fn correction_is_boltzmann_factor_of_subset_energy() {
        let cache = equilateral(1.0);
        let at = AxilrodTeller::new(0.5);
        let energy = at.subset_energy(0b111, cache.current());
        assert!((energy - 0.5 * 1.375).abs() < TOLERANCE);
        let factor = at.correction(0b111, cache.current(), 2.0);
        assert!((factor - (-2.0 * energy).exp()).abs() < TOLERANCE);
    }

    #[test]
    fn subset_energy_sums_only_member_triplets() {
        let cache = PairGeometryCache::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.1, 0.0, 0.0),
            Point3::new(0.2, 1.3, 0.0),
            Point3::new(0.4, 0.3, 0.9),
            Point3::new(-0.8, 0.5, 0.4),
        ])
        .unwrap();
        let geometry = cache.current();
        let at = AxilrodTeller::new(0.9);
        let triplet = |i: usize, j: usize, k: usize| {
            axilrod_teller(geometry.r2(i, j), geometry.r2(i, k), geometry.r2(j, k), 0.9)
        };

        // Points {0, 1, 3, 4}: four triplets, none touching point 2.
        let expected = triplet(0, 1, 3) + triplet(0, 1, 4) + triplet(0, 3, 4) + triplet(1, 3, 4);
        assert!((at.subset_energy(0b11011, geometry) - expected).abs() < TOLERANCE);
        assert!((at.subset_energy(0b01011, geometry) - triplet(0, 1, 3)).abs() < TOLERANCE);
    }

    #[test]
    fn correction_of_subset_without_triplets_is_unity() {
        let cache = equilateral(1.0);
        assert_eq!(AxilrodTeller::new(1.0).correction(0b011, cache.current(), 1.0), 1.0);
    }
}
