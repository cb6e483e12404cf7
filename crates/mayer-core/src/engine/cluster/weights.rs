//! Combinatorial prefactors relating full-set diagram sums to virial coefficients.

use std::f64::consts::PI;

pub fn factorial(n: usize) -> f64 {
    (2..=n).map(|k| k as f64).product()
}

/// `-(n-1)/n!`, the factor taking the biconnected sum over `n` labeled points to `B_n`.
pub fn biconnected_prefactor(n: usize) -> f64 {
    -(n as f64 - 1.0) / factorial(n)
}

/// Second virial coefficient of hard spheres, `2πσ³/3`.
///
/// Mayer-sampling runs normalise against this reference integral.
pub fn hard_sphere_b2(sigma: f64) -> f64 {
    2.0 * PI * sigma.powi(3) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-14;

    #[test]
    fn factorial_of_small_values() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
    }

    #[test]
    fn prefactor_matches_known_orders() {
        assert!((biconnected_prefactor(2) + 0.5).abs() < TOLERANCE);
        assert!((biconnected_prefactor(3) + 1.0 / 3.0).abs() < TOLERANCE);
        assert!((biconnected_prefactor(4) + 0.125).abs() < TOLERANCE);
    }

    #[test]
    fn b2_from_two_point_overlap_volume() {
        // B2 = -1/2 ∫ f dr = -1/2 · (-4πσ³/3)
        let sigma: f64 = 1.3;
        let overlap_integral = -4.0 * PI * sigma.powi(3) / 3.0;
        let b2 = biconnected_prefactor(2) * overlap_integral;
        assert!((b2 - hard_sphere_b2(sigma)).abs() < 1e-12);
    }
}
