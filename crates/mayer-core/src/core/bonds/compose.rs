use super::RadialBond;

/// `f = f_a + f_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondSum<A, B> {
    a: A,
    b: B,
}

impl<A: RadialBond, B: RadialBond> BondSum<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: RadialBond, B: RadialBond> RadialBond for BondSum<A, B> {
    #[inline]
    fn f(&self, r2: f64, beta: f64) -> f64 {
        self.a.f(r2, beta) + self.b.f(r2, beta)
    }
}

/// `f = f_a * f_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondProduct<A, B> {
    a: A,
    b: B,
}

impl<A: RadialBond, B: RadialBond> BondProduct<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: RadialBond, B: RadialBond> RadialBond for BondProduct<A, B> {
    #[inline]
    fn f(&self, r2: f64, beta: f64) -> f64 {
        self.a.f(r2, beta) * self.b.f(r2, beta)
    }
}

/// Pins the inner bond to one temperature regardless of the β handed in by the cluster.
///
/// Used for reference systems, e.g. a hard-sphere or fixed-T bond inside a cluster that is
/// otherwise sampled across temperatures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTemperature<B> {
    inner: B,
    beta: f64,
}

impl<B: RadialBond> FixedTemperature<B> {
    pub fn new(inner: B, temperature: f64) -> Self {
        Self {
            inner,
            beta: 1.0 / temperature,
        }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl<B: RadialBond> RadialBond for FixedTemperature<B> {
    #[inline]
    fn f(&self, r2: f64, _beta: f64) -> f64 {
        self.inner.f(r2, self.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bonds::mayer::{HardSphereBond, MayerBond};
    use crate::core::bonds::potentials::SquareWell;

    fn well() -> MayerBond<SquareWell> {
        MayerBond::new(SquareWell {
            sigma: 1.0,
            lambda: 2.0,
            epsilon: 1.0,
        })
    }

    #[test]
    fn sum_adds_component_bonds() {
        let bond = BondSum::new(HardSphereBond::new(1.0), well());
        // Inside the well but outside the core: 0 + (e^β - 1).
        assert!((bond.f(2.0, 1.0) - (1f64.exp() - 1.0)).abs() < 1e-12);
        // Inside the core: -1 + -1.
        assert_eq!(bond.f(0.5, 1.0), -2.0);
    }

    #[test]
    fn product_multiplies_component_bonds() {
        let bond = BondProduct::new(HardSphereBond::new(1.5), well());
        assert_eq!(bond.f(0.5, 1.0), 1.0);
        assert_eq!(bond.f(3.0, 1.0), 0.0);
    }

    #[test]
    fn composition_propagates_nan() {
        let bond = BondSum::new(HardSphereBond::new(1.0), well());
        assert!(bond.f(f64::NAN, 1.0).is_nan());
    }

    #[test]
    fn fixed_temperature_ignores_supplied_beta() {
        let bond = FixedTemperature::new(well(), 0.5);
        assert_eq!(bond.beta(), 2.0);
        let expected = well().f(2.0, 2.0);
        assert_eq!(bond.f(2.0, 0.1), expected);
        assert_eq!(bond.f(2.0, 7.0), expected);
    }
}
