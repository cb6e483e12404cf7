use super::RadialBond;
use super::potentials::PairPotential;

/// Hard-sphere Mayer bond: `-1` inside the core, `0` outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardSphereBond {
    sigma2: f64,
}

impl HardSphereBond {
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma2: sigma * sigma,
        }
    }
}

impl RadialBond for HardSphereBond {
    #[inline]
    fn f(&self, r2: f64, _beta: f64) -> f64 {
        if r2.is_nan() {
            return f64::NAN;
        }
        if r2 < self.sigma2 { -1.0 } else { 0.0 }
    }
}

/// Soft Mayer bond `exp(-βu(r)) - 1` over an arbitrary pair potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MayerBond<P> {
    potential: P,
}

impl<P: PairPotential> MayerBond<P> {
    pub fn new(potential: P) -> Self {
        Self { potential }
    }

    pub fn potential(&self) -> &P {
        &self.potential
    }
}

impl<P: PairPotential> RadialBond for MayerBond<P> {
    #[inline]
    fn f(&self, r2: f64, beta: f64) -> f64 {
        (-beta * self.potential.energy(r2)).exp_m1()
    }
}
