/// A spherically symmetric pair potential in reduced units, evaluated from the squared separation.
///
/// `f64::INFINITY` marks a hard overlap. Implementations do not clamp short distances.
pub trait PairPotential: Send + Sync {
    fn energy(&self, r2: f64) -> f64;
}

#[inline]
pub fn lennard_jones_12_6(r2: f64, sigma: f64, epsilon: f64) -> f64 {
    let rho2 = sigma * sigma / r2;
    let rho6 = rho2 * rho2 * rho2;
    // Factored so that r2 -> 0 gives +inf instead of inf - inf.
    4.0 * epsilon * rho6 * (rho6 - 1.0)
}

#[inline]
pub fn square_well(r2: f64, sigma: f64, lambda: f64, epsilon: f64) -> f64 {
    if r2.is_nan() {
        return f64::NAN;
    }
    if r2 < sigma * sigma {
        f64::INFINITY
    } else if r2 < lambda * lambda * sigma * sigma {
        -epsilon
    } else {
        0.0
    }
}

#[inline]
pub fn hard_sphere(r2: f64, sigma: f64) -> f64 {
    if r2.is_nan() {
        return f64::NAN;
    }
    if r2 < sigma * sigma {
        f64::INFINITY
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    pub sigma: f64,
    pub epsilon: f64,
}

impl PairPotential for LennardJones {
    #[inline]
    fn energy(&self, r2: f64) -> f64 {
        lennard_jones_12_6(r2, self.sigma, self.epsilon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWell {
    pub sigma: f64,
    pub lambda: f64,
    pub epsilon: f64,
}

impl PairPotential for SquareWell {
    #[inline]
    fn energy(&self, r2: f64) -> f64 {
        square_well(r2, self.sigma, self.lambda, self.epsilon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardSpherePotential {
    pub sigma: f64,
}

impl PairPotential for HardSpherePotential {
    #[inline]
    fn energy(&self, r2: f64) -> f64 {
        hard_sphere(r2, self.sigma)
    }
}
