use super::cluster::ClusterValue;
use super::cluster::wheatley::WheatleyCluster;
use super::config::ClusterConfig;
use super::error::EngineError;
use super::trial::{TrialError, TrialProtocol};
use crate::core::geometry::Dirty;
use crate::core::geometry::pair_cache::PairGeometryCache;
use crate::core::params::PotentialParams;
use nalgebra::{Point3, Vector3};
use rand::prelude::*;
use tracing::{debug, info, instrument};

/// Mutates trial positions and reports which points changed.
///
/// Point 0 is the reference point and stays at the origin.
pub trait TrialMove {
    fn propose<R: Rng + ?Sized>(&self, positions: &mut [Point3<f64>], rng: &mut R) -> Dirty;
}

/// Displaces one non-reference point uniformly within a cube of half-width `step_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementMove {
    pub step_size: f64,
}

impl TrialMove for DisplacementMove {
    fn propose<R: Rng + ?Sized>(&self, positions: &mut [Point3<f64>], rng: &mut R) -> Dirty {
        let point = rng.gen_range(1..positions.len());
        let h = self.step_size;
        positions[point] += Vector3::new(
            rng.gen_range(-h..=h),
            rng.gen_range(-h..=h),
            rng.gen_range(-h..=h),
        );
        Dirty::Point(point)
    }
}

/// Places every non-reference point uniformly in a cube of edge `box_length` centred on the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleMove {
    pub box_length: f64,
}

impl TrialMove for ResampleMove {
    fn propose<R: Rng + ?Sized>(&self, positions: &mut [Point3<f64>], rng: &mut R) -> Dirty {
        let half = 0.5 * self.box_length;
        for p in positions.iter_mut().skip(1) {
            *p = Point3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            );
        }
        Dirty::All
    }
}

/// Metropolis test on a sampling-weight ratio. NaN is always rejected.
pub fn metropolis_accept<R: Rng + ?Sized>(ratio: f64, rng: &mut R) -> bool {
    if ratio.is_nan() {
        false
    } else if ratio >= 1.0 {
        true
    } else {
        rng.gen_range(0.0..1.0) < ratio
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AcceptanceStats {
    pub attempted: u64,
    pub accepted: u64,
}

impl AcceptanceStats {
    pub fn record(&mut self, accepted: bool) {
        self.attempted += 1;
        if accepted {
            self.accepted += 1;
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub accepted: bool,
    /// Settled cluster value after the step.
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSummary {
    pub steps: u64,
    pub acceptance: f64,
    /// Mean of `sign(value)` over the settled configurations visited.
    pub average_sign: f64,
}

/// Importance sampler over `|cluster value|` driven by one [`TrialMove`].
pub struct MayerSampler<C: ClusterValue, M: TrialMove> {
    protocol: TrialProtocol<C>,
    mover: M,
    rng: StdRng,
    stats: AcceptanceStats,
}

impl<C: ClusterValue, M: TrialMove> MayerSampler<C, M> {
    pub fn new(protocol: TrialProtocol<C>, mover: M, seed: u64) -> Self {
        Self {
            protocol,
            mover,
            rng: StdRng::seed_from_u64(seed),
            stats: AcceptanceStats::default(),
        }
    }

    pub fn protocol(&self) -> &TrialProtocol<C> {
        &self.protocol
    }

    pub fn protocol_mut(&mut self) -> &mut TrialProtocol<C> {
        &mut self.protocol
    }

    pub fn stats(&self) -> AcceptanceStats {
        self.stats
    }

    pub fn step(&mut self) -> Result<StepOutcome, TrialError> {
        let Self {
            protocol,
            mover,
            rng,
            ..
        } = self;
        protocol.propose_trial(|positions| mover.propose(positions, &mut *rng))?;
        let evaluation = protocol.evaluate_trial()?;

        let accepted = metropolis_accept(evaluation.ratio, rng);
        if accepted {
            protocol.accept()?;
        } else {
            protocol.reject()?;
        }
        self.stats.record(accepted);
        Ok(StepOutcome {
            accepted,
            value: self.protocol.value(),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self, steps: u64) -> Result<SamplerSummary, TrialError> {
        let start = self.stats;
        let mut sign_sum = 0.0;
        for _ in 0..steps {
            let outcome = self.step()?;
            sign_sum += value_sign(outcome.value);
        }
        let attempted = self.stats.attempted - start.attempted;
        let accepted = self.stats.accepted - start.accepted;
        let summary = SamplerSummary {
            steps,
            acceptance: if attempted == 0 {
                0.0
            } else {
                accepted as f64 / attempted as f64
            },
            average_sign: if steps == 0 {
                0.0
            } else {
                sign_sum / steps as f64
            },
        };
        debug!(?summary, "Sampling block finished.");
        Ok(summary)
    }
}

impl MayerSampler<WheatleyCluster, DisplacementMove> {
    /// Builds a displacement-move sampler for one diagram class from configuration and
    /// potential parameters.
    #[instrument(skip_all, name = "mayer_sampler_from_config", fields(n = config.n_points, seed = seed))]
    pub fn from_config(
        config: &ClusterConfig,
        params: &PotentialParams,
        positions: Vec<Point3<f64>>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let cache = PairGeometryCache::new(positions)?;
        let cluster = WheatleyCluster::from_config(config, params)?;
        let protocol = TrialProtocol::new(cache, cluster, config.temperature)?;
        info!(
            initial_value = protocol.value(),
            step_size = config.step_size,
            "Mayer sampler ready."
        );
        Ok(Self::new(
            protocol,
            DisplacementMove {
                step_size: config.step_size,
            },
            seed,
        ))
    }
}

fn value_sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
