use super::cluster::{ClusterValue, Side};
use super::config::{ConfigError, validate_temperature};
use crate::core::geometry::Dirty;
use crate::core::geometry::pair_cache::PairGeometryCache;
use nalgebra::Point3;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TrialError {
    #[error("No trial is pending")]
    NoTrialPending,

    #[error("A trial is already pending; accept or reject it first")]
    TrialAlreadyPending,

    #[error("The pending trial has not been evaluated")]
    TrialNotEvaluated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialEvaluation {
    /// Cluster value on the trial geometry.
    pub value: f64,
    /// `|trial| / |settled|`, the importance-sampling weight ratio.
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialState {
    Settled,
    TrialPending { evaluation: Option<TrialEvaluation> },
}

/// Ratio of sampling weights `|new| / |old|`.
///
/// NaN in the new value propagates so the driver rejects it. A settled value of exactly zero
/// gives `+∞`, so any move out of a zero-weight configuration is taken.
pub fn sampling_ratio(old: f64, new: f64) -> f64 {
    if new.is_nan() {
        f64::NAN
    } else if old == 0.0 {
        f64::INFINITY
    } else {
        new.abs() / old.abs()
    }
}

/// Drives one cluster value through propose, evaluate, then accept or reject.
///
/// The protocol owns the geometry cache and the cluster, and is the only place notifications
/// are issued, so the per-side caches of the cluster always agree with the buffers of the
/// cache. Calls made in the wrong state return [`TrialError`] and change nothing.
pub struct TrialProtocol<C: ClusterValue> {
    cache: PairGeometryCache,
    cluster: C,
    beta: f64,
    value: f64,
    state: TrialState,
}

impl<C: ClusterValue> TrialProtocol<C> {
    pub fn new(
        cache: PairGeometryCache,
        mut cluster: C,
        temperature: f64,
    ) -> Result<Self, ConfigError> {
        if cluster.n_points() != cache.n_points() {
            return Err(ConfigError::PointCountMismatch {
                expected: cluster.n_points(),
                found: cache.n_points(),
            });
        }
        validate_temperature(temperature)?;
        let beta = 1.0 / temperature;
        let value = cluster.evaluate(&cache, Side::Current, beta);
        if !value.is_finite() {
            warn!(value, "Initial configuration has a non-finite cluster value.");
        }
        Ok(Self {
            cache,
            cluster,
            beta,
            value,
            state: TrialState::Settled,
        })
    }

    /// Cluster value of the settled configuration.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn cache(&self) -> &PairGeometryCache {
        &self.cache
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Squared distance between `i < j` in the settled configuration.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.cache.distance(i, j)
    }

    /// Lets `mutate` move points in the trial buffer; it reports which points it touched.
    pub fn propose_trial<F>(&mut self, mutate: F) -> Result<Dirty, TrialError>
    where
        F: FnOnce(&mut [Point3<f64>]) -> Dirty,
    {
        if self.state != TrialState::Settled {
            return Err(TrialError::TrialAlreadyPending);
        }
        let dirty = mutate(self.cache.begin_trial());
        self.cache.apply(dirty);
        self.cluster.trial_notify();
        self.state = TrialState::TrialPending { evaluation: None };
        trace!(?dirty, version = self.cache.trial().version(), "Trial proposed.");
        Ok(dirty)
    }

    pub fn evaluate_trial(&mut self) -> Result<TrialEvaluation, TrialError> {
        let TrialState::TrialPending { evaluation } = self.state else {
            return Err(TrialError::NoTrialPending);
        };
        if let Some(evaluation) = evaluation {
            return Ok(evaluation);
        }

        let value = self.cluster.evaluate(&self.cache, Side::Trial, self.beta);
        if !value.is_finite() {
            warn!(value, "Trial configuration has a non-finite cluster value.");
        }
        let evaluation = TrialEvaluation {
            value,
            ratio: sampling_ratio(self.value, value),
        };
        self.state = TrialState::TrialPending {
            evaluation: Some(evaluation),
        };
        Ok(evaluation)
    }

    pub fn accept(&mut self) -> Result<f64, TrialError> {
        let TrialState::TrialPending { evaluation } = self.state else {
            return Err(TrialError::NoTrialPending);
        };
        let evaluation = evaluation.ok_or(TrialError::TrialNotEvaluated)?;
        self.cache.swap();
        self.cluster.accept_notify();
        self.value = evaluation.value;
        self.state = TrialState::Settled;
        Ok(self.value)
    }

    pub fn reject(&mut self) -> Result<(), TrialError> {
        if self.state == TrialState::Settled {
            return Err(TrialError::NoTrialPending);
        }
        self.cluster.reject_notify();
        self.state = TrialState::Settled;
        Ok(())
    }

    /// Gives mutable access to the cluster between trials and re-reads the settled value.
    pub fn with_cluster_mut<R>(&mut self, f: impl FnOnce(&mut C) -> R) -> Result<R, TrialError> {
        if self.state != TrialState::Settled {
            return Err(TrialError::TrialAlreadyPending);
        }
        let result = f(&mut self.cluster);
        self.value = self.cluster.evaluate(&self.cache, Side::Current, self.beta);
        Ok(result)
    }

    pub fn into_parts(self) -> (PairGeometryCache, C) {
        (self.cache, self.cluster)
    }
}
