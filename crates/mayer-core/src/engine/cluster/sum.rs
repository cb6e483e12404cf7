use super::{ClusterValue, Side, SidedValues};
use crate::core::geometry::pair_cache::PairGeometryCache;
use crate::engine::config::ConfigError;
use serde::Deserialize;

/// How weighted component values are merged into one cluster value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Combination {
    /// `Σ w_i v_i`
    #[default]
    Linear,
    /// `|Σ w_i v_i|`
    Absolute,
    /// `sqrt(Σ w_i v_i²)`, positive wherever any component is nonzero.
    Umbrella,
    /// `1` when `Σ w_i v_i` is nonzero, else `0`.
    Indicator,
}

impl Combination {
    pub fn combine(self, weights: &[f64], values: &[f64]) -> f64 {
        debug_assert_eq!(weights.len(), values.len());
        let linear = || weights.iter().zip(values).map(|(w, v)| w * v).sum::<f64>();
        match self {
            Self::Linear => linear(),
            Self::Absolute => linear().abs(),
            Self::Umbrella => weights
                .iter()
                .zip(values)
                .map(|(w, v)| w * v * v)
                .sum::<f64>()
                .sqrt(),
            Self::Indicator => {
                let sum = linear();
                if sum.is_nan() {
                    sum
                } else if sum != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Weighted combination of several clusters over the same point set.
pub struct ClusterSum {
    n: usize,
    clusters: Vec<Box<dyn ClusterValue>>,
    weights: Vec<f64>,
    combination: Combination,
    components: Vec<f64>,
    values: SidedValues,
}

impl ClusterSum {
    pub fn new(
        clusters: Vec<Box<dyn ClusterValue>>,
        weights: Vec<f64>,
        combination: Combination,
    ) -> Result<Self, ConfigError> {
        let first = clusters.first().ok_or(ConfigError::EmptyCombination)?;
        let n = first.n_points();
        if weights.len() != clusters.len() {
            return Err(ConfigError::WeightCountMismatch {
                clusters: clusters.len(),
                weights: weights.len(),
            });
        }
        if let Some(mismatch) = clusters.iter().find(|c| c.n_points() != n) {
            return Err(ConfigError::PointCountMismatch {
                expected: n,
                found: mismatch.n_points(),
            });
        }
        Ok(Self {
            n,
            components: vec![0.0; clusters.len()],
            clusters,
            weights,
            combination,
            values: SidedValues::default(),
        })
    }

    pub fn combination(&self) -> Combination {
        self.combination
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Unweighted component values from the most recent non-cached evaluation.
    pub fn components(&self) -> &[f64] {
        &self.components
    }
}

impl ClusterValue for ClusterSum {
    fn n_points(&self) -> usize {
        self.n
    }

    fn evaluate(&mut self, cache: &PairGeometryCache, side: Side, beta: f64) -> f64 {
        let geometry = side.select(cache);
        if let Some(value) = self.values.get(side, geometry, beta) {
            return value;
        }
        for (slot, cluster) in self.components.iter_mut().zip(self.clusters.iter_mut()) {
            *slot = cluster.evaluate(cache, side, beta);
        }
        let value = self.combination.combine(&self.weights, &self.components);
        self.values.store(side, geometry, beta, value);
        value
    }

    fn trial_notify(&mut self) {
        self.values.invalidate(Side::Trial);
        self.clusters.iter_mut().for_each(|c| c.trial_notify());
    }

    fn accept_notify(&mut self) {
        self.values.swap();
        self.clusters.iter_mut().for_each(|c| c.accept_notify());
    }

    fn reject_notify(&mut self) {
        self.values.invalidate(Side::Trial);
        self.clusters.iter_mut().for_each(|c| c.reject_notify());
    }
}
