use super::{ClusterValue, Side};
use crate::core::geometry::pair_cache::PairGeometryCache;
use crate::engine::config::ConfigError;
use rand::Rng;
use tracing::debug;

/// Holds several diagram classes over one point set and reports the active one.
///
/// Every retained cluster receives every notification, so each keeps bond tables and cached
/// values in step with the geometry. Switching the active class therefore never discards
/// work, and reverting a switch returns to the previous class's cached value.
pub struct DiagramSelector {
    n: usize,
    clusters: Vec<Box<dyn ClusterValue>>,
    active: usize,
    previous: Option<usize>,
}

impl DiagramSelector {
    pub fn new(clusters: Vec<Box<dyn ClusterValue>>) -> Result<Self, ConfigError> {
        let n = clusters
            .first()
            .ok_or(ConfigError::EmptyCombination)?
            .n_points();
        if let Some(mismatch) = clusters.iter().find(|c| c.n_points() != n) {
            return Err(ConfigError::PointCountMismatch {
                expected: n,
                found: mismatch.n_points(),
            });
        }
        Ok(Self {
            n,
            clusters,
            active: 0,
            previous: None,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn set_active(&mut self, index: usize) {
        assert!(
            index < self.clusters.len(),
            "diagram index {index} out of range for {} classes",
            self.clusters.len()
        );
        self.previous = Some(self.active);
        self.active = index;
    }

    /// Switches to a different class chosen uniformly, remembering the one it replaced.
    pub fn randomize_diagram<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let count = self.clusters.len();
        let next = if count > 1 {
            (self.active + rng.gen_range(1..count)) % count
        } else {
            self.active
        };
        debug!(from = self.active, to = next, "Diagram class switched.");
        self.set_active(next);
        next
    }

    /// Restores the class active before the last switch. Returns `false` if there is none.
    pub fn revert_diagram(&mut self) -> bool {
        match self.previous.take() {
            Some(previous) => {
                self.active = previous;
                true
            }
            None => false,
        }
    }
}

impl ClusterValue for DiagramSelector {
    fn n_points(&self) -> usize {
        self.n
    }

    fn evaluate(&mut self, cache: &PairGeometryCache, side: Side, beta: f64) -> f64 {
        self.clusters[self.active].evaluate(cache, side, beta)
    }

    fn trial_notify(&mut self) {
        self.clusters.iter_mut().for_each(|c| c.trial_notify());
    }

    fn accept_notify(&mut self) {
        self.clusters.iter_mut().for_each(|c| c.accept_notify());
    }

    fn reject_notify(&mut self) {
        self.clusters.iter_mut().for_each(|c| c.reject_notify());
    }
}
