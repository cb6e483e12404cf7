use super::{Dirty, GeometryError, pair_count, pair_index, validate_point_count};
use nalgebra::Point3;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

fn next_cache_id() -> u64 {
    NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed)
}

/// One consistent snapshot of point positions and their squared pair distances.
///
/// Every buffer carries a version stamp issued by its owning [`PairGeometryCache`], together
/// with the version it was derived from and the points that changed on the way. Versions are
/// only comparable between buffers of the same cache, so cluster values key their caches on
/// `(cache_id, version)`.
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    n: usize,
    cache_id: u64,
    positions: Vec<Point3<f64>>,
    r2: Vec<f64>,
    version: u64,
    parent: u64,
    dirty: Dirty,
}

impl GeometryBuffer {
    fn new(positions: Vec<Point3<f64>>, cache_id: u64, version: u64) -> Self {
        let n = positions.len();
        let mut buffer = Self {
            n,
            cache_id,
            positions,
            r2: vec![0.0; pair_count(n)],
            version,
            parent: version,
            dirty: Dirty::All,
        };
        buffer.recompute_all();
        buffer
    }

    pub fn n_points(&self) -> usize {
        self.n
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Squared distance between points `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics unless `i < j < n`. Pair ordering is a caller contract and is never corrected.
    #[inline]
    pub fn r2(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < j && j < self.n,
            "pair ({i}, {j}) must satisfy i < j < {}",
            self.n
        );
        self.r2[pair_index(self.n, i, j)]
    }

    /// All squared distances in upper-triangular pair order.
    pub fn pair_distances(&self) -> &[f64] {
        &self.r2
    }

    /// Identity of the [`PairGeometryCache`] that issued this buffer's version stamps.
    pub fn cache_id(&self) -> u64 {
        self.cache_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn parent_version(&self) -> u64 {
        self.parent
    }

    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    fn recompute_all(&mut self) {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                self.r2[pair_index(self.n, i, j)] =
                    (self.positions[j] - self.positions[i]).norm_squared();
            }
        }
    }

    fn recompute_point(&mut self, p: usize) {
        let anchor = self.positions[p];
        for q in 0..self.n {
            if q == p {
                continue;
            }
            let (i, j) = if q < p { (q, p) } else { (p, q) };
            self.r2[pair_index(self.n, i, j)] = (self.positions[q] - anchor).norm_squared();
        }
    }

    fn copy_point_from(&mut self, other: &GeometryBuffer, p: usize) {
        self.positions[p] = other.positions[p];
        for q in 0..self.n {
            if q == p {
                continue;
            }
            let idx = if q < p {
                pair_index(self.n, q, p)
            } else {
                pair_index(self.n, p, q)
            };
            self.r2[idx] = other.r2[idx];
        }
    }

    fn copy_all_from(&mut self, other: &GeometryBuffer) {
        self.positions.copy_from_slice(&other.positions);
        self.r2.copy_from_slice(&other.r2);
    }

    fn copy_stamp_from(&mut self, other: &GeometryBuffer) {
        self.version = other.version;
        self.parent = other.parent;
        self.dirty = other.dirty;
    }
}

/// Current and trial geometry for one point set, preallocated once per run.
///
/// The trial buffer is scratch space for a single pending proposal. The cache remembers which
/// rows of the trial buffer diverged from the current buffer, so resynchronising before the
/// next proposal costs O(n) after a single-point move instead of a full copy.
///
/// Each cache, including every clone, gets its own identity, so stamps from different caches
/// never compare equal.
#[derive(Debug)]
pub struct PairGeometryCache {
    current: GeometryBuffer,
    trial: GeometryBuffer,
    divergence: Option<Dirty>,
    next_version: u64,
}

impl PairGeometryCache {
    pub fn new(positions: Vec<Point3<f64>>) -> Result<Self, GeometryError> {
        validate_point_count(positions.len())?;
        if let Some(idx) = positions
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(GeometryError::NonFinitePosition(idx));
        }

        let current = GeometryBuffer::new(positions, next_cache_id(), 1);
        let trial = current.clone();
        Ok(Self {
            current,
            trial,
            divergence: None,
            next_version: 2,
        })
    }

    pub fn n_points(&self) -> usize {
        self.current.n
    }

    pub fn id(&self) -> u64 {
        self.current.cache_id
    }

    pub fn current(&self) -> &GeometryBuffer {
        &self.current
    }

    pub fn trial(&self) -> &GeometryBuffer {
        &self.trial
    }

    /// Version of the current (settled) geometry.
    pub fn version(&self) -> u64 {
        self.current.version
    }

    /// Squared distance between `i` and `j` in the current geometry. Requires `i < j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.current.r2(i, j)
    }

    /// Brings the trial buffer back in line with the current buffer and hands out its
    /// positions for mutation. The caller must follow up with [`reset`](Self::reset) or
    /// [`reset_one`](Self::reset_one) naming what it changed.
    pub fn begin_trial(&mut self) -> &mut [Point3<f64>] {
        match self.divergence.take() {
            None => {}
            Some(Dirty::Point(p)) => self.trial.copy_point_from(&self.current, p),
            Some(Dirty::All) => self.trial.copy_all_from(&self.current),
        }
        self.trial.copy_stamp_from(&self.current);
        // Until the mutator reports what it touched, assume everything.
        self.divergence = Some(Dirty::All);
        &mut self.trial.positions
    }

    /// Recomputes every trial distance from the trial positions.
    pub fn reset(&mut self) {
        self.trial.recompute_all();
        self.stamp_trial(Dirty::All);
    }

    /// Recomputes the `n - 1` trial distances touching `dirty`.
    pub fn reset_one(&mut self, dirty: usize) {
        assert!(
            dirty < self.current.n,
            "dirty point {dirty} out of range for {} points",
            self.current.n
        );
        self.trial.recompute_point(dirty);
        self.stamp_trial(Dirty::Point(dirty));
    }

    pub fn apply(&mut self, dirty: Dirty) {
        match dirty {
            Dirty::Point(p) => self.reset_one(p),
            Dirty::All => self.reset(),
        }
    }

    /// Promotes the trial buffer to current in O(1). The old current buffer becomes trial
    /// scratch and diverges from the new current exactly where the accepted move did.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.trial);
    }

    fn stamp_trial(&mut self, dirty: Dirty) {
        self.trial.parent = self.current.version;
        self.trial.version = self.next_version;
        self.trial.dirty = dirty;
        self.next_version += 1;
        self.divergence = Some(dirty);
    }
}

impl Clone for PairGeometryCache {
    fn clone(&self) -> Self {
        let id = next_cache_id();
        let mut current = self.current.clone();
        let mut trial = self.trial.clone();
        current.cache_id = id;
        trial.cache_id = id;
        Self {
            current,
            trial,
            divergence: self.divergence,
            next_version: self.next_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const TOLERANCE: f64 = 1e-12;

    fn square_positions() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn assert_buffers_match(a: &GeometryBuffer, b: &GeometryBuffer) {
        for (x, y) in a.pair_distances().iter().zip(b.pair_distances()) {
            assert!((x - y).abs() < TOLERANCE, "{x} != {y}");
        }
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn new_computes_all_squared_distances() {
        let cache = PairGeometryCache::new(square_positions()).unwrap();
        assert_eq!(cache.n_points(), 4);
        assert_eq!(cache.distance(0, 1), 1.0);
        assert_eq!(cache.distance(0, 2), 2.0);
        assert_eq!(cache.distance(1, 3), 2.0);
        assert_eq!(cache.distance(2, 3), 1.0);
    }

    #[test]
    fn new_rejects_degenerate_inputs() {
        assert_eq!(
            PairGeometryCache::new(vec![Point3::origin()]).unwrap_err(),
            GeometryError::TooFewPoints(1)
        );
        let mut positions = square_positions();
        positions[2].y = f64::NAN;
        assert_eq!(
            PairGeometryCache::new(positions).unwrap_err(),
            GeometryError::NonFinitePosition(2)
        );
    }

    #[test]
    #[should_panic(expected = "must satisfy i < j")]
    fn distance_panics_on_reversed_pair() {
        let cache = PairGeometryCache::new(square_positions()).unwrap();
        let _ = cache.distance(2, 1);
    }

    #[test]
    fn reset_one_matches_full_reset_for_same_geometry() {
        let mut incremental = PairGeometryCache::new(square_positions()).unwrap();
        let mut full = incremental.clone();

        let shift = Vector3::new(0.3, -0.2, 0.7);
        incremental.begin_trial()[2] += shift;
        incremental.reset_one(2);
        full.begin_trial()[2] += shift;
        full.reset();

        assert_buffers_match(incremental.trial(), full.trial());
        assert_eq!(incremental.trial().dirty(), Dirty::Point(2));
        assert_eq!(full.trial().dirty(), Dirty::All);
    }

    #[test]
    fn trial_does_not_touch_current_buffer() {
        let mut cache = PairGeometryCache::new(square_positions()).unwrap();
        let before = cache.current().clone();

        cache.begin_trial()[1] = Point3::new(5.0, 5.0, 5.0);
        cache.reset_one(1);

        assert_eq!(cache.current().pair_distances(), before.pair_distances());
        assert_eq!(cache.version(), before.version());
        assert_ne!(cache.trial().version(), before.version());
        assert_eq!(cache.trial().parent_version(), before.version());
    }

    #[test]
    fn swap_promotes_trial_geometry() {
        let mut cache = PairGeometryCache::new(square_positions()).unwrap();
        cache.begin_trial()[3] = Point3::new(0.0, 3.0, 0.0);
        cache.reset_one(3);
        let trial_version = cache.trial().version();

        cache.swap();

        assert_eq!(cache.version(), trial_version);
        assert_eq!(cache.distance(0, 3), 9.0);
    }

    #[test]
    fn begin_trial_resynchronises_after_discarded_trial() {
        let mut cache = PairGeometryCache::new(square_positions()).unwrap();
        cache.begin_trial()[1] = Point3::new(9.0, 9.0, 9.0);
        cache.reset_one(1);

        // Discarded: the next trial must start from the current geometry again.
        let positions = cache.begin_trial();
        assert_eq!(positions[1], Point3::new(1.0, 0.0, 0.0));
        cache.reset_one(2);
        assert_buffers_match(cache.trial(), cache.current());
    }

    #[test]
    fn begin_trial_resynchronises_after_accepted_trial() {
        let mut cache = PairGeometryCache::new(square_positions()).unwrap();
        cache.begin_trial()[2] = Point3::new(2.0, 2.0, 0.0);
        cache.reset_one(2);
        cache.swap();

        cache.begin_trial();
        cache.reset_one(0);
        assert_buffers_match(cache.trial(), cache.current());
        assert_eq!(cache.trial().positions()[2], Point3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn every_cache_and_clone_has_its_own_identity() {
        let a = PairGeometryCache::new(square_positions()).unwrap();
        let b = PairGeometryCache::new(square_positions()).unwrap();
        let c = a.clone();
        assert_eq!(a.version(), b.version());
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.current().cache_id(), a.trial().cache_id());
        assert_eq!(c.current().cache_id(), c.id());
    }

    #[test]
    fn versions_increase_monotonically() {
        let mut cache = PairGeometryCache::new(square_positions()).unwrap();
        let mut last = cache.version();
        for step in 0..5 {
            cache.begin_trial()[1].x += 0.1;
            cache.apply(if step % 2 == 0 {
                Dirty::Point(1)
            } else {
                Dirty::All
            });
            assert!(cache.trial().version() > last);
            last = cache.trial().version();
            cache.swap();
        }
    }
}
