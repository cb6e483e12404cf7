use super::subset::{Subset, contains, full_set, members, submasks};
use crate::core::geometry::pair_index;

/// Largest point set the PY tables are built for.
///
/// The three tables hold `3 n² 2^n` entries, about 75 MB at this size and gigabytes at
/// [`MAX_POINTS`](crate::core::geometry::MAX_POINTS).
pub const MAX_PY_POINTS: usize = 14;

/// Two-root diagram tables under the Percus–Yevick closure.
///
/// Entries are indexed by an ordered root pair `(a, b)` and the set `W` of field points,
/// which never contains either root. For every entry:
///
/// - series `s[a][b][W] = Σ_{k ∈ W} Σ_{W1 ⊆ W\{k}} c[a][k][W1] · h[k][b][W \ {k} \ W1]`
///   (Ornstein–Zernike chain split at its first nodal point `k`)
/// - direct `c[a][b][∅] = f_ab`, and `c[a][b][W] = f_ab · s[a][b][W]` otherwise
/// - total `h = c + s`
///
/// `c[0][1][rest]` collects the PY-approximate diagrams on the full point set. Each of them
/// is biconnected and contains the `0-1` bond, so subtracting it from the biconnected total
/// leaves the diagrams PY misses.
#[derive(Debug, Clone)]
pub struct PercusYevickTables {
    n: usize,
    width: usize,
    c: Vec<f64>,
    h: Vec<f64>,
    s: Vec<f64>,
}

impl PercusYevickTables {
    /// # Panics
    ///
    /// Panics unless `2 <= n <= MAX_PY_POINTS`.
    pub fn new(n: usize) -> Self {
        assert!(
            (2..=MAX_PY_POINTS).contains(&n),
            "PY tables support 2..={MAX_PY_POINTS} points, got {n}"
        );
        let width = 1usize << n;
        let len = n * n * width;
        Self {
            n,
            width,
            c: vec![0.0; len],
            h: vec![0.0; len],
            s: vec![0.0; len],
        }
    }

    #[inline]
    fn idx(&self, a: usize, b: usize, field: Subset) -> usize {
        (a * self.n + b) * self.width + field as usize
    }

    pub fn direct(&self, a: usize, b: usize, field: Subset) -> f64 {
        self.c[self.idx(a, b, field)]
    }

    pub fn total(&self, a: usize, b: usize, field: Subset) -> f64 {
        self.h[self.idx(a, b, field)]
    }

    pub fn series(&self, a: usize, b: usize, field: Subset) -> f64 {
        self.s[self.idx(a, b, field)]
    }

    /// Fills every table from Mayer bonds in upper-triangular pair order.
    ///
    /// Field sets are visited in increasing bitmask order, so every convolution term reads
    /// entries over strictly smaller field sets.
    pub fn compute(&mut self, f: &[f64]) {
        let n = self.n;
        let bond = |a: usize, b: usize| {
            if a < b {
                f[pair_index(n, a, b)]
            } else {
                f[pair_index(n, b, a)]
            }
        };

        for field in 0..=full_set(n) {
            for a in 0..n {
                if contains(field, a) {
                    continue;
                }
                for b in 0..n {
                    if b == a || contains(field, b) {
                        continue;
                    }
                    let f_ab = bond(a, b);
                    let idx = self.idx(a, b, field);
                    if field == 0 {
                        self.s[idx] = 0.0;
                        self.c[idx] = f_ab;
                        self.h[idx] = f_ab;
                        continue;
                    }

                    let mut series = 0.0;
                    for k in members(field) {
                        let remaining = field ^ (1 << k);
                        for left in submasks(remaining) {
                            let right = remaining ^ left;
                            series += self.c[self.idx(a, k, left)] * self.h[self.idx(k, b, right)];
                        }
                    }
                    let direct = f_ab * series;
                    self.s[idx] = series;
                    self.c[idx] = direct;
                    self.h[idx] = direct + series;
                }
            }
        }
    }

    /// `c[0][1][all other points]`.
    pub fn root_value(&self) -> f64 {
        self.direct(0, 1, full_set(self.n) ^ 0b11)
    }
}
