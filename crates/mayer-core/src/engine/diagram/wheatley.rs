use super::subset::{
    Subset, anchored_proper_subsets, full_set, highest_point, lowest_bit, members, size,
};
use crate::core::geometry::{MAX_POINTS, pair_count, pair_index};

/// Subset recursion over all `2^n` subsets of a point set.
///
/// Starting from the Mayer bonds of every pair, the engine fills three tables indexed by
/// subset bitmask:
///
/// - `fQ[S]`, the product of e-bonds over all pairs inside `S`
/// - `fC[S]`, the sum over connected graphs spanning `S`
/// - `fB[S]`, the sum over biconnected graphs spanning `S`
///
/// Each stage reads only the previous one, so callers can inject corrections between them
/// (see [`apply_many_body`](Self::apply_many_body)). Tables are allocated once and
/// overwritten on every recursion; they describe whatever bonds were last passed to
/// [`compute_q`](Self::compute_q). A [`biconnected_value`](Self::biconnected_value) call that
/// short-circuits does not touch them, which [`short_circuited`](Self::short_circuited)
/// reports.
#[derive(Debug, Clone)]
pub struct DiagramEngine {
    n: usize,
    full: Subset,
    f_q: Vec<f64>,
    f_c: Vec<f64>,
    f_b: Vec<f64>,
    scratch: Vec<f64>,
    short_circuited: bool,
}

impl DiagramEngine {
    /// # Panics
    ///
    /// Panics unless `2 <= n <= MAX_POINTS`.
    pub fn new(n: usize) -> Self {
        assert!(
            (2..=MAX_POINTS).contains(&n),
            "diagram engine supports 2..={MAX_POINTS} points, got {n}"
        );
        let size = 1usize << n;
        Self {
            n,
            full: full_set(n),
            f_q: vec![0.0; size],
            f_c: vec![0.0; size],
            f_b: vec![0.0; size],
            scratch: vec![0.0; size],
            short_circuited: false,
        }
    }

    pub fn n_points(&self) -> usize {
        self.n
    }

    pub fn full_set(&self) -> Subset {
        self.full
    }

    pub fn q_table(&self) -> &[f64] {
        &self.f_q
    }

    pub fn c_table(&self) -> &[f64] {
        &self.f_c
    }

    pub fn b_table(&self) -> &[f64] {
        &self.f_b
    }

    /// `true` when the last [`biconnected_value`](Self::biconnected_value) returned through the
    /// degree pre-check, leaving the tables from an earlier bond set in place.
    pub fn short_circuited(&self) -> bool {
        self.short_circuited
    }

    pub fn connected_sum(&self) -> f64 {
        self.f_c[self.full as usize]
    }

    pub fn biconnected_sum(&self) -> f64 {
        self.f_b[self.full as usize]
    }

    /// Builds `fQ` from Mayer bonds `f` in upper-triangular pair order.
    ///
    /// Each subset extends the subset without its highest point by that point's e-bonds,
    /// so the whole table costs O(n 2^n) multiplications.
    pub fn compute_q(&mut self, f: &[f64]) {
        debug_assert_eq!(f.len(), pair_count(self.n));
        self.short_circuited = false;
        self.f_q[0] = 1.0;
        for s in 1..=self.full {
            if size(s) < 2 {
                self.f_q[s as usize] = 1.0;
                continue;
            }
            let high = highest_point(s);
            let rest = s ^ (1 << high);
            let mut product = self.f_q[rest as usize];
            for j in members(rest) {
                product *= f[pair_index(self.n, j, high)] + 1.0;
            }
            self.f_q[s as usize] = product;
        }
    }

    /// Multiplies every `fQ` entry for a subset of three or more points by `correction(S)`.
    ///
    /// Must run after [`compute_q`](Self::compute_q) and before the connectivity stages.
    pub fn apply_many_body<F>(&mut self, mut correction: F)
    where
        F: FnMut(Subset) -> f64,
    {
        for s in 1..=self.full {
            if size(s) >= 3 {
                self.f_q[s as usize] *= correction(s);
            }
        }
    }

    /// Fills `fC` from `fQ` by removing, for every subset, the configurations in which the
    /// component of its lowest point is a proper subset.
    pub fn compute_connected(&mut self) {
        for s in 1..=self.full {
            let anchor = lowest_bit(s);
            let mut value = self.f_q[s as usize];
            for sub in anchored_proper_subsets(s, anchor) {
                value -= self.f_c[sub as usize] * self.f_q[(s ^ sub) as usize];
            }
            self.f_c[s as usize] = value;
        }
    }

    /// Fills `fB` from `fC` by removing graphs with an articulation point, one vertex at a time.
    ///
    /// After processing vertex `v`, `fB[S]` holds the connected graphs on `S` with no
    /// articulation point among vertices `0..=v`. A connected graph whose vertex `v` articulates
    /// splits at `v` into pieces that are each free of articulation at `v`; fixing the piece
    /// that holds the lowest other vertex `t` gives
    ///
    /// `A_v[S] = A_{v-1}[S] - Σ_{t ∈ T ⊊ S\{v}} A_v[T ∪ {v}] · A_{v-1}[S \ T]`.
    pub fn compute_biconnected(&mut self) {
        self.f_b.copy_from_slice(&self.f_c);
        for v in 0..self.n {
            let v_bit: Subset = 1 << v;
            self.scratch.copy_from_slice(&self.f_b);
            for s in 1..=self.full {
                if s & v_bit == 0 || size(s) < 3 {
                    continue;
                }
                let others = s ^ v_bit;
                let t = lowest_bit(others);
                let mut value = self.scratch[s as usize];
                for piece in anchored_proper_subsets(others, t) {
                    value -=
                        self.f_b[(piece | v_bit) as usize] * self.scratch[(s ^ piece) as usize];
                }
                self.f_b[s as usize] = value;
            }
        }
    }

    /// Full-set biconnected sum with the degree pre-check in front of the exact recursion.
    ///
    /// Every vertex of a biconnected graph on three or more points has degree at least two,
    /// so if some point has fewer than two nonzero bonds every graph contains a zero bond and
    /// the sum is exactly zero. The pre-check only ever short-circuits to that exact zero;
    /// otherwise the full recursion runs. The tables are not rewritten when the pre-check
    /// fires; [`short_circuited`](Self::short_circuited) is set instead.
    pub fn biconnected_value(&mut self, f: &[f64]) -> f64 {
        if self.n >= 3 && !Self::degrees_allow_biconnected(self.n, f) {
            self.short_circuited = true;
            return 0.0;
        }
        self.compute_q(f);
        self.compute_connected();
        self.compute_biconnected();
        self.biconnected_sum()
    }

    /// `false` when some point has fewer than two nonzero bonds. NaN bonds count as live.
    pub fn degrees_allow_biconnected(n: usize, f: &[f64]) -> bool {
        (0..n).all(|i| {
            let live = (0..n)
                .filter(|&j| j != i)
                .filter(|&j| {
                    let idx = if i < j {
                        pair_index(n, i, j)
                    } else {
                        pair_index(n, j, i)
                    };
                    f[idx] != 0.0
                })
                .take(2)
                .count();
            live >= 2
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-12;

    pub(crate) fn random_bonds(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..pair_count(n)).map(|_| rng.gen_range(-1.0..1.5)).collect()
    }

    /// Connected with no articulation point, over all `n` points.
    pub(crate) fn is_biconnected(n: usize, edges: &[(usize, usize)]) -> bool {
        let all = full_set(n);
        is_connected(n, all, edges) && (0..n).all(|v| is_connected(n, all ^ (1 << v), edges))
    }

    fn is_connected(n: usize, vertices: Subset, edges: &[(usize, usize)]) -> bool {
        let Some(start) = (0..n).find(|&i| vertices & (1 << i) != 0) else {
            return true;
        };
        let mut seen: Subset = 1 << start;
        loop {
            let mut grown = seen;
            for &(a, b) in edges {
                let (ba, bb) = (1 << a, 1 << b);
                if vertices & ba != 0 && vertices & bb != 0 {
                    if seen & ba != 0 {
                        grown |= bb;
                    }
                    if seen & bb != 0 {
                        grown |= ba;
                    }
                }
            }
            if grown == seen {
                return seen == vertices;
            }
            seen = grown;
        }
    }

    /// Sums bond products over every graph on `n` points accepted by `predicate`.
    pub(crate) fn brute_force_sum<P>(n: usize, f: &[f64], predicate: P) -> f64
    where
        P: Fn(&[(usize, usize)]) -> bool,
    {
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        let mut total = 0.0;
        for mask in 0u64..(1 << pairs.len()) {
            let edges: Vec<_> = (0..pairs.len())
                .filter(|&k| mask & (1 << k) != 0)
                .map(|k| pairs[k])
                .collect();
            if predicate(&edges) {
                total += edges
                    .iter()
                    .map(|&(i, j)| f[pair_index(n, i, j)])
                    .product::<f64>();
            }
        }
        total
    }

    pub(crate) fn brute_force_connected(n: usize, f: &[f64]) -> f64 {
        let all = full_set(n);
        brute_force_sum(n, f, |edges| is_connected(n, all, edges))
    }

    pub(crate) fn brute_force_biconnected(n: usize, f: &[f64]) -> f64 {
        brute_force_sum(n, f, |edges| is_biconnected(n, edges))
    }

    fn engine_for(f: &[f64], n: usize) -> DiagramEngine {
        let mut engine = DiagramEngine::new(n);
        engine.compute_q(f);
        engine.compute_connected();
        engine.compute_biconnected();
        engine
    }

    #[test]
    fn two_points_reduce_to_plain_mayer_function() {
        let f = [-0.37];
        let engine = engine_for(&f, 2);
        assert!((engine.q_table()[0b11] - 0.63).abs() < TOLERANCE);
        assert!((engine.connected_sum() - (0.63 - 1.0)).abs() < TOLERANCE);
        assert!((engine.biconnected_sum() - (-0.37)).abs() < TOLERANCE);
    }

    #[test]
    fn incremental_q_matches_brute_force_product() {
        for n in 2..=7 {
            let f = random_bonds(n, 11 + n as u64);
            let mut engine = DiagramEngine::new(n);
            engine.compute_q(&f);
            let expected: f64 = f.iter().map(|x| x + 1.0).product();
            let got = engine.q_table()[full_set(n) as usize];
            assert!(
                (got - expected).abs() < TOLERANCE * expected.abs().max(1.0),
                "n={n}: {got} vs {expected}"
            );
        }
    }

    #[test]
    fn singleton_subsets_have_unit_tables() {
        let engine = engine_for(&random_bonds(4, 3), 4);
        for i in 0..4 {
            assert_eq!(engine.q_table()[1 << i], 1.0);
            assert_eq!(engine.c_table()[1 << i], 1.0);
        }
    }

    #[test]
    fn connected_sum_matches_graph_enumeration() {
        for n in 3..=5 {
            let f = random_bonds(n, 100 + n as u64);
            let engine = engine_for(&f, n);
            let expected = brute_force_connected(n, &f);
            assert!(
                (engine.connected_sum() - expected).abs() < 1e-10,
                "n={n}: {} vs {expected}",
                engine.connected_sum()
            );
        }
    }

    #[test]
    fn biconnected_sum_matches_graph_enumeration() {
        for n in 3..=5 {
            let f = random_bonds(n, 200 + n as u64);
            let engine = engine_for(&f, n);
            let expected = brute_force_biconnected(n, &f);
            assert!(
                (engine.biconnected_sum() - expected).abs() < 1e-10,
                "n={n}: {} vs {expected}",
                engine.biconnected_sum()
            );
        }
    }

    #[test]
    fn biconnected_subtables_match_enumeration_on_every_subset() {
        let n = 4;
        let f = random_bonds(n, 7);
        let engine = engine_for(&f, n);
        // The triangle {0, 1, 3}: only the full triangle is biconnected.
        let triangle = f[pair_index(n, 0, 1)] * f[pair_index(n, 0, 3)] * f[pair_index(n, 1, 3)];
        assert!((engine.b_table()[0b1011] - triangle).abs() < TOLERANCE);
        // Pairs are a single bond.
        assert!((engine.b_table()[0b0110] - f[pair_index(n, 1, 2)]).abs() < TOLERANCE);
    }

    #[test]
    fn overlapping_hard_sphere_triangle_has_reference_values() {
        let f = [-1.0, -1.0, -1.0];
        let engine = engine_for(&f, 3);
        // Three two-bond chains (+1 each) plus the triangle (-1).
        assert_eq!(engine.connected_sum(), 2.0);
        assert_eq!(engine.biconnected_sum(), -1.0);
    }

    #[test]
    fn many_body_correction_scales_only_large_subsets() {
        let n = 4;
        let f = random_bonds(n, 5);
        let mut engine = DiagramEngine::new(n);
        engine.compute_q(&f);
        let before = engine.q_table().to_vec();
        engine.apply_many_body(|s| if size(s) == 3 { 2.0 } else { 3.0 });
        for s in 1..=full_set(n) {
            let factor = match size(s) {
                0..=2 => 1.0,
                3 => 2.0,
                _ => 3.0,
            };
            assert!((engine.q_table()[s as usize] - factor * before[s as usize]).abs() < TOLERANCE);
        }
    }

    #[test]
    fn unit_many_body_correction_is_a_no_op() {
        let n = 5;
        let f = random_bonds(n, 9);
        let plain = engine_for(&f, n);

        let mut corrected = DiagramEngine::new(n);
        corrected.compute_q(&f);
        corrected.apply_many_body(|_| 1.0);
        corrected.compute_connected();
        corrected.compute_biconnected();

        assert_eq!(plain.biconnected_sum(), corrected.biconnected_sum());
    }

    #[test]
    fn degree_precheck_rejects_dangling_point() {
        let n = 4;
        let mut f = vec![-1.0; pair_count(n)];
        f[pair_index(n, 0, 3)] = 0.0;
        f[pair_index(n, 1, 3)] = 0.0;
        assert!(!DiagramEngine::degrees_allow_biconnected(n, &f));

        let mut engine = DiagramEngine::new(n);
        assert_eq!(engine.biconnected_value(&f), 0.0);
        // The exact recursion agrees.
        assert!(engine_for(&f, n).biconnected_sum().abs() < TOLERANCE);
    }

    #[test]
    fn short_circuit_is_reported_and_cleared_by_the_next_recursion() {
        let n = 4;
        let live = random_bonds(n, 21);
        let mut dangling = live.clone();
        dangling[pair_index(n, 0, 2)] = 0.0;
        dangling[pair_index(n, 1, 2)] = 0.0;

        let mut engine = DiagramEngine::new(n);
        let value = engine.biconnected_value(&live);
        assert!(!engine.short_circuited());
        let tables = engine.b_table().to_vec();

        assert_eq!(engine.biconnected_value(&dangling), 0.0);
        assert!(engine.short_circuited());
        assert_eq!(engine.b_table(), &tables[..]);
        assert_eq!(engine.biconnected_sum(), value);

        engine.biconnected_value(&live);
        assert!(!engine.short_circuited());
    }

    #[test]
    fn degree_precheck_is_not_sufficient_for_nonzero_sum() {
        // Two triangles sharing point 0: every degree is >= 2 but point 0 articulates.
        let n = 5;
        let mut f = vec![0.0; pair_count(n)];
        for (i, j) in [(0, 1), (0, 2), (1, 2), (0, 3), (0, 4), (3, 4)] {
            f[pair_index(n, i, j)] = -1.0;
        }
        assert!(DiagramEngine::degrees_allow_biconnected(n, &f));
        let mut engine = DiagramEngine::new(n);
        assert!(engine.biconnected_value(&f).abs() < TOLERANCE);
    }

    #[test]
    fn nan_bond_surfaces_in_tables() {
        let f = [-1.0, f64::NAN, -1.0];
        let mut engine = DiagramEngine::new(3);
        assert!(engine.biconnected_value(&f).is_nan());
        assert!(engine.connected_sum().is_nan());
    }
}
