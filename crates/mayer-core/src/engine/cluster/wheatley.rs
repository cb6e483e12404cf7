use super::bonds::BondTables;
use super::{ClusterValue, Side, SidedValues};
use crate::core::bonds::{BondSource, ManyBodyBond};
use crate::core::geometry::pair_cache::{GeometryBuffer, PairGeometryCache};
use crate::core::geometry::{MAX_POINTS, pair_count};
use crate::core::params::PotentialParams;
use crate::engine::config::{ClusterConfig, ConfigError};
use crate::engine::diagram::DiagramClass;
use crate::engine::diagram::py::{MAX_PY_POINTS, PercusYevickTables};
use crate::engine::diagram::wheatley::DiagramEngine;
use tracing::{info, instrument, trace};

enum Strategy {
    Connected,
    Biconnected,
    PercusYevick(PercusYevickTables),
    IncrementalPercusYevick {
        tables: PercusYevickTables,
        forced: Vec<f64>,
    },
}

/// One diagram class summed over the full point set by subset recursion.
pub struct WheatleyCluster {
    n: usize,
    class: DiagramClass,
    source: BondSource,
    many_body: Option<Box<dyn ManyBodyBond>>,
    engine: DiagramEngine,
    strategy: Strategy,
    bonds: BondTables,
    values: SidedValues,
}

impl WheatleyCluster {
    pub fn new(n: usize, class: DiagramClass, source: BondSource) -> Result<Self, ConfigError> {
        if !(2..=MAX_POINTS).contains(&n) {
            return Err(ConfigError::InvalidPointCount {
                count: n,
                max: MAX_POINTS,
            });
        }
        if class.needs_py_tables() && n > MAX_PY_POINTS {
            return Err(ConfigError::InvalidPointCount {
                count: n,
                max: MAX_PY_POINTS,
            });
        }
        let strategy = match class {
            DiagramClass::Connected => Strategy::Connected,
            DiagramClass::Biconnected => Strategy::Biconnected,
            DiagramClass::PercusYevick => Strategy::PercusYevick(PercusYevickTables::new(n)),
            DiagramClass::IncrementalPercusYevick => Strategy::IncrementalPercusYevick {
                tables: PercusYevickTables::new(n),
                forced: vec![0.0; pair_count(n)],
            },
        };
        Ok(Self {
            n,
            class,
            source,
            many_body: None,
            engine: DiagramEngine::new(n),
            strategy,
            bonds: BondTables::new(n),
            values: SidedValues::default(),
        })
    }

    #[instrument(skip_all, name = "wheatley_cluster_from_config", fields(n = config.n_points, class = ?config.diagram_class))]
    pub fn from_config(
        config: &ClusterConfig,
        params: &PotentialParams,
    ) -> Result<Self, ConfigError> {
        let cluster = Self::new(config.n_points, config.diagram_class, params.pair_bond())?;
        let cluster = match params.many_body() {
            Some(many_body) => cluster.with_many_body(many_body),
            None => cluster,
        };
        info!(
            pair = ?params.pair,
            many_body = cluster.many_body.is_some(),
            "Cluster value constructed."
        );
        Ok(cluster)
    }

    /// Multiplies every subset product of three or more points by a non-additive factor.
    ///
    /// The degree pre-check is bypassed from then on, since a multibody factor can connect
    /// points whose pairwise bonds all vanish.
    pub fn with_many_body(mut self, many_body: Box<dyn ManyBodyBond>) -> Self {
        self.many_body = Some(many_body);
        self.values = SidedValues::default();
        self
    }

    pub fn class(&self) -> DiagramClass {
        self.class
    }

    /// Subset tables of the most recent recursion.
    ///
    /// Cached evaluations and degree pre-check short-circuits leave them untouched; check
    /// [`DiagramEngine::short_circuited`] before reading them as the current configuration.
    pub fn engine(&self) -> &DiagramEngine {
        &self.engine
    }

    pub fn py_tables(&self) -> Option<&PercusYevickTables> {
        match &self.strategy {
            Strategy::PercusYevick(tables) => Some(tables),
            Strategy::IncrementalPercusYevick { tables, .. } => Some(tables),
            _ => None,
        }
    }

    /// Mayer bonds last tabulated for `side`, in upper-triangular pair order.
    pub fn bonds(&self, side: Side) -> &[f64] {
        self.bonds.get(side)
    }

    fn compute(&mut self, geometry: &GeometryBuffer, side: Side, beta: f64) -> f64 {
        let refresh = self.bonds.refresh(side, geometry, &self.source, beta);
        trace!(?side, ?refresh, version = geometry.version(), "Bond table refreshed.");

        let f = self.bonds.get(side);
        let many_body = self.many_body.as_deref();
        let engine = &mut self.engine;
        match &mut self.strategy {
            Strategy::Connected => {
                fill_q(engine, f, many_body, geometry, beta);
                engine.compute_connected();
                engine.connected_sum()
            }
            Strategy::Biconnected => biconnected(engine, f, many_body, geometry, beta),
            Strategy::PercusYevick(tables) => {
                py_corrected(engine, tables, f, many_body, geometry, beta)
            }
            Strategy::IncrementalPercusYevick { tables, forced } => {
                // The corrected sum is affine in each bond, so the graphs containing `pair`
                // contribute `bond * (S(f=1) - S(f=0))`.
                forced.copy_from_slice(f);
                let mut total = 0.0;
                for pair in 0..f.len() {
                    let bond = f[pair];
                    if bond == 0.0 {
                        continue;
                    }
                    forced[pair] = 1.0;
                    let present =
                        py_corrected(engine, tables, &forced[..], many_body, geometry, beta);
                    forced[pair] = 0.0;
                    let absent =
                        py_corrected(engine, tables, &forced[..], many_body, geometry, beta);
                    forced[pair] = bond;
                    total += bond * (present - absent);
                }
                total / f.len() as f64
            }
        }
    }
}

fn fill_q(
    engine: &mut DiagramEngine,
    f: &[f64],
    many_body: Option<&dyn ManyBodyBond>,
    geometry: &GeometryBuffer,
    beta: f64,
) {
    engine.compute_q(f);
    if let Some(many_body) = many_body {
        engine.apply_many_body(|subset| many_body.correction(subset, geometry, beta));
    }
}

fn biconnected(
    engine: &mut DiagramEngine,
    f: &[f64],
    many_body: Option<&dyn ManyBodyBond>,
    geometry: &GeometryBuffer,
    beta: f64,
) -> f64 {
    match many_body {
        None => engine.biconnected_value(f),
        Some(_) => {
            fill_q(engine, f, many_body, geometry, beta);
            engine.compute_connected();
            engine.compute_biconnected();
            engine.biconnected_sum()
        }
    }
}

fn py_corrected(
    engine: &mut DiagramEngine,
    tables: &mut PercusYevickTables,
    f: &[f64],
    many_body: Option<&dyn ManyBodyBond>,
    geometry: &GeometryBuffer,
    beta: f64,
) -> f64 {
    let total = biconnected(engine, f, many_body, geometry, beta);
    tables.compute(f);
    total - tables.root_value()
}

impl ClusterValue for WheatleyCluster {
    fn n_points(&self) -> usize {
        self.n
    }

    fn evaluate(&mut self, cache: &PairGeometryCache, side: Side, beta: f64) -> f64 {
        assert_eq!(
            cache.n_points(),
            self.n,
            "cluster built for {} points evaluated on {}",
            self.n,
            cache.n_points()
        );
        let geometry = side.select(cache);
        if let Some(value) = self.values.get(side, geometry, beta) {
            return value;
        }
        let value = self.compute(geometry, side, beta);
        trace!(?side, class = ?self.class, value, "Cluster value computed.");
        self.values.store(side, geometry, beta, value);
        value
    }

    fn trial_notify(&mut self) {
        self.values.invalidate(Side::Trial);
    }

    fn accept_notify(&mut self) {
        self.bonds.swap();
        self.values.swap();
    }

    fn reject_notify(&mut self) {
        self.values.invalidate(Side::Trial);
    }
}

impl std::fmt::Debug for WheatleyCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheatleyCluster")
            .field("n", &self.n)
            .field("class", &self.class)
            .field("source", &self.source)
            .field("many_body", &self.many_body.is_some())
            .finish()
    }
}
