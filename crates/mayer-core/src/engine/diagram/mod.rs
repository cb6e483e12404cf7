//! Subset-recursion diagram sums.
//!
//! [`wheatley::DiagramEngine`] turns the Mayer bonds of one configuration into tables of
//! connected and biconnected graph sums for every subset of points, in O(n 2^n) for the
//! e-bond products and O(n 3^n) for the connectivity stages, instead of enumerating the
//! `2^(n(n-1)/2)` labeled graphs. [`py::PercusYevickTables`] reuses the same subset indexing
//! for two-root tables under the Percus–Yevick closure.

pub mod py;
pub mod subset;
pub mod wheatley;

use serde::Deserialize;

/// Which family of diagrams a cluster value sums over the full point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramClass {
    /// All connected graphs.
    Connected,
    /// Graphs with no articulation point; their sum gives `B_n` up to `-(n-1)/n!`.
    Biconnected,
    /// Biconnected graphs minus those the Percus–Yevick closure already accounts for.
    PercusYevick,
    /// For each pair, the part of the PY-corrected sum whose graphs contain that bond,
    /// averaged over pairs.
    IncrementalPercusYevick,
}

impl DiagramClass {
    /// Whether the class carries PY tables, which limits it to
    /// [`MAX_PY_POINTS`](py::MAX_PY_POINTS) points.
    pub fn needs_py_tables(self) -> bool {
        matches!(self, Self::PercusYevick | Self::IncrementalPercusYevick)
    }
}
