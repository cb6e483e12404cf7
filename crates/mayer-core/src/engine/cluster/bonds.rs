use super::{Side, Stamp};
use crate::core::bonds::BondSource;
use crate::core::geometry::pair_cache::GeometryBuffer;
use crate::core::geometry::{Dirty, pair_count, pair_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refresh {
    Cached,
    Row(usize),
    Full,
}

#[derive(Debug, Clone)]
struct BondTable {
    f: Vec<f64>,
    stamp: Option<Stamp>,
}

/// Mayer bonds for the current and trial geometry, refreshed lazily.
///
/// A table is stamped with the cache identity, geometry version and β it was computed for.
/// When a buffer differs from an already-tabulated parent of the same cache by one point, only that point's `n - 1` bonds are
/// recomputed.
#[derive(Debug, Clone)]
pub(crate) struct BondTables {
    n: usize,
    tables: [BondTable; 2],
}

impl BondTables {
    pub(crate) fn new(n: usize) -> Self {
        let empty = BondTable {
            f: vec![0.0; pair_count(n)],
            stamp: None,
        };
        Self {
            n,
            tables: [empty.clone(), empty],
        }
    }

    pub(crate) fn get(&self, side: Side) -> &[f64] {
        &self.tables[side.index()].f
    }

    pub(crate) fn swap(&mut self) {
        self.tables.swap(0, 1);
    }

    pub(crate) fn refresh(
        &mut self,
        side: Side,
        geometry: &GeometryBuffer,
        source: &BondSource,
        beta: f64,
    ) -> Refresh {
        let stamp = Some(Stamp::of(geometry, beta));
        let target = side.index();
        if self.tables[target].stamp == stamp {
            return Refresh::Cached;
        }

        if let Dirty::Point(dirty) = geometry.dirty() {
            let parent = Some(Stamp::parent_of(geometry, beta));
            let base = if self.tables[target].stamp == parent {
                Some(target)
            } else if self.tables[1 - target].stamp == parent {
                Some(1 - target)
            } else {
                None
            };

            if let Some(base) = base {
                let [current, trial] = &mut self.tables;
                let (source_table, table) = if target == 0 {
                    (&*trial, current)
                } else {
                    (&*current, trial)
                };
                if base != target {
                    table.f.copy_from_slice(&source_table.f);
                }
                for q in 0..self.n {
                    if q == dirty {
                        continue;
                    }
                    let (i, j) = if q < dirty { (q, dirty) } else { (dirty, q) };
                    table.f[pair_index(self.n, i, j)] = source.f(i, j, geometry, beta);
                }
                table.stamp = stamp;
                return Refresh::Row(dirty);
            }
        }

        let table = &mut self.tables[target];
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                table.f[pair_index(self.n, i, j)] = source.f(i, j, geometry, beta);
            }
        }
        table.stamp = stamp;
        Refresh::Full
    }
}
