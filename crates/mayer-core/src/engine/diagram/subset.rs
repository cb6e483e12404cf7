//! Bitmask helpers for the subset lattice over at most [`MAX_POINTS`](crate::core::geometry::MAX_POINTS) points.

/// A set of point indices, bit `i` set when point `i` is a member.
pub type Subset = u32;

#[inline]
pub const fn full_set(n: usize) -> Subset {
    ((1u64 << n) - 1) as Subset
}

#[inline]
pub const fn lowest_bit(set: Subset) -> Subset {
    set & set.wrapping_neg()
}

#[inline]
pub const fn highest_point(set: Subset) -> usize {
    (Subset::BITS - 1 - set.leading_zeros()) as usize
}

#[inline]
pub const fn contains(set: Subset, point: usize) -> bool {
    set & (1 << point) != 0
}

#[inline]
pub const fn size(set: Subset) -> u32 {
    set.count_ones()
}

/// Member indices of `set` in increasing order.
#[inline]
pub fn members(set: Subset) -> Members {
    Members { rest: set }
}

#[derive(Debug, Clone)]
pub struct Members {
    rest: Subset,
}

impl Iterator for Members {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.rest == 0 {
            return None;
        }
        let point = self.rest.trailing_zeros() as usize;
        self.rest &= self.rest - 1;
        Some(point)
    }
}

/// Proper subsets of `set` that contain `anchor` (a single bit of `set`), in decreasing order.
///
/// For `set = {m}` nothing is yielded.
#[inline]
pub fn anchored_proper_subsets(set: Subset, anchor: Subset) -> AnchoredSubsets {
    debug_assert!(anchor.count_ones() == 1 && set & anchor == anchor);
    let rest = set ^ anchor;
    AnchoredSubsets {
        rest,
        anchor,
        next: (rest != 0).then(|| (rest - 1) & rest),
    }
}

#[derive(Debug, Clone)]
pub struct AnchoredSubsets {
    rest: Subset,
    anchor: Subset,
    next: Option<Subset>,
}

impl Iterator for AnchoredSubsets {
    type Item = Subset;

    #[inline]
    fn next(&mut self) -> Option<Subset> {
        let sub = self.next?;
        self.next = (sub != 0).then(|| (sub - 1) & self.rest);
        Some(sub | self.anchor)
    }
}

/// Every subset of `set`, including `set` itself and the empty set, in decreasing order.
#[inline]
pub fn submasks(set: Subset) -> Submasks {
    Submasks {
        set,
        next: Some(set),
    }
}

#[derive(Debug, Clone)]
pub struct Submasks {
    set: Subset,
    next: Option<Subset>,
}

impl Iterator for Submasks {
    type Item = Subset;

    #[inline]
    fn next(&mut self) -> Option<Subset> {
        let sub = self.next?;
        self.next = (sub != 0).then(|| (sub - 1) & self.set);
        Some(sub)
    }
}
