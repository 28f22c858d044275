//! The container: two synchronized ordered indexes over shared points.
//!
//! [`FunctionMaxima`] keeps a function index (points by argument) and a
//! maxima index (points by value descending, argument ascending on ties)
//! over the same reference-counted [`Point`]s. A point at argument `a` with
//! predecessor `L` and successor `R` is a **local maximum** iff
//! (`L` absent or `value(a) ≥ value(L)`) and (`R` absent or
//! `value(a) ≥ value(R)`); equality satisfies the rule, so plateaus and
//! adjacent equal values are all maxima.
//!
//! ## Mutation contract
//!
//! `set_value` and `erase` run in two phases:
//! 1. **plan** — every neighbor lookup and status decision runs against the
//!    unmodified indexes. A comparator that panics here unwinds with both
//!    indexes untouched.
//! 2. **commit** — staged maxima insertions land first under a drop guard
//!    that removes them again if a later tree operation unwinds, then the
//!    function index and the stale maxima entries are updated.
//!
//! With a deterministic comparator this gives the strong guarantee: a panic
//! anywhere in the call leaves the structure as it was before the call. A
//! comparator that panics non-deterministically during the commit-phase
//! removals is outside the contract.
//!
//! Neighbor lookups use half-open ranges around the mutated argument, so a
//! point being replaced or removed is never consulted as its own neighbor;
//! decisions always see post-mutation adjacency.

use std::cmp::Ordering;
use std::collections::{btree_map, btree_set, BTreeMap, BTreeSet};
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Bound::{Excluded, Unbounded};

use crate::error::Error;
use crate::point::Point;

/// Maxima-index key: orders shared points by value descending, then by
/// argument ascending among value-ties.
struct MaximaKey<A, V>(Point<A, V>);

impl<A, V> Clone for MaximaKey<A, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Ord, V: Ord> Ord for MaximaKey<A, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .value()
            .cmp(self.0.value())
            .then_with(|| self.0.arg().cmp(other.0.arg()))
    }
}

impl<A: Ord, V: Ord> PartialOrd for MaximaKey<A, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Ord, V: Ord> PartialEq for MaximaKey<A, V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A: Ord, V: Ord> Eq for MaximaKey<A, V> {}

/// Rollback guard for commit-phase maxima insertions.
///
/// Records each entry it actually inserted; unless committed, its `Drop`
/// removes them again, so an unwind mid-commit restores the maxima index.
struct StagedMaxima<'s, A: Ord, V: Ord> {
    maxima: &'s mut BTreeSet<MaximaKey<A, V>>,
    inserted: Vec<Point<A, V>>,
    committed: bool,
}

impl<'s, A: Ord, V: Ord> StagedMaxima<'s, A, V> {
    fn new(maxima: &'s mut BTreeSet<MaximaKey<A, V>>) -> Self {
        Self {
            maxima,
            inserted: Vec::new(),
            committed: false,
        }
    }

    fn insert(&mut self, point: Point<A, V>) {
        if self.maxima.insert(MaximaKey(point.clone())) {
            self.inserted.push(point);
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl<A: Ord, V: Ord> Drop for StagedMaxima<'_, A, V> {
    fn drop(&mut self) {
        if !self.committed {
            for p in self.inserted.drain(..) {
                self.maxima.remove(&MaximaKey(p));
            }
        }
    }
}

/// Mutable mapping from arguments to values that continuously tracks the
/// local maxima of the induced staircase function.
///
/// `A` and `V` supply the total orders through their `Ord` implementations;
/// two values are *equal* precisely when `cmp` returns `Ordering::Equal`.
/// `A: Clone` pays for lookup by bare argument: the function index keys on a
/// clone of the argument while the shared point carries the other.
///
/// Single-threaded by design. Both views borrow the container, so the
/// borrow checker rejects mutation while a traversal is live.
pub struct FunctionMaxima<A, V> {
    by_arg: BTreeMap<A, Point<A, V>>,
    maxima: BTreeSet<MaximaKey<A, V>>,
}

impl<A: Ord + Clone, V: Ord> Default for FunctionMaxima<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone, V> Clone for FunctionMaxima<A, V> {
    fn clone(&self) -> Self {
        // Index clones only; the points themselves stay shared.
        Self {
            by_arg: self.by_arg.clone(),
            maxima: self.maxima.clone(),
        }
    }
}

impl<A: fmt::Debug, V: fmt::Debug> fmt::Debug for FunctionMaxima<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_arg.values().map(|p| (p.arg(), p.value())))
            .finish()
    }
}

impl<A: Ord + Clone, V: Ord> FunctionMaxima<A, V> {
    /// Create an empty function.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_arg: BTreeMap::new(),
            maxima: BTreeSet::new(),
        }
    }

    /// Number of distinct arguments currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_arg.len()
    }

    /// `true` if no argument is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_arg.is_empty()
    }

    /// Value at `arg`.
    ///
    /// Returns [`Error::InvalidArgument`] when no point is set at `arg`.
    /// Never mutates the structure.
    pub fn value_at(&self, arg: &A) -> Result<&V, Error> {
        self.by_arg
            .get(arg)
            .map(Point::value)
            .ok_or(Error::InvalidArgument)
    }

    /// Point at `arg` in the function view, or `None` if absent.
    #[must_use]
    pub fn find(&self, arg: &A) -> Option<&Point<A, V>> {
        self.by_arg.get(arg)
    }

    /// Lazy ascending-argument traversal of all points (function view).
    #[must_use]
    pub fn iter(&self) -> Iter<'_, A, V> {
        Iter {
            inner: self.by_arg.values(),
        }
    }

    /// Lazy descending-value traversal of the current local maxima, with
    /// value-ties broken by ascending argument (maxima view).
    #[must_use]
    pub fn maxima(&self) -> MaximaIter<'_, A, V> {
        MaximaIter {
            inner: self.maxima.iter(),
        }
    }

    /// Insert or update the point at `arg`.
    ///
    /// Setting a value that compares equal to the current one is a complete
    /// no-op: no structural change and no maxima recomputation. Otherwise
    /// the old point (if any) is replaced and the maximum status of the new
    /// point and of its up-to-two argument-neighbors is recomputed.
    ///
    /// O(log n) amortized. See the module docs for the panic/rollback
    /// contract.
    pub fn set_value(&mut self, arg: A, value: V) {
        let Self { by_arg, maxima } = self;

        let old = by_arg.get(&arg).cloned();
        if let Some(old) = &old {
            if old.value().cmp(&value) == Ordering::Equal {
                return;
            }
        }

        // Plan. The ranges around `arg` exclude the old point, so each
        // decision sees the adjacency that will hold after the commit.
        let left = left_of(by_arg, &arg).cloned();
        let right = right_of(by_arg, &arg).cloned();

        let point = Point::new(arg.clone(), value);

        let mut promote: Vec<Point<A, V>> = Vec::with_capacity(3);
        let mut demote: Vec<Point<A, V>> = Vec::with_capacity(3);

        if side_ok(point.value(), left.as_ref()) && side_ok(point.value(), right.as_ref()) {
            promote.push(point.clone());
        }

        if let Some(l) = &left {
            let ll = left_of(by_arg, l.arg()).cloned();
            if side_ok(l.value(), ll.as_ref()) && side_ok(l.value(), Some(&point)) {
                promote.push(l.clone());
            } else {
                demote.push(l.clone());
            }
        }
        if let Some(r) = &right {
            let rr = right_of(by_arg, r.arg()).cloned();
            if side_ok(r.value(), Some(&point)) && side_ok(r.value(), rr.as_ref()) {
                promote.push(r.clone());
            } else {
                demote.push(r.clone());
            }
        }

        // Commit. Maxima insertions first, guarded; then the function index;
        // stale entries last.
        let mut staged = StagedMaxima::new(maxima);
        for p in promote {
            staged.insert(p);
        }
        by_arg.insert(arg, point);
        staged.commit();

        if let Some(old) = old {
            maxima.remove(&MaximaKey(old));
        }
        for p in demote {
            maxima.remove(&MaximaKey(p));
        }
    }

    /// Remove the point at `arg`; no-op if absent.
    ///
    /// The former neighbors (up to two) become adjacent and have their
    /// maximum status recomputed against each other.
    ///
    /// O(log n) amortized. See the module docs for the panic/rollback
    /// contract.
    pub fn erase(&mut self, arg: &A) {
        let Self { by_arg, maxima } = self;

        let Some(old) = by_arg.get(arg).cloned() else {
            return;
        };

        // Plan, against the adjacency that will hold once `arg` is gone.
        let left = left_of(by_arg, arg).cloned();
        let right = right_of(by_arg, arg).cloned();

        let mut promote: Vec<Point<A, V>> = Vec::with_capacity(2);
        let mut demote: Vec<Point<A, V>> = Vec::with_capacity(2);

        if let Some(l) = &left {
            let ll = left_of(by_arg, l.arg()).cloned();
            if side_ok(l.value(), ll.as_ref()) && side_ok(l.value(), right.as_ref()) {
                promote.push(l.clone());
            } else {
                demote.push(l.clone());
            }
        }
        if let Some(r) = &right {
            let rr = right_of(by_arg, r.arg()).cloned();
            if side_ok(r.value(), left.as_ref()) && side_ok(r.value(), rr.as_ref()) {
                promote.push(r.clone());
            } else {
                demote.push(r.clone());
            }
        }

        let mut staged = StagedMaxima::new(maxima);
        for p in promote {
            staged.insert(p);
        }
        by_arg.remove(arg);
        staged.commit();

        maxima.remove(&MaximaKey(old));
        for p in demote {
            maxima.remove(&MaximaKey(p));
        }
    }
}

/// Non-strict one-sided rule: satisfied when the neighbor is absent or not
/// strictly greater.
fn side_ok<A, V: Ord>(value: &V, neighbor: Option<&Point<A, V>>) -> bool {
    neighbor.map_or(true, |n| n.value().cmp(value) != Ordering::Greater)
}

/// Immediate predecessor-by-argument, excluding any point at `arg` itself.
fn left_of<'m, A: Ord, V>(map: &'m BTreeMap<A, Point<A, V>>, arg: &A) -> Option<&'m Point<A, V>> {
    map.range(..arg).next_back().map(|(_, p)| p)
}

/// Immediate successor-by-argument, excluding any point at `arg` itself.
fn right_of<'m, A: Ord, V>(map: &'m BTreeMap<A, Point<A, V>>, arg: &A) -> Option<&'m Point<A, V>> {
    map.range((Excluded(arg), Unbounded)).next().map(|(_, p)| p)
}

impl<A: Ord + Clone, V: Ord> Extend<(A, V)> for FunctionMaxima<A, V> {
    fn extend<I: IntoIterator<Item = (A, V)>>(&mut self, iter: I) {
        for (arg, value) in iter {
            self.set_value(arg, value);
        }
    }
}

impl<A: Ord + Clone, V: Ord> FromIterator<(A, V)> for FunctionMaxima<A, V> {
    fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
        let mut f = Self::new();
        f.extend(iter);
        f
    }
}

impl<'a, A: Ord + Clone, V: Ord> IntoIterator for &'a FunctionMaxima<A, V> {
    type Item = &'a Point<A, V>;
    type IntoIter = Iter<'a, A, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Function-view iterator: all points in ascending-argument order.
pub struct Iter<'a, A, V> {
    inner: btree_map::Values<'a, A, Point<A, V>>,
}

impl<'a, A, V> Iterator for Iter<'a, A, V> {
    type Item = &'a Point<A, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, V> DoubleEndedIterator for Iter<'_, A, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<A, V> ExactSizeIterator for Iter<'_, A, V> {}
impl<A, V> FusedIterator for Iter<'_, A, V> {}

/// Maxima-view iterator: local maxima in descending-value order,
/// value-ties in ascending-argument order.
pub struct MaximaIter<'a, A, V> {
    inner: btree_set::Iter<'a, MaximaKey<A, V>>,
}

impl<'a, A, V> Iterator for MaximaIter<'a, A, V> {
    type Item = &'a Point<A, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|k| &k.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, V> DoubleEndedIterator for MaximaIter<'_, A, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|k| &k.0)
    }
}

impl<A, V> ExactSizeIterator for MaximaIter<'_, A, V> {}
impl<A, V> FusedIterator for MaximaIter<'_, A, V> {}
