//! Shared immutable function points.
//!
//! A [`Point`] is one `(argument, value)` definition of the function. The
//! pair lives behind a reference-counted cell so both ordered indexes of
//! [`FunctionMaxima`](crate::FunctionMaxima) reference the same logical
//! point without duplicating its storage. A point is never mutated; updating
//! a value replaces the point wholesale.

use std::fmt;
use std::rc::Rc;

struct Inner<A, V> {
    arg: A,
    value: V,
}

/// One immutable `(argument, value)` pair, shared between indexes.
///
/// Cloning a `Point` clones the handle, not the pair.
pub struct Point<A, V> {
    inner: Rc<Inner<A, V>>,
}

impl<A, V> Point<A, V> {
    pub(crate) fn new(arg: A, value: V) -> Self {
        Self {
            inner: Rc::new(Inner { arg, value }),
        }
    }

    /// The argument (domain) component.
    #[inline]
    #[must_use]
    pub fn arg(&self) -> &A {
        &self.inner.arg
    }

    /// The value (range) component.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.inner.value
    }
}

impl<A, V> Clone for Point<A, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: PartialEq, V: PartialEq> PartialEq for Point<A, V> {
    fn eq(&self, other: &Self) -> bool {
        self.arg() == other.arg() && self.value() == other.value()
    }
}

impl<A: Eq, V: Eq> Eq for Point<A, V> {}

impl<A: fmt::Debug, V: fmt::Debug> fmt::Debug for Point<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Point")
            .field(self.arg())
            .field(self.value())
            .finish()
    }
}
