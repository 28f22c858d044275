//! stepfn-core — ordered step-function container with incremental maxima
//! tracking.
//!
//! A [`FunctionMaxima`] is a mutable mapping from totally-ordered arguments
//! to totally-ordered values that keeps three things available at once:
//! - point lookup ([`FunctionMaxima::value_at`]),
//! - ordered-by-argument traversal of all points (the **function view**),
//! - ordered traversal of exactly those points that are non-strict local
//!   maxima of the induced staircase function (the **maxima view**).
//!
//! The maxima view is maintained incrementally: `set_value`/`erase` touch
//! only the mutated point and its up-to-two argument-neighbors, at
//! O(log n) amortized cost per call.
//!
//! ```
//! use stepfn_core::FunctionMaxima;
//!
//! let mut f = FunctionMaxima::new();
//! f.set_value(1, 10);
//! f.set_value(2, 5);
//! f.set_value(3, 5);
//!
//! // 3 has no right neighbor and an equal left neighbor, so it is a
//! // (non-strict) local maximum; 2 sits below 10 on its left and is not.
//! let maxima: Vec<(i32, i32)> = f.maxima().map(|p| (*p.arg(), *p.value())).collect();
//! assert_eq!(maxima, vec![(1, 10), (3, 5)]);
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

/// Crate-local error type for the lookup contract.
pub mod error;
/// JSON/CBOR snapshot I/O for function and maxima views.
pub mod io;
/// JSON Lines (NDJSON) op-script helpers.
pub mod io_jsonl;
/// The container itself: dual synchronized ordered indexes.
pub mod maxima;
/// Shared immutable `(argument, value)` points.
pub mod point;

pub use error::Error;
pub use io::Sample;
pub use io_jsonl::Op;
pub use maxima::{FunctionMaxima, Iter, MaximaIter};
pub use point::Point;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use stepfn_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Error, FunctionMaxima, Op, Point, Sample};
}
