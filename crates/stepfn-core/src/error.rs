//! Crate-local errors.
//!
//! Only the read-only lookup path can fail recoverably; mutating operations
//! signal comparator failure by unwinding (see [`crate::maxima`] for the
//! commit/rollback contract).

use thiserror::Error;

/// Errors surfaced by lookups on [`FunctionMaxima`](crate::FunctionMaxima).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested argument has no point set.
    #[error("invalid argument value")]
    InvalidArgument,
}
