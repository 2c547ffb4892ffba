//! Error type for fallible adapter construction.

use thiserror::Error;

/// Errors surfaced by component instantiation.
///
/// Runtime failures inside a transform or operator are not wrapped: they
/// propagate to the caller unmodified, as a panic on this thread.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The derived stream produced no synchronous emission at construction,
    /// so the first render would have undefined state. Transforms must emit
    /// synchronously on subscription (e.g. via `start_with`).
    #[error("derived stream produced no synchronous emission at construction")]
    NoInitialEmission,
}

/// Convenience alias for adapter results.
pub type Result<T> = std::result::Result<T, Error>;
