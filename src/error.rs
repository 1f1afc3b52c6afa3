use core::alloc::Layout;

use thiserror::Error;

/// An allocator could not satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// The error type for `try_*` methods that grow a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryReserveError {
    /// The computed capacity exceeded what the container can represent.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator returned an error for the given layout.
    #[error("memory allocation of {} bytes failed", layout.size())]
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

/// Unwraps the result of a fallible growth path the way the standard
/// collections do: overflow panics, allocator failure goes to
/// `handle_alloc_error`.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(TryReserveError::CapacityOverflow) => panic!("capacity overflow"),
        Err(TryReserveError::AllocError { layout }) => alloc::alloc::handle_alloc_error(layout),
    }
}
