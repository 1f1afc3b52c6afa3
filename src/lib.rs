#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! debug_event {
            ($($arg:tt)*) => { tracing::debug!($($arg)*) };
        }
        macro_rules! trace_event {
            ($($arg:tt)*) => { tracing::trace!($($arg)*) };
        }
    } else {
        macro_rules! debug_event {
            ($($arg:tt)*) => {};
        }
        macro_rules! trace_event {
            ($($arg:tt)*) => {};
        }
    }
}

/// Pluggable memory sources.
///
/// Containers take a [`RawAllocator`] at construction and route every
/// allocation through it. [`Heap`] is the default.
pub mod allocator;

/// A growable, never-shrinking byte allocation.
pub mod buffer;

/// Error types for fallible growth.
pub mod error;

pub mod hash_table;

/// Non-owning strided views over memory owned elsewhere.
pub mod slice;

/// A growable array of fixed-stride, type-erased elements.
pub mod vector;

pub use allocator::Heap;
pub use allocator::RawAllocator;
pub use buffer::Buffer;
pub use error::AllocError;
pub use error::TryReserveError;
pub use hash_table::HashTable;
pub use slice::Slice;
pub use slice::SliceMut;
pub use vector::Vector;
