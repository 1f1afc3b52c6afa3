use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::AllocError;

/// A pluggable source of raw memory.
///
/// Every container in this crate takes its memory from a `RawAllocator`
/// supplied at construction time. The implementor's `&self` plays the role of
/// the opaque user context: an arena, a counter, a pool handle, or nothing at
/// all for [`Heap`].
///
/// # Safety
///
/// Implementors must return pointers that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stay valid
/// until passed back to [`free`](RawAllocator::free) or
/// [`reallocate`](RawAllocator::reallocate) on the same allocator.
pub unsafe trait RawAllocator {
    /// Allocates a block of memory described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with the same
    /// `layout` and must not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a block, preserving the first `min(layout.size(), new_size)`
    /// bytes. On failure the original block is left untouched.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with the same
    /// `layout`. On success, `ptr` must no longer be used.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let new_layout =
            Layout::from_size_align(new_size, layout.align()).map_err(|_| AllocError)?;
        let new_ptr = self.allocate(new_layout)?;

        // SAFETY: Both blocks are valid for the copied length and belong to
        // distinct allocations.
        unsafe {
            core::ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                new_ptr.as_ptr(),
                layout.size().min(new_size),
            );
            self.free(ptr, layout);
        }

        Ok(new_ptr)
    }
}

// SAFETY: Forwards to the referenced allocator, which upholds the contract.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Caller upholds the contract of `free`.
        unsafe { (**self).free(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: Caller upholds the contract of `reallocate`.
        unsafe { (**self).reallocate(ptr, layout, new_size) }
    }
}

/// The default allocator, backed by the platform heap.
///
/// Zero-sized requests never reach the heap; they get a dangling pointer with
/// the requested alignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heap;

#[inline(always)]
fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: Alignments are never zero.
    unsafe { NonNull::new_unchecked(core::ptr::without_provenance_mut(layout.align())) }
}

// SAFETY: All non-empty requests are served by the global allocator, which
// upholds the contract. Empty requests are never dereferenced.
unsafe impl RawAllocator for Heap {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: The layout has a non-zero size.
        NonNull::new(unsafe { alloc::alloc::alloc(layout) }).ok_or(AllocError)
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: Caller guarantees `ptr` came from `allocate` with `layout`.
            unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 || new_size == 0 {
            let new_layout =
                Layout::from_size_align(new_size, layout.align()).map_err(|_| AllocError)?;
            let new_ptr = self.allocate(new_layout)?;
            // SAFETY: Caller guarantees `ptr` came from `allocate` with `layout`.
            unsafe { self.free(ptr, layout) };
            return Ok(new_ptr);
        }

        // SAFETY: Caller guarantees `ptr` came from `allocate` with `layout`,
        // and both sizes are non-zero.
        NonNull::new(unsafe { alloc::alloc::realloc(ptr.as_ptr(), layout, new_size) })
            .ok_or(AllocError)
    }
}
