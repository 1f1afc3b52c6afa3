use core::alloc::Layout;
use core::fmt::Debug;
use core::ptr::NonNull;

use crate::allocator::Heap;
use crate::allocator::RawAllocator;
use crate::error::TryReserveError;
use crate::error::infallible;

/// Alignment of every buffer allocation. Large enough for any primitive and
/// for SSE-sized vectors, so strided views can hand out typed references.
pub const BUFFER_ALIGN: usize = 16;

#[inline(always)]
fn layout_for(size: usize) -> Result<Layout, TryReserveError> {
    Layout::from_size_align(size, BUFFER_ALIGN).map_err(|_| TryReserveError::CapacityOverflow)
}

#[inline(always)]
fn dangling() -> NonNull<u8> {
    // SAFETY: `BUFFER_ALIGN` is non-zero.
    unsafe { NonNull::new_unchecked(core::ptr::without_provenance_mut(BUFFER_ALIGN)) }
}

/// An owned, growable, byte-addressable allocation.
///
/// A `Buffer` only ever grows. Newly exposed bytes are zeroed, so the whole
/// buffer is always readable as initialized memory.
///
/// # Examples
///
/// ```rust
/// use strided::Buffer;
///
/// let mut buffer = Buffer::with_size(4);
/// buffer.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4]);
///
/// buffer.expand(8);
/// assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4, 0, 0, 0, 0]);
///
/// // Smaller requests never shrink the buffer.
/// buffer.expand(2);
/// assert_eq!(buffer.len(), 8);
/// ```
pub struct Buffer<A: RawAllocator = Heap> {
    ptr: NonNull<u8>,
    len: usize,
    alloc: A,
}

// SAFETY: The buffer exclusively owns its allocation.
unsafe impl<A: RawAllocator + Send> Send for Buffer<A> {}
// SAFETY: Shared access only hands out shared byte slices.
unsafe impl<A: RawAllocator + Sync> Sync for Buffer<A> {}

impl Buffer<Heap> {
    /// Creates a zero-filled buffer of `size` bytes on the platform heap.
    pub fn with_size(size: usize) -> Self {
        Self::with_size_in(size, Heap)
    }
}

impl<A: RawAllocator> Buffer<A> {
    /// Creates an empty buffer. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: dangling(),
            len: 0,
            alloc,
        }
    }

    /// Creates a zero-filled buffer of `size` bytes.
    pub fn with_size_in(size: usize, alloc: A) -> Self {
        infallible(Self::try_with_size_in(size, alloc))
    }

    /// Fallible version of [`with_size_in`](Self::with_size_in).
    pub fn try_with_size_in(size: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut buffer = Self::new_in(alloc);
        buffer.try_expand(size)?;
        Ok(buffer)
    }

    /// Returns the size of the buffer in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the allocator backing this buffer.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the whole buffer as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialized bytes, or dangling and
        // aligned with `len == 0`.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the whole buffer as mutable bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: As in `as_bytes`, and `&mut self` guarantees exclusivity.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the bytes from `offset` to the end of the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the buffer length.
    #[inline]
    pub fn data(&self, offset: usize) -> &[u8] {
        &self.as_bytes()[offset..]
    }

    /// Mutable version of [`data`](Self::data).
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the buffer length.
    #[inline]
    pub fn data_mut(&mut self, offset: usize) -> &mut [u8] {
        &mut self.as_bytes_mut()[offset..]
    }

    /// Grows the buffer to `size` bytes, zero-filling the new tail.
    ///
    /// Does nothing if the buffer is already at least `size` bytes.
    pub fn expand(&mut self, size: usize) {
        infallible(self.try_expand(size))
    }

    /// Fallible version of [`expand`](Self::expand). On error the buffer is
    /// unchanged.
    pub fn try_expand(&mut self, size: usize) -> Result<(), TryReserveError> {
        if size <= self.len {
            return Ok(());
        }

        let new_layout = layout_for(size)?;
        let result = if self.len == 0 {
            self.alloc.allocate(new_layout)
        } else {
            let old_layout = layout_for(self.len)?;
            // SAFETY: `ptr` was allocated by `alloc` with `old_layout`.
            unsafe { self.alloc.reallocate(self.ptr, old_layout, size) }
        };
        let ptr = result.map_err(|_| TryReserveError::AllocError { layout: new_layout })?;

        trace_event!(from = self.len, to = size, "buffer expanded");

        // SAFETY: The new block is valid for `size` bytes and the first `len`
        // were preserved.
        unsafe {
            core::ptr::write_bytes(ptr.as_ptr().add(self.len), 0, size - self.len);
        }
        self.ptr = ptr;
        self.len = size;

        Ok(())
    }
}

impl<A: RawAllocator> Drop for Buffer<A> {
    fn drop(&mut self) {
        if self.len != 0 {
            // SAFETY: `ptr` was allocated by `alloc` with this exact layout,
            // which was valid when it was created.
            unsafe {
                self.alloc.free(
                    self.ptr,
                    Layout::from_size_align_unchecked(self.len, BUFFER_ALIGN),
                );
            }
        }
    }
}

impl<A: RawAllocator> Debug for Buffer<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len).finish()
    }
}
