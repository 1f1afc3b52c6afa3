use core::fmt::Debug;
use core::slice::ChunksExact;

use bytemuck::Pod;

#[inline(always)]
#[track_caller]
pub(crate) fn check_stride<T>(stride: usize) {
    assert_eq!(
        core::mem::size_of::<T>(),
        stride,
        "element type size does not match the view's stride"
    );
}

#[inline(always)]
#[track_caller]
fn window(len: usize, stride: usize, offset: usize, count: usize) -> core::ops::Range<usize> {
    assert!(stride != 0, "stride must be non-zero");
    let end = offset.checked_add(count).expect("slice range overflow");
    assert!(
        end.checked_mul(stride).is_some_and(|bytes| bytes <= len),
        "slice range {offset}..{end} out of bounds for {} elements",
        len / stride
    );
    offset * stride..end * stride
}

/// A read-only view of `count` elements, `stride` bytes apart, over memory
/// owned elsewhere.
///
/// # Examples
///
/// ```rust
/// use strided::Slice;
///
/// let values = [10u32, 20, 30, 40];
/// let slice = Slice::from_values(&values);
/// assert_eq!(slice.len(), 4);
///
/// let middle = slice.to_slice(1, 2);
/// assert_eq!(*middle.at::<u32>(0), 20);
/// assert_eq!(*middle.at::<u32>(1), 30);
/// ```
#[derive(Clone, Copy)]
pub struct Slice<'a> {
    bytes: &'a [u8],
    stride: usize,
}

impl<'a> Slice<'a> {
    /// Creates a view of `count` elements starting at element `offset` of
    /// `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero or the range does not fit in `bytes`.
    #[track_caller]
    pub fn new(bytes: &'a [u8], offset: usize, count: usize, stride: usize) -> Self {
        let range = window(bytes.len(), stride, offset, count);
        Self {
            bytes: &bytes[range],
            stride,
        }
    }

    /// Creates a view over a slice of plain values.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[track_caller]
    pub fn from_values<T: Pod>(values: &'a [T]) -> Self {
        assert!(core::mem::size_of::<T>() != 0, "stride must be non-zero");
        Self {
            bytes: bytemuck::cast_slice(values),
            stride: core::mem::size_of::<T>(),
        }
    }

    /// Returns the number of elements in the view.
    #[inline]
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.bytes.len() / self.stride
        }
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the byte distance between consecutive elements.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns all bytes covered by the view.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, index: usize) -> &'a [u8] {
        &self.bytes[window(self.bytes.len(), self.stride, index, 1)]
    }

    /// Returns the element at `index` as a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` differs from the stride, if `index` is out
    /// of bounds, or if the element is not aligned for `T`.
    #[inline]
    #[track_caller]
    pub fn at<T: Pod>(&self, index: usize) -> &'a T {
        check_stride::<T>(self.stride);
        bytemuck::from_bytes(self.get(index))
    }

    /// Returns a view of `count` elements starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[track_caller]
    pub fn to_slice(&self, offset: usize, count: usize) -> Slice<'a> {
        Slice::new(self.bytes, offset, count, self.stride)
    }

    /// Iterates over the bytes of each element.
    pub fn iter(&self) -> ChunksExact<'a, u8> {
        self.bytes.chunks_exact(self.stride.max(1))
    }
}

impl Debug for Slice<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Slice")
            .field("len", &self.len())
            .field("stride", &self.stride)
            .finish()
    }
}

/// A read/write view of `count` elements, `stride` bytes apart, over memory
/// owned elsewhere.
pub struct SliceMut<'a> {
    bytes: &'a mut [u8],
    stride: usize,
}

impl<'a> SliceMut<'a> {
    /// Creates a mutable view of `count` elements starting at element
    /// `offset` of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero or the range does not fit in `bytes`.
    #[track_caller]
    pub fn new(bytes: &'a mut [u8], offset: usize, count: usize, stride: usize) -> Self {
        let range = window(bytes.len(), stride, offset, count);
        Self {
            bytes: &mut bytes[range],
            stride,
        }
    }

    /// Creates a mutable view over a slice of plain values.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[track_caller]
    pub fn from_values<T: Pod>(values: &'a mut [T]) -> Self {
        assert!(core::mem::size_of::<T>() != 0, "stride must be non-zero");
        Self {
            bytes: bytemuck::cast_slice_mut(values),
            stride: core::mem::size_of::<T>(),
        }
    }

    /// Returns the number of elements in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the byte distance between consecutive elements.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Reborrows as a read-only view.
    #[inline]
    pub fn as_slice(&self) -> Slice<'_> {
        Slice {
            bytes: &*self.bytes,
            stride: self.stride,
        }
    }

    /// Returns the bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, index: usize) -> &[u8] {
        &self.bytes[window(self.bytes.len(), self.stride, index, 1)]
    }

    /// Returns the bytes of the element at `index` for writing.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, index: usize) -> &mut [u8] {
        let range = window(self.bytes.len(), self.stride, index, 1);
        &mut self.bytes[range]
    }

    /// Returns the element at `index` as a `T`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Slice::at`].
    #[inline]
    #[track_caller]
    pub fn at<T: Pod>(&self, index: usize) -> &T {
        check_stride::<T>(self.stride);
        bytemuck::from_bytes(self.get(index))
    }

    /// Returns the element at `index` as a mutable `T`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Slice::at`].
    #[inline]
    #[track_caller]
    pub fn at_mut<T: Pod>(&mut self, index: usize) -> &mut T {
        check_stride::<T>(self.stride);
        bytemuck::from_bytes_mut(self.get_mut(index))
    }

    /// Consumes the view and returns a mutable view of `count` elements
    /// starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[track_caller]
    pub fn into_slice(self, offset: usize, count: usize) -> SliceMut<'a> {
        SliceMut::new(self.bytes, offset, count, self.stride)
    }
}

impl Debug for SliceMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_slice().fmt(f)
    }
}
