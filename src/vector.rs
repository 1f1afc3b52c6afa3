use core::fmt::Debug;
use core::slice::ChunksExact;

use bytemuck::Pod;

use crate::allocator::Heap;
use crate::allocator::RawAllocator;
use crate::buffer::Buffer;
use crate::error::TryReserveError;
use crate::error::infallible;
use crate::slice::Slice;
use crate::slice::SliceMut;
use crate::slice::check_stride;

/// An owning, growable array of fixed-size elements.
///
/// `Vector` stores `len` elements of `stride` bytes each in a [`Buffer`] and
/// knows nothing else about them: no constructors, destructors, or moves
/// beyond byte copies. Typed accessors such as [`push_value`] and [`at`]
/// check that the type's size matches the stride.
///
/// When full, the capacity doubles. It never shrinks.
///
/// [`push_value`]: Vector::push_value
/// [`at`]: Vector::at
///
/// # Examples
///
/// ```rust
/// use strided::Vector;
///
/// let mut vector = Vector::new(4);
/// vector.push_value(1u32);
/// vector.push_value(2u32);
/// vector.push_value(3u32);
///
/// vector.erase(0);
/// assert_eq!(vector.len(), 2);
/// assert_eq!(*vector.at::<u32>(0), 2);
/// assert_eq!(vector.back(), Some(&3u32.to_ne_bytes()[..]));
/// ```
pub struct Vector<A: RawAllocator = Heap> {
    buffer: Buffer<A>,
    len: usize,
    stride: usize,
}

impl Vector<Heap> {
    /// Creates an empty vector of `stride`-byte elements on the platform heap.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn new(stride: usize) -> Self {
        Self::new_in(stride, Heap)
    }
}

impl<A: RawAllocator> Vector<A> {
    /// Creates an empty vector of `stride`-byte elements. Does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn new_in(stride: usize, alloc: A) -> Self {
        assert!(stride != 0, "stride must be non-zero");
        Self {
            buffer: Buffer::new_in(alloc),
            len: 0,
            stride,
        }
    }

    /// Creates a vector holding `len` zeroed elements.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn with_len_in(len: usize, stride: usize, alloc: A) -> Self {
        let mut vector = Self::new_in(stride, alloc);
        vector.resize(len);
        vector
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the vector can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len() / self.stride
    }

    /// Returns the size of one element in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Ensures capacity for at least `count` elements in total.
    pub fn reserve(&mut self, count: usize) {
        infallible(self.try_reserve(count))
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, count: usize) -> Result<(), TryReserveError> {
        if count <= self.capacity() {
            return Ok(());
        }

        let bytes = count
            .checked_mul(self.stride)
            .ok_or(TryReserveError::CapacityOverflow)?;
        self.buffer.try_expand(bytes)
    }

    /// Sets the length to `len`. New elements are zeroed; shrinking keeps the
    /// allocation.
    pub fn resize(&mut self, len: usize) {
        self.reserve(len);
        if len > self.len {
            let range = self.len * self.stride..len * self.stride;
            self.buffer.as_bytes_mut()[range].fill(0);
        }
        self.len = len;
    }

    /// Appends a zeroed element and returns its bytes for the caller to fill.
    pub fn emplace(&mut self) -> &mut [u8] {
        infallible(self.try_emplace())
    }

    /// Fallible version of [`emplace`](Self::emplace).
    pub fn try_emplace(&mut self) -> Result<&mut [u8], TryReserveError> {
        if self.len == self.capacity() {
            self.try_reserve(self.len.max(1) * 2)?;
        }

        let start = self.len * self.stride;
        self.len += 1;
        let slot = &mut self.buffer.as_bytes_mut()[start..start + self.stride];
        slot.fill(0);
        Ok(slot)
    }

    /// Appends a copy of `element` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `element.len()` differs from the stride.
    #[track_caller]
    pub fn push(&mut self, element: &[u8]) -> usize {
        assert_eq!(
            element.len(),
            self.stride,
            "element size does not match the vector's stride"
        );
        self.emplace().copy_from_slice(element);
        self.len - 1
    }

    /// Appends `value` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` differs from the stride.
    #[track_caller]
    pub fn push_value<T: Pod>(&mut self, value: T) -> usize {
        check_stride::<T>(self.stride);
        self.push(bytemuck::bytes_of(&value))
    }

    /// Removes the element at `index`, shifting later elements down.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn erase(&mut self, index: usize) {
        assert!(index < self.len, "index {index} out of bounds for {}", self.len);
        let stride = self.stride;
        self.buffer
            .as_bytes_mut()
            .copy_within((index + 1) * stride..self.len * stride, index * stride);
        self.len -= 1;
    }

    /// Removes the element at `index` by moving the last element into its
    /// place. Does not preserve order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn swap_erase(&mut self, index: usize) {
        assert!(index < self.len, "index {index} out of bounds for {}", self.len);
        let stride = self.stride;
        let last = (self.len - 1) * stride;
        self.buffer
            .as_bytes_mut()
            .copy_within(last..last + stride, index * stride);
        self.len -= 1;
    }

    /// Removes all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the bytes of the element at `index`, or `None` if out of
    /// bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        (index < self.len).then(|| self.as_slice().get(index))
    }

    /// Returns the bytes of the element at `index` for writing, or `None` if
    /// out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len {
            return None;
        }
        let start = index * self.stride;
        Some(&mut self.buffer.as_bytes_mut()[start..start + self.stride])
    }

    /// Returns the element at `index` as a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` differs from the stride, if `index` is out
    /// of bounds, or if `T` needs more than 16-byte alignment.
    #[inline]
    #[track_caller]
    pub fn at<T: Pod>(&self, index: usize) -> &T {
        self.as_slice().at(index)
    }

    /// Returns the element at `index` as a mutable `T`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`at`](Self::at).
    #[inline]
    #[track_caller]
    pub fn at_mut<T: Pod>(&mut self, index: usize) -> &mut T {
        check_stride::<T>(self.stride);
        let len = self.len;
        let bytes = self
            .get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds for {len}"));
        bytemuck::from_bytes_mut(bytes)
    }

    /// Returns the bytes of the last element.
    #[inline]
    pub fn back(&self) -> Option<&[u8]> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Returns a view over all elements.
    #[inline]
    pub fn as_slice(&self) -> Slice<'_> {
        Slice::new(self.buffer.as_bytes(), 0, self.len, self.stride)
    }

    /// Returns a view of `count` elements starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[track_caller]
    pub fn to_slice(&self, offset: usize, count: usize) -> Slice<'_> {
        self.as_slice().to_slice(offset, count)
    }

    /// Returns a mutable view of `count` elements starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[track_caller]
    pub fn to_slice_mut(&mut self, offset: usize, count: usize) -> SliceMut<'_> {
        let (len, stride) = (self.len, self.stride);
        SliceMut::new(self.buffer.as_bytes_mut(), 0, len, stride).into_slice(offset, count)
    }

    /// Iterates over the bytes of each element.
    pub fn iter(&self) -> ChunksExact<'_, u8> {
        self.as_slice().iter()
    }
}

impl<A: RawAllocator> Debug for Vector<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vector")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("stride", &self.stride)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::allocator::tracking::Tracking;

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Edge {
        from: u32,
        to: u32,
    }

    #[test]
    fn push_grows_by_doubling() {
        let mut vector = Vector::new(8);
        let mut capacities = Vec::new();
        for i in 0..9u64 {
            assert_eq!(vector.push_value(i), i as usize);
            capacities.push(vector.capacity());
        }
        assert_eq!(capacities, [2, 2, 4, 4, 8, 8, 8, 8, 16]);
        assert_eq!(*vector.at::<u64>(8), 8);
    }

    #[test]
    fn emplace_returns_zeroed_slot() {
        let mut vector = Vector::new(4);
        vector.push(&[0xFF; 4]);
        vector.clear();

        let slot = vector.emplace();
        assert_eq!(slot, &[0, 0, 0, 0]);
        slot.copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(vector.get(0), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(vector.get(1), None);
    }

    #[test]
    fn erase_preserves_order() {
        let mut vector = Vector::new(core::mem::size_of::<Edge>());
        for i in 0..5 {
            vector.push_value(Edge { from: i, to: i + 1 });
        }

        vector.erase(1);
        vector.erase(3);
        let froms: Vec<u32> = (0..vector.len()).map(|i| vector.at::<Edge>(i).from).collect();
        assert_eq!(froms, [0, 2, 3]);
    }

    #[test]
    fn swap_erase_moves_last() {
        let mut vector = Vector::new(2);
        for i in 0..4u16 {
            vector.push_value(i);
        }
        vector.swap_erase(0);
        let values: Vec<u16> = (0..vector.len()).map(|i| *vector.at::<u16>(i)).collect();
        assert_eq!(values, [3, 1, 2]);

        vector.swap_erase(2);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.back(), Some(&1u16.to_ne_bytes()[..]));
    }

    #[test]
    fn resize_zeroes_reused_space() {
        let mut vector = Vector::with_len_in(2, 4, Heap);
        assert_eq!(vector.iter().collect::<Vec<_>>(), [&[0u8; 4][..], &[0; 4][..]]);

        *vector.at_mut::<u32>(1) = 77;
        vector.resize(1);
        vector.resize(3);
        assert_eq!(*vector.at::<u32>(1), 0);
        assert_eq!(vector.len(), 3);
    }

    #[test]
    fn slices_view_live_elements() {
        let mut vector = Vector::new(4);
        for i in 0..6u32 {
            vector.push_value(i * 10);
        }

        let view = vector.to_slice(2, 3);
        assert_eq!(*view.at::<u32>(0), 20);
        assert_eq!(*view.at::<u32>(2), 40);

        let mut view = vector.to_slice_mut(4, 2);
        *view.at_mut::<u32>(1) = 500;
        assert_eq!(*vector.at::<u32>(5), 500);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn slice_past_len_panics() {
        let mut vector = Vector::new(1);
        vector.reserve(16);
        vector.push(&[1]);
        let _ = vector.to_slice(0, 2);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn typed_push_checks_stride() {
        let mut vector = Vector::new(4);
        vector.push_value(1u64);
    }

    #[test]
    fn allocations_go_through_the_allocator() {
        let tracking = Tracking::default();
        {
            let mut vector = Vector::new_in(4, &tracking);
            for i in 0..100u32 {
                vector.push_value(i);
            }
            assert_eq!(vector.len(), 100);
            assert_eq!(vector.capacity(), 128);
        }
        assert_eq!(tracking.allocations.get(), 1);
        assert!(tracking.reallocations.get() > 0);
        assert_eq!(tracking.live_allocations(), 0);
        assert_eq!(tracking.live_bytes.get(), 0);
    }

    #[test]
    fn failed_growth_keeps_contents() {
        let tracking = Tracking::default();
        let mut vector = Vector::new_in(4, &tracking);

        tracking.fail_in(0);
        assert!(vector.try_emplace().is_err());
        assert!(vector.is_empty());

        vector.push_value(9u32);
        assert_eq!(*vector.at::<u32>(0), 9);
        assert_eq!(
            vector.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
    }
}
