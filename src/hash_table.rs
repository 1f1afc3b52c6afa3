//! An open-addressing hash table keyed by `u32`.
//!
//! Keys are spread with Fibonacci hashing and collisions are resolved by
//! linear probing. Lookups scan at most [`probe_length`] slots past a key's
//! home slot, where `probe_length` is the longest probe any insertion has
//! needed since the table was last empty. Removal uses backward-shift
//! compaction instead of tombstones, so the table never accumulates dead
//! slots.
//!
//! [`probe_length`]: HashTable::probe_length

use core::alloc::Layout;
use core::fmt::Debug;
use core::ptr::NonNull;

use bytemuck::Pod;

use crate::allocator::Heap;
use crate::allocator::RawAllocator;
use crate::error::TryReserveError;
use crate::error::infallible;

/// 2^64 divided by the golden ratio, rounded to an odd integer.
const FIBONACCI: u64 = 11_400_714_819_323_198_485;

/// Key value marking an empty slot. It can never be stored as a key.
pub const EMPTY_KEY: u32 = u32::MAX;

/// Smallest capacity a table is ever allocated with.
pub const MIN_CAPACITY: u32 = 4;

/// Maps `key` to its home slot in `[0, capacity)`.
#[inline(always)]
fn home_slot(key: u32, capacity: u32) -> u32 {
    let mixed = (key as u64).wrapping_mul(FIBONACCI) as u32;
    ((mixed as u64 * capacity as u64) >> 32) as u32
}

#[inline(always)]
fn probe_slot(home: u32, probe: u32, capacity: u32) -> usize {
    ((home as u64 + probe as u64) % capacity as u64) as usize
}

/// Returns `true` if holding `size` entries in `capacity` slots would exceed
/// `load_factor`.
#[inline(always)]
fn exceeds_load(size: u32, capacity: u32, load_factor: f32) -> bool {
    size as f64 > load_factor as f64 * capacity as f64
}

/// Smallest capacity holding `size` entries within `load_factor`, never below
/// [`MIN_CAPACITY`].
fn capacity_for(size: u32, load_factor: f32) -> Result<u32, TryReserveError> {
    let ideal = size as f64 / load_factor as f64;
    let mut rounded = ideal as u64;
    if (rounded as f64) < ideal {
        rounded += 1;
    }

    let mut capacity = u32::try_from(rounded)
        .map_err(|_| TryReserveError::CapacityOverflow)?
        .max(MIN_CAPACITY);
    while exceeds_load(size, capacity, load_factor) {
        capacity = capacity
            .checked_add(1)
            .ok_or(TryReserveError::CapacityOverflow)?;
    }

    Ok(capacity)
}

#[derive(Debug, Clone, Copy)]
struct DataLayout {
    keys: Layout,
    values: Layout,
}

impl DataLayout {
    /// Keys get `capacity` slots. Values get one more: the last one is
    /// scratch space for removal.
    fn new<V>(capacity: u32) -> Result<Self, TryReserveError> {
        let keys = Layout::array::<u32>(capacity as usize)
            .map_err(|_| TryReserveError::CapacityOverflow)?;
        let values = Layout::array::<V>(capacity as usize + 1)
            .map_err(|_| TryReserveError::CapacityOverflow)?;
        Ok(DataLayout { keys, values })
    }
}

/// Allocates and initializes key and value arrays for `layout`: every key is
/// [`EMPTY_KEY`] and every value is zeroed.
///
/// Either both arrays are returned or neither stays allocated.
fn allocate_arrays<V, A: RawAllocator>(
    alloc: &A,
    layout: DataLayout,
) -> Result<(NonNull<u32>, NonNull<V>), TryReserveError> {
    let keys = alloc
        .allocate(layout.keys)
        .map_err(|_| TryReserveError::AllocError {
            layout: layout.keys,
        })?;

    let values = if layout.values.size() == 0 {
        NonNull::<V>::dangling()
    } else {
        match alloc.allocate(layout.values) {
            Ok(values) => values.cast(),
            Err(_) => {
                // SAFETY: `keys` was just allocated by `alloc` with this layout.
                unsafe { alloc.free(keys, layout.keys) };
                return Err(TryReserveError::AllocError {
                    layout: layout.values,
                });
            }
        }
    };

    // SAFETY: Both blocks are valid for their layout sizes. All-ones is
    // `EMPTY_KEY` in every key and zero bytes are a valid `V` for `Pod`.
    unsafe {
        core::ptr::write_bytes(keys.as_ptr(), 0xFF, layout.keys.size());
        core::ptr::write_bytes(values.as_ptr().cast::<u8>(), 0, layout.values.size());
    }

    Ok((keys.cast(), values))
}

/// Returns arrays obtained from [`allocate_arrays`] to `alloc`.
///
/// # Safety
///
/// `keys` and `values` must come from `allocate_arrays` with the same
/// allocator and `layout`, and must not be used afterwards.
unsafe fn free_arrays<V, A: RawAllocator>(
    alloc: &A,
    layout: DataLayout,
    keys: NonNull<u32>,
    values: NonNull<V>,
) {
    // SAFETY: Caller guarantees provenance and layouts.
    unsafe {
        alloc.free(keys.cast(), layout.keys);
        if layout.values.size() != 0 {
            alloc.free(values.cast(), layout.values);
        }
    }
}

/// A map from `u32` keys to fixed-size plain values.
///
/// Values must be [`Pod`]: the table copies them as bytes, zeroes vacated
/// slots, and never runs constructors or destructors. The value stride is
/// `size_of::<V>()`. Key [`EMPTY_KEY`] (`u32::MAX`) is reserved.
///
/// The table keeps `len() / capacity() <= load_factor()` by growing before an
/// insertion would break the bound. The load factor is below one, so at least
/// one slot is always empty. Capacity only grows; [`clear`] keeps the
/// allocation.
///
/// Memory comes from the [`RawAllocator`] given at construction. Growth
/// allocates both new arrays before touching the table, so a failed growth
/// leaves the table exactly as it was.
///
/// [`clear`]: HashTable::clear
///
/// ## Example
///
/// ```rust
/// use strided::HashTable;
///
/// let mut table: HashTable<[f32; 3]> = HashTable::with_capacity(0, 0.75);
/// table.insert(7, [1.0, 2.0, 3.0]);
/// *table.emplace(9) = [4.0, 5.0, 6.0];
///
/// assert_eq!(table.find(7), Some(&[1.0, 2.0, 3.0]));
/// assert_eq!(table.remove(9), Some([4.0, 5.0, 6.0]));
/// assert_eq!(table.find(9), None);
/// assert_eq!(table.len(), 1);
/// ```
pub struct HashTable<V, A: RawAllocator = Heap> {
    layout: DataLayout,
    keys: NonNull<u32>,
    values: NonNull<V>,

    capacity: u32,
    size: u32,
    probe_length: u32,
    load_factor: f32,

    alloc: A,
}

// SAFETY: The table exclusively owns its arrays.
unsafe impl<V: Send, A: RawAllocator + Send> Send for HashTable<V, A> {}
// SAFETY: Shared access only reads the arrays.
unsafe impl<V: Sync, A: RawAllocator + Sync> Sync for HashTable<V, A> {}

impl<V: Pod> HashTable<V, Heap> {
    /// Creates a table on the platform heap with room for `capacity` entries
    /// at `load_factor`.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let table: HashTable<u64> = HashTable::with_capacity(100, 0.5);
    /// assert!(table.capacity() >= 200);
    ///
    /// // The hint is rounded up to the minimum capacity.
    /// let small: HashTable<u64> = HashTable::with_capacity(0, 0.5);
    /// assert_eq!(small.capacity(), 4);
    /// ```
    pub fn with_capacity(capacity: u32, load_factor: f32) -> Self {
        Self::with_capacity_in(capacity, load_factor, Heap)
    }
}

impl<V: Pod, A: RawAllocator> HashTable<V, A> {
    /// Creates a table with room for `capacity` entries at `load_factor`,
    /// taking memory from `alloc`.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1)`.
    pub fn with_capacity_in(capacity: u32, load_factor: f32, alloc: A) -> Self {
        infallible(Self::try_with_capacity_in(capacity, load_factor, alloc))
    }

    /// Fallible version of [`with_capacity_in`](Self::with_capacity_in).
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1)`.
    pub fn try_with_capacity_in(
        capacity: u32,
        load_factor: f32,
        alloc: A,
    ) -> Result<Self, TryReserveError> {
        assert!(
            load_factor > 0.0 && load_factor < 1.0,
            "load factor must be in (0, 1), got {load_factor}"
        );

        let capacity = capacity_for(capacity, load_factor)?;
        let layout = DataLayout::new::<V>(capacity)?;
        let (keys, values) = allocate_arrays::<V, A>(&alloc, layout)?;

        Ok(Self {
            layout,
            keys,
            values,
            capacity,
            size: 0,
            probe_length: 0,
            load_factor,
            alloc,
        })
    }

    #[inline(always)]
    fn key_slots(&self) -> &[u32] {
        // SAFETY: `keys` holds `capacity` initialized keys.
        unsafe { core::slice::from_raw_parts(self.keys.as_ptr(), self.capacity as usize) }
    }

    #[inline(always)]
    fn key_slots_mut(&mut self) -> &mut [u32] {
        // SAFETY: As in `key_slots`; `&mut self` guarantees exclusivity.
        unsafe { core::slice::from_raw_parts_mut(self.keys.as_ptr(), self.capacity as usize) }
    }

    /// All value slots, including the trailing scratch slot.
    #[inline(always)]
    fn value_slots(&self) -> &[V] {
        // SAFETY: `values` holds `capacity + 1` initialized values.
        unsafe {
            core::slice::from_raw_parts(self.values.as_ptr(), self.capacity as usize + 1)
        }
    }

    #[inline(always)]
    fn value_slots_mut(&mut self) -> &mut [V] {
        // SAFETY: As in `value_slots`; `&mut self` guarantees exclusivity.
        unsafe {
            core::slice::from_raw_parts_mut(self.values.as_ptr(), self.capacity as usize + 1)
        }
    }

    /// Returns the number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of allocated slots.
    ///
    /// At most `capacity() * load_factor()` of them are ever in use.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Returns the size of one value in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        core::mem::size_of::<V>()
    }

    /// Returns the maximum ratio of entries to slots.
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the longest probe any live key may need.
    ///
    /// This is a high-water mark: insertions raise it, and it only drops back
    /// to zero when the table becomes empty.
    #[inline]
    pub fn probe_length(&self) -> u32 {
        self.probe_length
    }

    /// Returns the allocator backing this table.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the slot index holding `key`, if present.
    ///
    /// Scans `probe_length() + 1` slots from the key's home slot. The scan
    /// does not stop at empty slots.
    #[inline]
    pub fn find_index(&self, key: u32) -> Option<usize> {
        if self.size == 0 || key == EMPTY_KEY {
            return None;
        }

        let home = home_slot(key, self.capacity);
        let keys = self.key_slots();
        (0..=self.probe_length)
            .map(|probe| probe_slot(home, probe, self.capacity))
            .find(|&index| keys[index] == key)
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let mut table: HashTable<u16> = HashTable::with_capacity(8, 0.75);
    /// table.insert(42, 420);
    ///
    /// assert_eq!(table.find(42), Some(&420));
    /// assert_eq!(table.find(43), None);
    /// ```
    #[inline]
    pub fn find(&self, key: u32) -> Option<&V> {
        self.find_index(key).map(|index| &self.value_slots()[index])
    }

    /// Returns a mutable reference to the value stored for `key`.
    #[inline]
    pub fn find_mut(&mut self, key: u32) -> Option<&mut V> {
        self.find_index(key)
            .map(|index| &mut self.value_slots_mut()[index])
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: u32) -> bool {
        self.find_index(key).is_some()
    }

    /// Ensures the table can hold `size` entries without growing.
    ///
    /// Capacity becomes `ceil(size / load_factor)` (at least
    /// [`MIN_CAPACITY`]) unless it is already larger. Never shrinks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let mut table: HashTable<u32> = HashTable::with_capacity(0, 0.5);
    /// table.reserve(10);
    /// assert_eq!(table.capacity(), 20);
    ///
    /// table.reserve(2);
    /// assert_eq!(table.capacity(), 20);
    /// ```
    pub fn reserve(&mut self, size: u32) {
        infallible(self.try_reserve(size))
    }

    /// Fallible version of [`reserve`](Self::reserve). On error the table is
    /// unchanged.
    pub fn try_reserve(&mut self, size: u32) -> Result<(), TryReserveError> {
        let capacity = capacity_for(size, self.load_factor)?;
        if capacity > self.capacity {
            self.resize(capacity)?;
        }
        Ok(())
    }

    /// Returns the value slot for `key`, inserting a zeroed value if the key
    /// is absent.
    ///
    /// May grow the table.
    ///
    /// # Panics
    ///
    /// Panics if `key` is [`EMPTY_KEY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let mut table: HashTable<u32> = HashTable::with_capacity(0, 0.75);
    /// *table.emplace(3) += 5;
    /// *table.emplace(3) += 5;
    /// assert_eq!(table.find(3), Some(&10));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn emplace(&mut self, key: u32) -> &mut V {
        infallible(self.try_emplace(key))
    }

    /// Fallible version of [`emplace`](Self::emplace). On error the table is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `key` is [`EMPTY_KEY`].
    pub fn try_emplace(&mut self, key: u32) -> Result<&mut V, TryReserveError> {
        let (index, _) = self.find_or_claim(key)?;
        Ok(&mut self.value_slots_mut()[index])
    }

    /// Stores `value` for `key`, returning the previous value if the key was
    /// already present.
    ///
    /// May grow the table.
    ///
    /// # Panics
    ///
    /// Panics if `key` is [`EMPTY_KEY`].
    pub fn insert(&mut self, key: u32, value: V) -> Option<V> {
        infallible(self.try_insert(key, value))
    }

    /// Fallible version of [`insert`](Self::insert). On error the table is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `key` is [`EMPTY_KEY`].
    pub fn try_insert(&mut self, key: u32, value: V) -> Result<Option<V>, TryReserveError> {
        let (index, existed) = self.find_or_claim(key)?;
        let previous = core::mem::replace(&mut self.value_slots_mut()[index], value);
        Ok(existed.then_some(previous))
    }

    /// Returns the slot index for `key` and whether it was already present.
    /// Absent keys are placed after growing the table if necessary.
    #[track_caller]
    fn find_or_claim(&mut self, key: u32) -> Result<(usize, bool), TryReserveError> {
        assert_ne!(key, EMPTY_KEY, "key {EMPTY_KEY:#x} is reserved for empty slots");

        if let Some(index) = self.find_index(key) {
            return Ok((index, true));
        }

        self.grow_for_insert()?;
        Ok((self.place(key), false))
    }

    #[inline]
    fn grow_for_insert(&mut self) -> Result<(), TryReserveError> {
        if self.capacity >= MIN_CAPACITY
            && !exceeds_load(self.size + 1, self.capacity, self.load_factor)
        {
            return Ok(());
        }

        let mut capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(TryReserveError::CapacityOverflow)?
            .max(MIN_CAPACITY);
        while exceeds_load(self.size + 1, capacity, self.load_factor) {
            capacity = capacity
                .checked_mul(2)
                .ok_or(TryReserveError::CapacityOverflow)?;
        }

        self.resize(capacity)
    }

    /// Writes `key` into the first empty slot at or after its home slot and
    /// returns that slot. The value slot is left as it was (zeroed).
    ///
    /// The caller must ensure at least one slot is empty.
    fn place(&mut self, key: u32) -> usize {
        debug_assert!(self.size < self.capacity);

        let capacity = self.capacity;
        let home = home_slot(key, capacity);
        let keys = self.key_slots_mut();

        let mut probe = 0;
        let index = loop {
            let index = probe_slot(home, probe, capacity);
            if keys[index] == EMPTY_KEY {
                break index;
            }
            probe += 1;
        };

        keys[index] = key;
        self.size += 1;
        self.probe_length = self.probe_length.max(probe);
        index
    }

    /// Moves every entry into freshly allocated arrays of `capacity` slots.
    ///
    /// `probe_length` carries over: re-placed keys can only raise it.
    #[cold]
    fn resize(&mut self, capacity: u32) -> Result<(), TryReserveError> {
        debug_assert!(capacity > self.capacity);

        let layout = DataLayout::new::<V>(capacity)?;
        let (keys, values) = allocate_arrays::<V, A>(&self.alloc, layout)?;

        debug_event!(
            from = self.capacity,
            to = capacity,
            size = self.size,
            "hash table resized"
        );

        let old_layout = core::mem::replace(&mut self.layout, layout);
        let old_keys = core::mem::replace(&mut self.keys, keys);
        let old_values = core::mem::replace(&mut self.values, values);
        let old_capacity = core::mem::replace(&mut self.capacity, capacity) as usize;
        self.size = 0;

        // SAFETY: The old arrays stay allocated until the end of this block
        // and hold `old_capacity` initialized keys and values.
        unsafe {
            let old_key_slots = core::slice::from_raw_parts(old_keys.as_ptr(), old_capacity);
            let old_value_slots = core::slice::from_raw_parts(old_values.as_ptr(), old_capacity);

            for (&key, &value) in old_key_slots.iter().zip(old_value_slots) {
                if key != EMPTY_KEY {
                    let index = self.place(key);
                    self.value_slots_mut()[index] = value;
                }
            }

            free_arrays(&self.alloc, old_layout, old_keys, old_values);
        }

        Ok(())
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// Entries that probed past the removed slot are re-homed so every
    /// remaining key stays reachable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let mut table: HashTable<u8> = HashTable::with_capacity(4, 0.75);
    /// table.insert(1, 10);
    /// table.insert(2, 20);
    ///
    /// assert_eq!(table.remove(1), Some(10));
    /// assert_eq!(table.remove(1), None);
    /// assert_eq!(table.find(2), Some(&20));
    /// ```
    pub fn remove(&mut self, key: u32) -> Option<V> {
        self.find_index(key)
            .map(|index| self.remove_at_index(index))
    }

    /// Removes the entry in slot `index`, as returned by
    /// [`find_index`](Self::find_index), and returns its value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the slot is empty.
    pub fn remove_at_index(&mut self, index: usize) -> V {
        assert!(
            index < self.capacity() && self.key_slots()[index] != EMPTY_KEY,
            "slot {index} is not occupied"
        );

        let removed = self.vacate(index);

        let scratch = self.capacity();
        let mut next = (index + 1) % scratch;
        while self.key_slots()[next] != EMPTY_KEY {
            let key = self.key_slots()[next];
            let value = self.vacate(next);
            self.value_slots_mut()[scratch] = value;

            let target = self.place(key);
            let values = self.value_slots_mut();
            values[target] = values[scratch];
            values[scratch] = V::zeroed();

            next = (next + 1) % scratch;
        }

        if self.size == 0 {
            self.probe_length = 0;
        }

        removed
    }

    /// Empties slot `index` and returns the value it held.
    #[inline]
    fn vacate(&mut self, index: usize) -> V {
        self.key_slots_mut()[index] = EMPTY_KEY;
        self.size -= 1;
        core::mem::replace(&mut self.value_slots_mut()[index], V::zeroed())
    }

    /// Removes every entry, keeping the allocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strided::HashTable;
    ///
    /// let mut table: HashTable<u32> = HashTable::with_capacity(0, 0.75);
    /// for key in 0..100 {
    ///     table.insert(key, key);
    /// }
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.key_slots_mut().fill(EMPTY_KEY);
        self.value_slots_mut().fill(V::zeroed());
        self.size = 0;
        self.probe_length = 0;
    }

    /// Returns an iterator over `(key, &value)` pairs in slot order.
    ///
    /// The order is arbitrary and changes when the table grows or entries
    /// are removed.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            keys: self.key_slots().iter(),
            values: self.value_slots().iter(),
            remaining: self.size as usize,
        }
    }

    /// Counts live keys by distance from their home slot.
    ///
    /// Entry `i` of the result is the number of keys stored `i` slots past
    /// their home slot. The result has `probe_length() + 1` entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = alloc::vec![0usize; self.probe_length as usize + 1];
        for (index, &key) in self.key_slots().iter().enumerate() {
            if key == EMPTY_KEY {
                continue;
            }
            let home = home_slot(key, self.capacity) as usize;
            let distance = (index + self.capacity() - home) % self.capacity();
            counts[distance] += 1;
        }
        ProbeHistogram { counts }
    }

    /// Returns utilization statistics for the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_probes: usize = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        let empty_slots = self.capacity() - self.len();

        DebugStats {
            populated: self.len(),
            capacity: self.capacity(),
            probe_length: self.probe_length,
            target_load_factor: self.load_factor,
            load_factor: self.len() as f64 / self.capacity() as f64,
            mean_probe: if self.is_empty() {
                0.0
            } else {
                total_probes as f64 / self.len() as f64
            },
            total_bytes: self.layout.keys.size() + self.layout.values.size(),
            wasted_bytes: empty_slots * (core::mem::size_of::<u32>() + self.stride()),
        }
    }
}

impl<V, A: RawAllocator> Drop for HashTable<V, A> {
    fn drop(&mut self) {
        // SAFETY: The arrays were allocated by `allocate_arrays` with
        // `self.alloc` and `self.layout`, and are not used again.
        unsafe { free_arrays(&self.alloc, self.layout, self.keys, self.values) }
    }
}

impl<V: Pod, A: RawAllocator + Clone> Clone for HashTable<V, A> {
    fn clone(&self) -> Self {
        let alloc = self.alloc.clone();
        let (keys, values) = infallible(allocate_arrays::<V, A>(&alloc, self.layout));

        // SAFETY: Both tables have arrays of the same layout, and the new ones
        // are distinct allocations.
        unsafe {
            core::ptr::copy_nonoverlapping(self.keys.as_ptr(), keys.as_ptr(), self.capacity());
            core::ptr::copy_nonoverlapping(
                self.values.as_ptr(),
                values.as_ptr(),
                self.capacity() + 1,
            );
        }

        Self {
            layout: self.layout,
            keys,
            values,
            capacity: self.capacity,
            size: self.size,
            probe_length: self.probe_length,
            load_factor: self.load_factor,
            alloc,
        }
    }
}

impl<V: Pod + Debug, A: RawAllocator> Debug for HashTable<V, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Entries<'a, V: Pod, A: RawAllocator>(&'a HashTable<V, A>);

        impl<V: Pod + Debug, A: RawAllocator> Debug for Entries<'_, V, A> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("HashTable")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("probe_length", &self.probe_length)
            .field("load_factor", &self.load_factor)
            .field("entries", &Entries(self))
            .finish()
    }
}

impl<'a, V: Pod, A: RawAllocator> IntoIterator for &'a HashTable<V, A> {
    type IntoIter = Iter<'a, V>;
    type Item = (u32, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    keys: core::slice::Iter<'a, u32>,
    values: core::slice::Iter<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let key = *self.keys.next()?;
            let value = self.values.next()?;
            if key != EMPTY_KEY {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Probe-length distribution of a [`HashTable`].
///
/// Compiled with `cfg(test)` or the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `counts[i]` is the number of keys stored `i` slots past their home.
    pub counts: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total: usize = self.counts.iter().sum();
        println!("probe histogram ({} entries):", total);
        for (distance, &count) in self.counts.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

/// Utilization statistics for a [`HashTable`].
///
/// Compiled with `cfg(test)` or the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table
    pub populated: usize,
    /// Number of allocated slots
    pub capacity: usize,
    /// Current probe-length high-water mark
    pub probe_length: u32,
    /// Configured maximum load factor
    pub target_load_factor: f32,
    /// Actual load factor (populated / capacity)
    pub load_factor: f64,
    /// Mean distance of keys from their home slot
    pub mean_probe: f64,
    /// Bytes allocated for keys and values
    pub total_bytes: usize,
    /// Bytes held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load, target {:.2}%)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.target_load_factor * 100.0
        );
        println!(
            "Probing: max {}, mean {:.3}",
            self.probe_length, self.mean_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}
