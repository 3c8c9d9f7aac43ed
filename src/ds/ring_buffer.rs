#![allow(clippy::len_without_is_empty)]
use std::ops::Index;

/// A fixed-capacity ring buffer that overwrites its oldest element once full
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be non-zero");
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the number of stored elements
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element, and return the write index
    pub fn push(&mut self, item: T) -> usize {
        let ix = self.ix;
        if ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[ix] = item;
        }
        self.ix = (ix + 1) % self.capacity;
        ix
    }

    /// Drop every element, keeping the capacity
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ix = 0;
    }

    /// Iterate from the oldest to the newest element
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.buffer.split_at(self.ix.min(self.len()));
        older.iter().chain(newer.iter())
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    /// Index by write position, not by age
    fn index(&self, index: usize) -> &Self::Output {
        &self.buffer[index]
    }
}
