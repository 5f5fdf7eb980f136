//! Fixed-capacity FIFO window backed by a ring buffer.

/// Trailing window over the last `capacity` values
///
/// Storage is allocated once; pushing into a full window overwrites the
/// oldest slot.
#[derive(Debug, Clone)]
pub struct RingWindow {
    buffer: Vec<f64>,
    head: usize,
    len: usize,
}

impl RingWindow {
    /// Create an empty window
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Window size must be greater than 0");
        Self {
            buffer: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Append a value, evicting the oldest when full
    pub fn push(&mut self, value: f64) {
        let capacity = self.buffer.len();
        let slot = (self.head + self.len) % capacity;
        self.buffer[slot] = value;
        if self.len < capacity {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % capacity;
        }
    }

    /// Mean of the values currently held, `None` while empty
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }

    /// Median of the values currently held, `None` while empty
    #[must_use]
    pub fn median(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let mut sorted: Vec<f64> = self.iter().collect();
        sorted.sort_by(f64::total_cmp);

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.buffer.len();
        (0..self.len).map(move |i| self.buffer[(self.head + i) % capacity])
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
