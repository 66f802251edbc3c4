use std::cmp::Ordering;

const WORD_BITS: usize = 64;

/// Outcome of offering an item to the queue.
#[derive(Debug, PartialEq, Eq)]
pub enum Offer<T> {
    /// The item was queued under a new key.
    Inserted,
    /// An equal key was already queued; the offered item is handed back.
    Rejected(T),
    /// An equal key was already queued and has been overwritten; the evicted item is handed back.
    Replaced(T),
}

/// A bucketed priority queue ordered by `(priority, key)`, where the key
/// order is supplied by the caller on every call. Within a bucket, items
/// are unique under that order.
///
/// Buckets are allocated on demand so priorities are unbounded; a bitmap
/// over non-empty buckets keeps pop-min cheap.
pub struct PriorityQueue<T> {
    // Each bucket is sorted in descending key order so the minimum sits at the back.
    buckets: Vec<Vec<T>>,
    bitmap: Vec<u64>,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            bitmap: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn ensure_bucket(&mut self, priority: usize) {
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, Vec::new);
            self.bitmap.resize(priority / WORD_BITS + 1, 0);
        }
    }

    /// Offer `item` at `priority`. If an item with an equal key is already
    /// queued at the same priority, `replace(existing, offered)` decides
    /// whether the offered item overwrites it.
    ///
    /// Finding the slot takes O(log b) calls to `cmp` for a bucket of `b`
    /// items; inserting then shifts up to `b` items within the bucket.
    pub fn offer(
        &mut self,
        priority: usize,
        item: T,
        cmp: impl Fn(&T, &T) -> Ordering,
        replace: impl FnOnce(&T, &T) -> bool,
    ) -> Offer<T> {
        self.ensure_bucket(priority);
        let bucket = &mut self.buckets[priority];

        match bucket.binary_search_by(|queued| cmp(queued, &item).reverse()) {
            Ok(idx) => {
                if replace(&bucket[idx], &item) {
                    Offer::Replaced(std::mem::replace(&mut bucket[idx], item))
                } else {
                    Offer::Rejected(item)
                }
            }
            Err(idx) => {
                bucket.insert(idx, item);
                self.bitmap[priority / WORD_BITS] |= 1u64 << (priority % WORD_BITS);
                self.len += 1;
                Offer::Inserted
            }
        }
    }

    /// Remove the item with the lowest priority, breaking ties by lowest key.
    pub fn pop_min(&mut self) -> Option<(usize, T)> {
        let word_idx = self.bitmap.iter().position(|&word| word != 0)?;
        let bit_idx = self.bitmap[word_idx].trailing_zeros() as usize;
        let priority = word_idx * WORD_BITS + bit_idx;

        let item = self.buckets[priority].pop()?;
        self.len -= 1;

        if self.buckets[priority].is_empty() {
            self.bitmap[word_idx] &= !(1u64 << bit_idx);
        }

        Some((priority, item))
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
