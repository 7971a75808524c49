//! 'pool' recycles the scratch vectors sketches churn through while merging
//! and inserting. Pools are plain objects handed to whoever needs them; there
//! is no process-wide pool. Pooling is purely an allocation optimization: a
//! vector from `get` behaves exactly like a freshly allocated one.
//!
//! # Examples
//!
//! ```
//! use sketch_summary::key::Key;
//! use sketch_summary::pool::Pools;
//!
//! let pools = Pools::default();
//!
//! let mut keys = pools.get_key_list();
//! keys.push(Key::from(4));
//! pools.put_key_list(keys);
//!
//! let keys = pools.get_key_list();
//! assert!(keys.is_empty());
//! assert!(keys.capacity() >= 256);
//! ```

use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use crate::bin::Bin;
use crate::key::Key;

/// Default number of bins a sketch keeps before collapsing.
pub const DEFAULT_BIN_LIMIT: usize = 4096;

/// Capacity of pooled bin lists. Merges may briefly hold two sketches' worth
/// of bins.
pub const DEFAULT_BIN_LIST_SIZE: usize = 2 * DEFAULT_BIN_LIMIT;

/// Capacity of pooled key lists.
pub const DEFAULT_KEY_LIST_SIZE: usize = 256;

/// Buffers a pool holds on to before it starts dropping returned ones.
pub const DEFAULT_MAX_RETAINED: usize = 64;

/// Sizing of a `BufferPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Capacity every vector handed out by the pool has at least.
    pub capacity: usize,
    /// Upper bound on idle vectors kept for reuse.
    pub max_retained: usize,
}

impl PoolConfig {
    /// Create a new PoolConfig retaining up to `DEFAULT_MAX_RETAINED` buffers.
    pub fn with_capacity(capacity: usize) -> PoolConfig {
        PoolConfig {
            capacity,
            max_retained: DEFAULT_MAX_RETAINED,
        }
    }
}

/// A thread-safe free list of vectors
pub struct BufferPool<T> {
    config: PoolConfig,
    free: Mutex<Vec<Vec<T>>>,
}

impl<T> fmt::Debug for BufferPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("config", &self.config)
            .field("retained", &self.retained())
            .finish()
    }
}

impl<T> BufferPool<T> {
    /// Create a new, empty BufferPool
    pub fn new(config: PoolConfig) -> BufferPool<T> {
        BufferPool {
            config,
            free: Mutex::new(Vec::new()),
        }
    }

    /// The sizing this pool was built with.
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Take an empty vector from the pool
    ///
    /// The vector has length zero and at least the configured capacity. When
    /// no idle vector is available a new one is allocated.
    pub fn get(&self) -> Vec<T> {
        let pooled = self.free.lock().pop();
        match pooled {
            Some(v) => v,
            None => {
                trace!(capacity = self.config.capacity, "pool empty, allocating");
                Vec::with_capacity(self.config.capacity)
            }
        }
    }

    /// Return a vector to the pool
    ///
    /// The vector is cleared before being kept. Vectors that shrank below the
    /// configured capacity, or that arrive while the pool already retains
    /// `max_retained` vectors, are dropped instead.
    pub fn put(&self, mut v: Vec<T>) {
        if v.capacity() < self.config.capacity {
            trace!(capacity = v.capacity(), "dropping undersized buffer");
            return;
        }
        v.clear();

        let mut free = self.free.lock();
        if free.len() >= self.config.max_retained {
            trace!(retained = free.len(), "pool full, dropping buffer");
            return;
        }
        free.push(v);
    }

    /// Number of idle vectors currently held.
    pub fn retained(&self) -> usize {
        self.free.lock().len()
    }
}

/// The pools used by sketch code
///
/// One pool for bin lists and one for key lists. Share a `Pools` by
/// reference (or behind an `Arc`) between every sketch that should draw from
/// the same buffers.
#[derive(Debug)]
pub struct Pools {
    bins: BufferPool<Bin>,
    keys: BufferPool<Key>,
}

impl Default for Pools {
    fn default() -> Pools {
        Pools::new(
            PoolConfig::with_capacity(DEFAULT_BIN_LIST_SIZE),
            PoolConfig::with_capacity(DEFAULT_KEY_LIST_SIZE),
        )
    }
}

impl Pools {
    /// Create a new Pools with explicit sizing for each list kind.
    pub fn new(bins: PoolConfig, keys: PoolConfig) -> Pools {
        Pools {
            bins: BufferPool::new(bins),
            keys: BufferPool::new(keys),
        }
    }

    /// Take an empty bin list.
    pub fn get_bin_list(&self) -> Vec<Bin> {
        self.bins.get()
    }

    /// Return a bin list for reuse.
    pub fn put_bin_list(&self, bins: Vec<Bin>) {
        self.bins.put(bins)
    }

    /// Take an empty key list.
    pub fn get_key_list(&self) -> Vec<Key> {
        self.keys.get()
    }

    /// Return a key list for reuse.
    pub fn put_key_list(&self, keys: Vec<Key>) {
        self.keys.put(keys)
    }

    /// The bin list pool.
    pub fn bins(&self) -> &BufferPool<Bin> {
        &self.bins
    }

    /// The key list pool.
    pub fn keys(&self) -> &BufferPool<Key> {
        &self.keys
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fresh_lists_are_presized() {
        let pools = Pools::default();
        let bins = pools.get_bin_list();
        let keys = pools.get_key_list();

        assert!(bins.is_empty());
        assert!(keys.is_empty());
        assert!(bins.capacity() >= DEFAULT_BIN_LIST_SIZE);
        assert!(keys.capacity() >= DEFAULT_KEY_LIST_SIZE);
    }

    #[test]
    fn reuses_returned_buffers() {
        let pool = BufferPool::<u64>::new(PoolConfig::with_capacity(16));
        let mut v = pool.get();
        v.extend(0..100);
        let ptr = v.as_ptr();
        pool.put(v);
        assert_eq!(1, pool.retained());

        let v = pool.get();
        assert!(v.is_empty());
        assert_eq!(ptr, v.as_ptr());
        assert_eq!(0, pool.retained());
    }

    #[test]
    fn drops_undersized_buffers() {
        let pool = BufferPool::<u64>::new(PoolConfig::with_capacity(16));
        pool.put(Vec::new());
        pool.put(Vec::with_capacity(4));
        assert_eq!(0, pool.retained());
    }

    #[test]
    fn respects_max_retained() {
        let pool = BufferPool::<u64>::new(PoolConfig {
            capacity: 1,
            max_retained: 3,
        });
        for _ in 0..10 {
            pool.put(Vec::with_capacity(1));
        }
        assert_eq!(3, pool.retained());
    }

    #[test]
    fn concurrent_get_put() {
        let pools = Arc::new(Pools::default());
        let mut handles = Vec::new();
        for t in 0..8 {
            let pools = Arc::clone(&pools);
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    let mut keys = pools.get_key_list();
                    assert!(keys.is_empty());
                    keys.push(Key::from(((t * 500 + i) % 1000) as i16));
                    pools.put_key_list(keys);

                    let mut bins = pools.get_bin_list();
                    assert!(bins.is_empty());
                    bins.push(Bin::new(Key::from(t as i16), 1));
                    pools.put_bin_list(bins);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert!(pools.keys().retained() <= DEFAULT_MAX_RETAINED);
        assert!(pools.bins().retained() <= DEFAULT_MAX_RETAINED);
        assert!(pools.keys().retained() >= 1);
    }
}
