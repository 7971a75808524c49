//! 'bin' holds the per-bucket counts of a sketch. A `Bin` counts at most
//! `MAX_BIN_WIDTH` samples; heavier buckets are spread over several
//! consecutive bins sharing the same key. Bin lists built here are kept
//! sorted by key.

use crate::key::{Key, KeyCount};
use crate::mapping::KeyMapping;
use crate::pool::Pools;

/// The most samples a single bin can count.
pub const MAX_BIN_WIDTH: u16 = u16::MAX;

/// A bucket key and the number of samples counted against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct Bin {
    /// The bucket.
    pub k: Key,
    /// Samples in the bucket, never more than `MAX_BIN_WIDTH`.
    pub n: u16,
}

impl Bin {
    /// Create a new Bin
    pub fn new(k: Key, n: u16) -> Bin {
        Bin { k, n }
    }

    /// Add `by` samples to this bin
    ///
    /// The count saturates at `MAX_BIN_WIDTH`. Whatever did not fit is
    /// returned so the caller can spill it into another bin.
    ///
    /// # Examples
    /// ```
    /// use sketch_summary::bin::{Bin, MAX_BIN_WIDTH};
    /// use sketch_summary::key::Key;
    ///
    /// let mut bin = Bin::new(Key::from(3), MAX_BIN_WIDTH - 1);
    /// assert_eq!(9, bin.increment(10));
    /// assert_eq!(MAX_BIN_WIDTH, bin.n);
    /// ```
    pub fn increment(&mut self, by: u64) -> u64 {
        let next = by.saturating_add(u64::from(self.n));
        if next > u64::from(MAX_BIN_WIDTH) {
            self.n = MAX_BIN_WIDTH;
            return next - u64::from(MAX_BIN_WIDTH);
        }
        self.n = next as u16;
        0
    }
}

/// Append `n` samples of key `k` to `bins`
///
/// Counts wider than `MAX_BIN_WIDTH` are split: the remainder goes into a
/// first bin, followed by as many full bins as needed. A zero count appends
/// nothing.
///
/// # Examples
/// ```
/// use sketch_summary::bin::{append_safe, Bin, MAX_BIN_WIDTH};
/// use sketch_summary::key::Key;
///
/// let k = Key::from(12);
/// let mut bins = Vec::new();
/// append_safe(&mut bins, k, 2 * u64::from(MAX_BIN_WIDTH) + 5);
/// assert_eq!(
///     bins,
///     vec![Bin::new(k, 5), Bin::new(k, MAX_BIN_WIDTH), Bin::new(k, MAX_BIN_WIDTH)]
/// );
/// ```
pub fn append_safe(bins: &mut Vec<Bin>, k: Key, n: u64) {
    let width = u64::from(MAX_BIN_WIDTH);
    if n <= width {
        if n > 0 {
            bins.push(Bin::new(k, n as u16));
        }
        return;
    }

    let rem = n % width;
    if rem != 0 {
        bins.push(Bin::new(k, rem as u16));
    }
    for _ in 0..(n / width) {
        bins.push(Bin::new(k, MAX_BIN_WIDTH));
    }
}

/// Run-length encode a list of keys into `out`
///
/// `keys` is sorted in place. Bins are appended to `out` in key order.
pub fn bins_from_keys(keys: &mut [Key], out: &mut Vec<Bin>) {
    keys.sort_unstable();

    let mut idx = 0;
    while idx < keys.len() {
        let k = keys[idx];
        let run = keys[idx..].iter().take_while(|x| **x == k).count();
        append_safe(out, k, run as u64);
        idx += run;
    }
}

/// Fold a list of key counts into `out`
///
/// `counts` is sorted in place and equal keys are summed before being
/// appended, so every key yields one run of bins.
pub fn bins_from_key_counts(counts: &mut [KeyCount], out: &mut Vec<Bin>) {
    counts.sort_unstable_by(|a, b| a.k.cmp(&b.k));

    let mut idx = 0;
    while idx < counts.len() {
        let k = counts[idx].k;
        let mut n: u64 = 0;
        while idx < counts.len() && counts[idx].k == k {
            n = n.saturating_add(counts[idx].n);
            idx += 1;
        }
        append_safe(out, k, n);
    }
}

/// Map `values` to keys and collect them into bins
///
/// Scratch key storage comes from `pools` and is returned before this
/// function exits. The bin list is taken from `pools` as well; hand it back
/// with `Pools::put_bin_list` once done with it.
///
/// # Examples
/// ```
/// use sketch_summary::bin::bins_for_values;
/// use sketch_summary::mapping::{Config, KeyMapping};
/// use sketch_summary::pool::Pools;
///
/// let mapping = KeyMapping::new(Config::default()).unwrap();
/// let pools = Pools::default();
///
/// let bins = bins_for_values(&mapping, &[1.0, 1.0, 0.0, -1.0], &pools);
/// assert_eq!(bins.len(), 3);
/// assert_eq!(bins.iter().map(|b| u64::from(b.n)).sum::<u64>(), 4);
/// pools.put_bin_list(bins);
/// ```
pub fn bins_for_values(mapping: &KeyMapping, values: &[f64], pools: &Pools) -> Vec<Bin> {
    let mut keys = pools.get_key_list();
    keys.extend(values.iter().map(|v| mapping.key(*v)));

    let mut bins = pools.get_bin_list();
    bins_from_keys(&mut keys, &mut bins);
    pools.put_key_list(keys);
    bins
}

/// Total number of samples counted by `bins`.
pub fn total_count(bins: &[Bin]) -> u64 {
    bins.iter().map(|b| u64::from(b.n)).sum()
}

/// Whether `bins` is ordered by key.
pub fn is_sorted(bins: &[Bin]) -> bool {
    bins.windows(2).all(|w| w[0].k <= w[1].k)
}
