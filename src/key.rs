//! 'key' is the quantized representation of a sample. A sketch never stores
//! the samples it sees, only the bucket each one falls into, and `Key` is the
//! index of that bucket.
//!
//! Keys are signed 16-bit integers, symmetric around zero. Negative samples
//! map to negative keys and zero (or anything too small to resolve) maps to
//! key 0. The two extremes of the range are reserved as sentinels for +Inf
//! and -Inf, so ordinary keys must stay strictly inside `(-MAX_KEY, MAX_KEY)`.
//! `mapping::KeyMapping` is responsible for upholding that.
//!
//! # Examples
//!
//! ```
//! use sketch_summary::key::{Key, MAX_KEY};
//!
//! assert!(Key::inf(1).is_inf());
//! assert!(Key::inf(-3).is_inf());
//! assert!(!Key::from(MAX_KEY).is_inf());
//! assert_eq!("+Inf", Key::inf(0).to_string());
//! assert_eq!("-Inf", Key::inf(-1).to_string());
//! assert_eq!("-42", Key::from(-42).to_string());
//! ```

use std::fmt;

/// Magnitude of the infinity sentinels.
pub const UV_INF: i16 = 0x7FFF;

/// Largest magnitude reserved for ordinary keys, one below the sentinel.
pub const MAX_KEY: i16 = UV_INF - 1;

/// A quantized sample: the index of the bucket a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct Key(i16);

impl Key {
    /// The key of the zero bucket.
    pub const ZERO: Key = Key(0);

    /// Return the infinity sentinel for the given sign
    ///
    /// Only the sign of `sign` matters: anything `>= 0` yields +Inf, anything
    /// negative yields -Inf.
    pub fn inf(sign: i32) -> Key {
        if sign >= 0 {
            Key(UV_INF)
        } else {
            Key(-UV_INF)
        }
    }

    /// Whether this key is one of the two infinity sentinels.
    pub fn is_inf(self) -> bool {
        self.0 == UV_INF || self.0 == -UV_INF
    }

    /// The raw signed index.
    pub fn get(self) -> i16 {
        self.0
    }
}

impl From<i16> for Key {
    fn from(k: i16) -> Key {
        Key(k)
    }
}

impl From<Key> for i16 {
    fn from(k: Key) -> i16 {
        k.0
    }
}

impl From<Key> for i32 {
    fn from(k: Key) -> i32 {
        i32::from(k.0)
    }
}

impl std::ops::Neg for Key {
    type Output = Key;

    fn neg(self) -> Key {
        Key(-self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UV_INF => f.write_str("+Inf"),
            k if k == -UV_INF => f.write_str("-Inf"),
            k => write!(f, "{}", k),
        }
    }
}

/// A key paired with the number of times it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyCount {
    /// The bucket.
    pub k: Key,
    /// Occurrences of `k`.
    pub n: u64,
}

impl KeyCount {
    /// Create a new KeyCount
    pub fn new(k: Key, n: u64) -> KeyCount {
        KeyCount { k, n }
    }
}
