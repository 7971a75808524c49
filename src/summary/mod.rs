//! 'summary' keeps the exact running statistics of a sample stream: count,
//! sum, extrema and mean. A quantile sketch only knows its samples up to the
//! precision of its buckets, so it carries a `Summary` next to its bins to
//! report these values exactly.
//!
//! The mean is maintained incrementally rather than derived from `sum /
//! count`. Over very long streams the incremental form accumulates less
//! rounding error, and it lets two summaries be merged by weighting their
//! means without re-visiting any sample. Summaries built on different shards
//! or threads can therefore be merged in any order; results agree up to
//! floating-point rounding, which `check::check_equal` tolerates.
//!
//! # Examples
//!
//! ```
//! use sketch_summary::summary::Summary;
//!
//! let mut a: Summary = vec![1.0, 2.0, 3.0].into_iter().collect();
//! let b: Summary = vec![4.0, 5.0].into_iter().collect();
//! a.merge(&b);
//!
//! assert_eq!(a.count, 5);
//! assert_eq!(a.sum, 15.0);
//! assert_eq!(a.min, 1.0);
//! assert_eq!(a.max, 5.0);
//! assert_eq!(a.avg, 3.0);
//! ```

use std::fmt;
use std::ops::AddAssign;

pub mod check;

/// Running statistics of a sample stream
///
/// A zero-valued `Summary` is empty. `min` and `max` only carry meaning once
/// `count > 0`. Fields are public so encoders can read them directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    /// Smallest sample seen.
    pub min: f64,
    /// Largest sample seen.
    pub max: f64,
    /// Sum of all samples.
    pub sum: f64,
    /// Mean of all samples.
    pub avg: f64,
    /// Number of samples seen.
    pub count: u64,
}

impl Summary {
    /// Create a new, empty Summary
    pub fn new() -> Summary {
        Summary::default()
    }

    /// Whether no sample has been folded in yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Return to the empty state
    ///
    /// # Examples
    /// ```
    /// use sketch_summary::summary::Summary;
    ///
    /// let mut s = Summary::new();
    /// s.insert(12.0);
    /// s.reset();
    /// assert!(s.is_empty());
    /// assert_eq!(s, Summary::default());
    /// ```
    pub fn reset(&mut self) {
        *self = Summary::default();
    }

    /// Fold a single sample into the Summary
    ///
    /// # Examples
    /// ```
    /// use sketch_summary::summary::Summary;
    ///
    /// let mut s = Summary::new();
    /// s.insert(0.0);
    /// s.insert(100.0);
    ///
    /// assert_eq!(s.count, 2);
    /// assert_eq!(s.avg, 50.0);
    /// ```
    pub fn insert(&mut self, v: f64) {
        if v > self.max || self.count == 0 {
            self.max = v;
        }
        if v < self.min || self.count == 0 {
            self.min = v;
        }

        self.count = self.count.saturating_add(1);
        self.sum += v;
        self.avg += (v - self.avg) / self.count as f64;
    }

    /// Fold `n` copies of `v` into the Summary
    ///
    /// This does not loop. A summary of `n` copies of `v` is built directly
    /// and merged, so the mean is combined with the merge formula; it matches
    /// `n` calls to `insert` within rounding. Inserting zero copies does
    /// nothing.
    ///
    /// # Examples
    /// ```
    /// use sketch_summary::summary::Summary;
    ///
    /// let mut s = Summary::new();
    /// s.insert_n(7.0, 1000);
    ///
    /// assert_eq!(s.count, 1000);
    /// assert_eq!(s.sum, 7000.0);
    /// assert_eq!(s.min, 7.0);
    /// assert_eq!(s.max, 7.0);
    /// assert_eq!(s.avg, 7.0);
    /// ```
    pub fn insert_n(&mut self, v: f64, n: u64) {
        if n == 0 {
            return;
        }
        self.merge(&Summary {
            min: v,
            max: v,
            sum: n as f64 * v,
            avg: v,
            count: n,
        });
    }

    /// Fold another Summary into this one
    ///
    /// Merging into an empty Summary copies `other`; merging an empty `other`
    /// changes nothing. The empty Summary is thus the identity of `merge`.
    /// `count` saturates at `u64::MAX`.
    pub fn merge(&mut self, other: &Summary) {
        if self.count == 0 {
            *self = *other;
            return;
        }
        if other.count == 0 {
            return;
        }

        if other.max > self.max {
            self.max = other.max;
        }
        if other.min < self.min {
            self.min = other.min;
        }

        self.count = self.count.saturating_add(other.count);
        self.sum += other.sum;
        self.avg += (other.avg - self.avg) * other.count as f64 / self.count as f64;
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Summary) {
        self.merge(&rhs);
    }
}

impl Extend<f64> for Summary {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl FromIterator<f64> for Summary {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Summary {
        let mut s = Summary::new();
        s.extend(iter);
        s
    }
}

// Four decimals; non-finite values print as NaN, +Inf and -Inf.
fn fmt_field(f: &mut fmt::Formatter, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        write!(f, "{:.4}", v)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields = [
            ("min", self.min),
            ("max", self.max),
            ("avg", self.avg),
            ("sum", self.sum),
        ];
        for (name, v) in fields.iter() {
            write!(f, "{}=", name)?;
            fmt_field(f, *v)?;
            f.write_str(" ")?;
        }
        write!(f, "cnt={}", self.count)
    }
}
