//! 'mapping' assigns samples to keys. Buckets grow geometrically: with a
//! relative accuracy ε and `γ = 1 + 2ε`, key `k` is centred on `γ^(k-bias)`
//! and covers the values `[γ^(k-bias-½), γ^(k-bias+½))`, give or take the
//! half-to-even rounding at the edges. The centre reconstructed from a key is
//! therefore within ε of any value that maps to it, relatively speaking.
//!
//! Values whose magnitude is below the configured minimum collapse into key 0
//! and values too large to be indexed below `MAX_KEY` collapse into the
//! infinity sentinels. This is the only place keys are minted from samples,
//! and so the only place the key range constraint is enforced.
//!
//! # Examples
//!
//! ```
//! use sketch_summary::key::Key;
//! use sketch_summary::mapping::{Config, KeyMapping};
//!
//! let mapping = KeyMapping::new(Config::default()).unwrap();
//!
//! assert_eq!(mapping.key(0.0), Key::ZERO);
//! assert_eq!(mapping.key(f64::INFINITY), Key::inf(1));
//! assert_eq!(mapping.key(-1.0), -mapping.key(1.0));
//!
//! let k = mapping.key(1_000.0);
//! let low = mapping.lower_bound(k);
//! assert!((low - 1_000.0).abs() / 1_000.0 < 2.0 * Config::default().relative_accuracy);
//! ```

use tracing::debug;

use crate::key::{Key, MAX_KEY};

/// Relative accuracy used by agent-compatible sketches.
pub const DEFAULT_RELATIVE_ACCURACY: f64 = 1.0 / 128.0;

/// Smallest magnitude resolved by agent-compatible sketches.
pub const DEFAULT_MIN_VALUE: f64 = 1.0e-9;

/// Construction errors
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// The relative accuracy must lie strictly between 0 and 1.
    #[error("relative accuracy must be in (0, 1), got {0}")]
    RelativeAccuracy(f64),
    /// The minimum value must be finite and strictly positive.
    #[error("min value must be finite and greater than 0, got {0}")]
    MinValue(f64),
    /// The smallest bucket boundary overshoots the requested minimum value.
    #[error("normalized min value {norm_min} exceeds min value {min_value}")]
    UnrepresentableMinValue {
        /// Lower bound of key 1.
        norm_min: f64,
        /// The configured minimum.
        min_value: f64,
    },
}

/// Parameters of a `KeyMapping`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct Config {
    /// Relative error tolerated between a sample and its bucket's bound.
    pub relative_accuracy: f64,
    /// Magnitudes below this value map to key 0.
    pub min_value: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            relative_accuracy: DEFAULT_RELATIVE_ACCURACY,
            min_value: DEFAULT_MIN_VALUE,
        }
    }
}

/// Logarithmic value to key mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMapping {
    gamma_v: f64,
    // natural log of gamma_v, kept around to compute log base gamma cheaply
    gamma_ln: f64,
    norm_min: f64,
    // Bias of the exponent, chosen so that key(min_value) >= 1.
    norm_bias: i32,
}

impl KeyMapping {
    /// Create a new KeyMapping
    ///
    /// Fails if `config.relative_accuracy` is outside `(0, 1)` or if
    /// `config.min_value` is not a finite positive number.
    pub fn new(config: Config) -> Result<KeyMapping, Error> {
        let eps = config.relative_accuracy;
        if !(eps > 0.0 && eps < 1.0) {
            return Err(Error::RelativeAccuracy(eps));
        }
        let min_value = config.min_value;
        if !(min_value > 0.0 && min_value.is_finite()) {
            return Err(Error::MinValue(min_value));
        }

        let eps = eps * 2.0;
        let gamma_v = 1.0 + eps;
        let gamma_ln = eps.ln_1p();

        let norm_emin = (min_value.ln() / gamma_ln).floor() as i32;
        let norm_bias = -norm_emin + 1;
        let norm_min = gamma_v.powf(f64::from(1 - norm_bias));
        if norm_min > min_value {
            return Err(Error::UnrepresentableMinValue {
                norm_min,
                min_value,
            });
        }

        debug!(gamma_v, norm_bias, norm_min, "built key mapping");
        Ok(KeyMapping {
            gamma_v,
            gamma_ln,
            norm_min,
            norm_bias,
        })
    }

    /// The geometric growth factor between consecutive buckets.
    pub fn gamma(&self) -> f64 {
        self.gamma_v
    }

    /// The smallest magnitude that does not map to key 0.
    pub fn norm_min(&self) -> f64 {
        self.norm_min
    }

    /// Return the key of the bucket `v` falls into
    ///
    /// NaN maps to key 0. Magnitudes too large to index map to the infinity
    /// sentinel of the matching sign, so the returned key is either a
    /// sentinel or strictly inside `(-MAX_KEY, MAX_KEY)`.
    pub fn key(&self, v: f64) -> Key {
        if v < 0.0 {
            return -self.key(-v);
        }
        if !(v >= self.norm_min) {
            return Key::ZERO;
        }

        let rounded = (v.ln() / self.gamma_ln).round_ties_even();
        let i = if rounded >= f64::from(MAX_KEY) {
            i64::from(MAX_KEY)
        } else {
            rounded as i64 + i64::from(self.norm_bias)
        };
        if i >= i64::from(MAX_KEY) {
            Key::inf(1)
        } else if i < 1 {
            Key::from(1)
        } else {
            Key::from(i as i16)
        }
    }

    /// Return the value representing `k`
    ///
    /// This is the geometric centre `γ^(k-bias)` of the bucket, not its lower
    /// edge: values on either side of it map to `k`. Key 0 gives 0 and the
    /// sentinels give the infinity of their sign.
    pub fn lower_bound(&self, k: Key) -> f64 {
        if k.is_inf() {
            return if k.get() > 0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
        }
        if k.get() < 0 {
            return -self.lower_bound(-k);
        }
        if k == Key::ZERO {
            return 0.0;
        }
        self.gamma_v.powf(f64::from(i32::from(k) - self.norm_bias))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    fn agent() -> KeyMapping {
        KeyMapping::new(Config::default()).unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        let bad_eps = [0.0, 1.0, -0.5, f64::NAN];
        for eps in &bad_eps {
            let cfg = Config {
                relative_accuracy: *eps,
                ..Config::default()
            };
            match KeyMapping::new(cfg) {
                Err(Error::RelativeAccuracy(_)) => {}
                other => panic!("eps {} accepted: {:?}", eps, other),
            }
        }

        let bad_min = [0.0, -1.0, f64::INFINITY, f64::NAN];
        for min_value in &bad_min {
            let cfg = Config {
                min_value: *min_value,
                ..Config::default()
            };
            match KeyMapping::new(cfg) {
                Err(Error::MinValue(_)) => {}
                other => panic!("min value {} accepted: {:?}", min_value, other),
            }
        }
    }

    #[test]
    fn agent_parameters() {
        let m = agent();
        assert_eq!(1.0 + 2.0 / 128.0, m.gamma());
        assert!(m.norm_min() <= DEFAULT_MIN_VALUE);
        assert_eq!(Key::from(1), m.key(DEFAULT_MIN_VALUE));
    }

    #[test]
    fn special_values() {
        let m = agent();
        assert_eq!(Key::ZERO, m.key(0.0));
        assert_eq!(Key::ZERO, m.key(-0.0));
        assert_eq!(Key::ZERO, m.key(f64::NAN));
        assert_eq!(Key::ZERO, m.key(DEFAULT_MIN_VALUE / 10.0));
        assert_eq!(Key::ZERO, m.key(-DEFAULT_MIN_VALUE / 10.0));
        assert_eq!(Key::inf(1), m.key(f64::INFINITY));
        assert_eq!(Key::inf(-1), m.key(f64::NEG_INFINITY));
        assert_eq!(Key::inf(1), m.key(f64::MAX));
        assert_eq!(Key::inf(-1), m.key(f64::MIN));
    }

    #[test]
    fn sentinel_bounds() {
        let m = agent();
        assert_eq!(f64::INFINITY, m.lower_bound(Key::inf(1)));
        assert_eq!(f64::NEG_INFINITY, m.lower_bound(Key::inf(-1)));
        assert_eq!(0.0, m.lower_bound(Key::ZERO));
    }

    #[test]
    fn ties_round_to_even() {
        let m = agent();
        let v: f64 = 1.862_813_525_730_689e-9;
        assert_eq!(-1296.5, v.ln() / m.gamma_ln);
        assert_eq!(Key::from(42), m.key(v));
    }

    #[test]
    fn bound_is_bucket_centre() {
        let m = agent();
        let k = m.key(1_000.0);
        assert_eq!(Key::from(1784), k);
        assert!(m.lower_bound(k) > 1_000.0);
        assert!(m.key(m.lower_bound(k)) == k);
    }

    // prop: forall v > 0. v lies within half a bucket of lower_bound(key(v))
    #[test]
    fn value_within_half_bucket() {
        fn inner(v: f64) -> TestResult {
            let m = agent();
            if !v.is_finite() || v < 1.0e-6 || v > 1.0e12 {
                return TestResult::discard();
            }
            let centre = m.lower_bound(m.key(v));
            let half = m.gamma().sqrt() * (1.0 + 1.0e-12);
            TestResult::from_bool(centre / half <= v && v <= centre * half)
        }
        QuickCheck::new().quickcheck(inner as fn(f64) -> TestResult);
    }

    // prop: forall v. key(v) is a sentinel or strictly inside (-MAX_KEY, MAX_KEY)
    #[test]
    fn keys_within_range() {
        fn inner(v: f64) -> bool {
            let k = agent().key(v);
            k.is_inf() || (k.get() > -MAX_KEY && k.get() < MAX_KEY)
        }
        QuickCheck::new().quickcheck(inner as fn(f64) -> bool);
    }

    // prop: forall v > 0. lower_bound(key(v)) is within the relative accuracy of v
    #[test]
    fn relative_accuracy() {
        fn inner(v: f64) -> TestResult {
            let m = agent();
            if !v.is_finite() || v.abs() < 1.0e-6 || v.abs() > 1.0e12 {
                return TestResult::discard();
            }
            let low = m.lower_bound(m.key(v));
            let err = ((low - v) / v).abs();
            TestResult::from_bool(err <= 2.0 * DEFAULT_RELATIVE_ACCURACY)
        }
        QuickCheck::new().quickcheck(inner as fn(f64) -> TestResult);
    }

    #[test]
    fn keys_are_monotone() {
        let m = agent();
        let mut prev = m.key(DEFAULT_MIN_VALUE);
        let mut v = DEFAULT_MIN_VALUE;
        while v < 1.0e12 {
            let k = m.key(v);
            assert!(k >= prev, "key({}) = {} < {}", v, k, prev);
            prev = k;
            v *= 1.1;
        }
    }
}
