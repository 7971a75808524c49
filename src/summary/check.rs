//! Approximate equality of summaries. Two summaries built from the same
//! samples but merged in a different order rarely agree bit for bit. They
//! agree to within a few units of least precision, and that is what
//! `check_equal` verifies.

use crate::summary::Summary;

/// Most ULPs two summary fields may differ by and still compare equal.
pub const ULP_LIMIT: u64 = 128;

/// How two summaries disagree.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CheckError {
    /// Counts must match exactly.
    #[error("count: {actual} != {expected}")]
    Count {
        /// Count of the summary under test.
        actual: u64,
        /// Count of the reference summary.
        expected: u64,
    },
    /// A floating-point field is more than `limit` ULPs away.
    #[error("{field}: {actual} != {expected} (ulp distance {distance} > {limit})")]
    Field {
        /// Name of the offending field.
        field: &'static str,
        /// Value in the summary under test.
        actual: f64,
        /// Value in the reference summary.
        expected: f64,
        /// ULPs between the two values.
        distance: u64,
        /// Tolerance that was exceeded.
        limit: u64,
    },
}

/// Distance between `a` and `b` in units of least precision
///
/// Any infinite or NaN argument yields `u64::MAX`, even when both arguments
/// are the same infinity. Values of opposite sign are compared through zero,
/// by adding their magnitudes' bit patterns.
///
/// # Examples
/// ```
/// use sketch_summary::summary::check::ulp_distance;
///
/// assert_eq!(0, ulp_distance(1.0, 1.0));
/// assert_eq!(1, ulp_distance(1.0, 1.0 + f64::EPSILON));
/// assert_eq!(u64::MAX, ulp_distance(f64::NAN, 1.0));
/// assert_eq!(u64::MAX, ulp_distance(f64::INFINITY, f64::INFINITY));
/// ```
pub fn ulp_distance(a: f64, b: f64) -> u64 {
    if a.is_infinite() || b.is_infinite() {
        return u64::MAX;
    }
    if a.is_nan() || b.is_nan() {
        return u64::MAX;
    }
    if a == b {
        return 0;
    }

    if a.is_sign_negative() != b.is_sign_negative() {
        return a.abs().to_bits() + b.abs().to_bits();
    }

    let (ua, ub) = (a.to_bits(), b.to_bits());
    if ua > ub {
        ua - ub
    } else {
        ub - ua
    }
}

fn check_field(field: &'static str, actual: f64, expected: f64) -> Result<(), CheckError> {
    let distance = ulp_distance(actual, expected);
    if distance > ULP_LIMIT {
        return Err(CheckError::Field {
            field,
            actual,
            expected,
            distance,
            limit: ULP_LIMIT,
        });
    }
    Ok(())
}

/// Compare `actual` against `expected`
///
/// `count` must match exactly; `min`, `max`, `sum` and `avg` must each be
/// within `ULP_LIMIT` ULPs. The first field that disagrees is reported.
///
/// # Examples
/// ```
/// use sketch_summary::summary::check::{check_equal, CheckError};
/// use sketch_summary::summary::Summary;
///
/// let a: Summary = vec![1.0, 2.0, 3.0].into_iter().collect();
/// let mut b = a;
/// assert!(check_equal(&a, &b).is_ok());
///
/// b.count += 1;
/// match check_equal(&a, &b) {
///     Err(CheckError::Count { actual: 3, expected: 4 }) => {}
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub fn check_equal(actual: &Summary, expected: &Summary) -> Result<(), CheckError> {
    if actual.count != expected.count {
        return Err(CheckError::Count {
            actual: actual.count,
            expected: expected.count,
        });
    }

    check_field("min", actual.min, expected.min)?;
    check_field("max", actual.max, expected.max)?;
    check_field("sum", actual.sum, expected.sum)?;
    check_field("avg", actual.avg, expected.avg)?;
    Ok(())
}
