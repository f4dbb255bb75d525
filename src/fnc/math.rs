//! Aggregate helpers used by materialized views (`DEFINE TABLE ... AS SELECT
//! ... GROUP BY`). These are not exposed to query text as callable functions
//! (this crate's expression grammar has no function-call form) — they are
//! invoked directly by the document pipeline while it folds a group's rows
//! into the view's output record.

use crate::sql::number::Number;

pub fn count(array: &[Number]) -> Number {
    Number::Int(array.len() as i64)
}

pub fn sum(array: &[Number]) -> Number {
    array.iter().copied().fold(Number::Int(0), |a, b| a + b)
}

pub fn mean(array: &[Number]) -> Number {
    if array.is_empty() {
        return Number::Float(f64::NAN);
    }
    let total: f64 = array.iter().map(Number::as_float).sum();
    Number::Float(total / array.len() as f64)
}

pub fn max(array: &[Number]) -> Option<Number> {
    array.iter().copied().max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

pub fn min(array: &[Number]) -> Option<Number> {
    array.iter().copied().min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

/// Sample variance (Bessel's correction), backing the `stddev`/`variance`
/// aggregates over a GROUP BY projection.
pub fn variance(array: &[Number]) -> f64 {
    match array.len() {
        0 => f64::NAN,
        1 => 0.0,
        len => {
            let Number::Float(m) = mean(array) else {
                unreachable!("mean always returns Number::Float")
            };
            let n = (len - 1) as f64;
            array.iter().map(|x| (x.as_float() - m).powi(2)).sum::<f64>() / n
        }
    }
}

pub fn stddev(array: &[Number]) -> f64 {
    variance(array).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(vals: &[i64]) -> Vec<Number> {
        vals.iter().map(|&v| Number::Int(v)).collect()
    }

    #[test]
    fn aggregates() {
        let v = nums(&[1, 2, 3, 4]);
        assert_eq!(count(&v), Number::Int(4));
        assert_eq!(sum(&v), Number::Int(10));
        assert_eq!(mean(&v), Number::Float(2.5));
        assert_eq!(max(&v), Some(Number::Int(4)));
        assert_eq!(min(&v), Some(Number::Int(1)));
    }

    #[test]
    fn variance_and_stddev() {
        let v = nums(&[2, 4, 4, 4, 5, 5, 7, 9]);
        let var = variance(&v);
        assert!((var - 4.5714285714285712).abs() < 1e-9);
        assert!((stddev(&v) - var.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_and_singleton() {
        assert!(matches!(mean(&[]), Number::Float(f) if f.is_nan()));
        assert!(variance(&[]).is_nan());
        assert_eq!(variance(&nums(&[5])), 0.0);
        assert_eq!(max(&[]), None);
    }
}
