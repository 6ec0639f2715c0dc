//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed shortest angular distance from `a` to `b` in radians.
///
/// Accounts for wrapping, so the result is always in [-pi, pi].
pub fn ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let d = rem_euclid(b - a + pi_t, tau_t) - pi_t;

    d
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2.0, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-2.0, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.5, &-1.0, &1.0), 0.5);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 10.0), (-1.0, 1.0), 5.0), 0.0);
        assert_eq!(lin_map((0.0, 10.0), (-1.0, 1.0), 10.0), 1.0);
    }

    #[test]
    fn test_ang_dist() {
        assert!((ang_dist(1f64, 2f64) - 1f64).abs() < 1e-9);
        assert!((ang_dist(2f64, 1f64) + 1f64).abs() < 1e-9);
        // Shortest path across the 0/2pi wrap
        assert!((ang_dist(0.1, PI * 2.0 - 0.1) + 0.2).abs() < 1e-9);
        assert!((ang_dist(PI * 2.0 - 0.1, 0.1) - 0.2).abs() < 1e-9);
    }
}
