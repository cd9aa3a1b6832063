//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
///
/// Unlike `f64::clamp` this does not panic if `min > max`, the `min` bound
/// wins in that case.
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

/// Clamp a value into the normalised range `[-1, 1]`, returning the clamped
/// value and whether clamping occured.
pub fn clamp_norm<T>(value: T) -> (T, bool)
where
    T: Float,
{
    let one = T::one();
    let clamped = clamp(&value, &-one, &one);

    (clamped, clamped != value)
}

/// Apply a deadband to a normalised value.
///
/// Values with a magnitude at or below `deadband` are mapped to zero, the
/// remainder of the range is rescaled so that `±1` still maps to `±1`.
pub fn apply_deadband<T>(value: T, deadband: T) -> T
where
    T: Float,
{
    let zero = T::zero();

    if deadband <= zero {
        return value;
    }

    if value.abs() <= deadband {
        return zero;
    }

    (value - value.signum() * deadband) / (T::one() - deadband)
}

/// Return -1, 0 or +1 depending on the sign of the value.
///
/// `Float::signum` returns 1 for +0.0, which isn't wanted when computing
/// directions of travel.
pub fn sign<T>(value: T) -> T
where
    T: Float,
{
    if value > T::zero() {
        T::one()
    } else if value < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp_norm() {
        assert_eq!(clamp_norm(1.5f64), (1.0, true));
        assert_eq!(clamp_norm(-3.0f64), (-1.0, true));
        assert_eq!(clamp_norm(0.25f64), (0.25, false));
    }

    #[test]
    fn test_apply_deadband() {
        assert_eq!(apply_deadband(0.01f64, 0.02), 0.0);
        assert_eq!(apply_deadband(-0.02f64, 0.02), 0.0);
        assert_eq!(apply_deadband(1.0f64, 0.02), 1.0);
        assert_eq!(apply_deadband(-1.0f64, 0.02), -1.0);
        assert!((apply_deadband(0.51f64, 0.02) - 0.5).abs() < 1e-12);

        // Zero deadband is a pass through
        assert_eq!(apply_deadband(0.001f64, 0.0), 0.001);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0.0f64), 0.0);
        assert_eq!(sign(-0.0f64), 0.0);
        assert_eq!(sign(2.5f64), 1.0);
        assert_eq!(sign(-0.1f64), -1.0);
    }
}
