//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
///
/// Unlike `f64::clamp` this does not panic if `min > max`, instead `min`
/// takes precedence. NaN values pass through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Divide `num` by `den`, returning zero if the denominator is zero.
pub fn safe_div<T>(num: T, den: T) -> T
where
    T: Float,
{
    if den == T::zero() {
        T::zero()
    } else {
        num / den
    }
}

/// Arithmetic mean of a set of values, or zero if there are none.
pub fn mean<'a, T, I>(values: I) -> T
where
    T: Float + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sum = T::zero();
    let mut count = T::zero();

    for v in values {
        sum = sum + *v;
        count = count + T::one();
    }

    safe_div(sum, count)
}
