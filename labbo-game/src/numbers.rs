//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

fn clamp_to_i32(value: f64) -> i32 {
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    cast::<f64, i32>(value.clamp(min, max)).unwrap_or(0)
}

/// Multiply an integer by a factor and floor the result, returning 0 for non-finite products.
#[must_use]
pub fn scale_floor(value: i32, factor: f64) -> i32 {
    let product = f64::from(value) * factor;
    if !product.is_finite() {
        return 0;
    }
    clamp_to_i32(product.floor())
}

/// Multiply an integer by a factor and ceil the result, returning 0 for non-finite products.
#[must_use]
pub fn scale_ceil(value: i32, factor: f64) -> i32 {
    let product = f64::from(value) * factor;
    if !product.is_finite() {
        return 0;
    }
    clamp_to_i32(product.ceil())
}

/// Subtract `amount` from `pool`, flooring at zero. Returns the new value.
#[must_use]
pub fn drain(pool: i32, amount: i32) -> i32 {
    pool.saturating_sub(amount.max(0)).max(0)
}

/// Add `amount` to `pool`, capping at `cap`. Returns the new value.
#[must_use]
pub fn restore(pool: i32, amount: i32, cap: i32) -> i32 {
    pool.saturating_add(amount.max(0)).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_matches_mitigation_table() {
        assert_eq!(scale_floor(10, 0.7), 7);
        assert_eq!(scale_floor(10, 0.65), 6);
        assert_eq!(scale_floor(25, 0.5), 12);
        assert_eq!(scale_floor(6, 0.9), 5);
        assert_eq!(scale_floor(9, 1.15), 10);
    }

    #[test]
    fn ceil_rounds_boosts_up() {
        assert_eq!(scale_ceil(5, 1.5), 8);
        assert_eq!(scale_ceil(13, 1.5), 20);
        assert_eq!(scale_ceil(9, 1.5), 14);
    }

    #[test]
    fn non_finite_factors_collapse_to_zero() {
        assert_eq!(scale_floor(10, f64::NAN), 0);
        assert_eq!(scale_ceil(10, f64::INFINITY), 0);
        assert_eq!(scale_floor(i32::MAX, 4.0), i32::MAX);
    }

    #[test]
    fn drain_and_restore_clamp() {
        assert_eq!(drain(5, 9), 0);
        assert_eq!(drain(5, -3), 5);
        assert_eq!(restore(45, 15, 50), 50);
        assert_eq!(restore(10, 5, 50), 15);
    }
}
