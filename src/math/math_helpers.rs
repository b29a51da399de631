use crate::error::MathError;
use alloy_primitives::U256;

/// Rounding direction for every fixed-point division in the crate.
///
/// There is no implicit rounding: each call site states whether the
/// remainder is dropped or carried into the result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rounding {
    Up,
    Down,
}

/// Computes `x * y / denominator` with a 256‑bit intermediate product,
/// rounded in the requested direction.
///
/// Fails with `MathError::DivisionByZero` when `denominator` is zero and
/// with `MathError::Overflow` when the quotient does not fit in 128 bits.
#[inline]
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }

    let prod = U256::from(x) * U256::from(y);
    let (mut quotient, remainder) = prod.div_rem(U256::from(denominator));

    if rounding == Rounding::Up && !remainder.is_zero() {
        quotient += U256::ONE;
    }

    u128::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// `(x * y) >> offset`, rounded in the requested direction.
#[inline]
pub fn mul_shr(x: u128, y: u128, offset: u8, rounding: Rounding) -> Result<u128, MathError> {
    let denominator = 1u128.checked_shl(offset.into()).ok_or(MathError::Overflow)?;
    mul_div(x, y, denominator, rounding)
}

/// `(x << offset) / y`, rounded in the requested direction.
#[inline]
pub fn shl_div(x: u128, y: u128, offset: u8, rounding: Rounding) -> Result<u128, MathError> {
    let scale = 1u128.checked_shl(offset.into()).ok_or(MathError::Overflow)?;
    mul_div(x, scale, y, rounding)
}

/// Scales a token amount by `y / denominator`, narrowing the result back
/// to a token amount.
#[inline]
pub fn mul_div_u64(amount: u64, y: u128, denominator: u128, rounding: Rounding) -> Result<u64, MathError> {
    let res = mul_div(amount.into(), y, denominator, rounding)?;
    to_u64(res)
}

#[inline]
pub fn to_u64(x: u128) -> Result<u64, MathError> {
    u64::try_from(x).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------- mul_div tests -------------------------

    #[test]
    fn mul_div_simple_division() {
        let res = mul_div(10, 20, 5, Rounding::Down).unwrap();
        assert_eq!(res, 40);
    }

    #[test]
    fn mul_div_division_by_zero() {
        let res = mul_div(1, 1, 0, Rounding::Down);
        assert!(matches!(res, Err(MathError::DivisionByZero)));
    }

    #[test]
    fn mul_div_product_wider_than_128_bits() {
        // (2^127 * 4) / 8 = 2^126, the product itself needs 130 bits
        let res = mul_div(1u128 << 127, 4, 8, Rounding::Down).unwrap();
        assert_eq!(res, 1u128 << 126);
    }

    #[test]
    fn mul_div_result_overflow() {
        let res = mul_div(u128::MAX, 2, 1, Rounding::Down);
        assert!(matches!(res, Err(MathError::Overflow)));
    }

    #[test]
    fn mul_div_rounding_down_truncates() {
        // 7 * 3 / 2 = 10.5
        assert_eq!(mul_div(7, 3, 2, Rounding::Down).unwrap(), 10);
    }

    #[test]
    fn mul_div_rounding_up_carries_remainder() {
        assert_eq!(mul_div(7, 3, 2, Rounding::Up).unwrap(), 11);
    }

    #[test]
    fn mul_div_rounding_up_exact_division() {
        assert_eq!(mul_div(6, 4, 3, Rounding::Up).unwrap(), 8);
    }

    #[test]
    fn mul_div_rounding_up_at_max_overflows() {
        // u128::MAX * 3 / 3 fits, one more unit of rounding would not
        assert_eq!(mul_div(u128::MAX, 3, 3, Rounding::Up).unwrap(), u128::MAX);
        let res = mul_div(u128::MAX, 3, 2, Rounding::Up);
        assert!(matches!(res, Err(MathError::Overflow)));
    }

    // ------------------------- mul_shr / shl_div tests -------------------------

    #[test]
    fn mul_shr_by_one_in_q64_is_identity() {
        let one = 1u128 << 64;
        assert_eq!(mul_shr(12_345, one, 64, Rounding::Down).unwrap(), 12_345);
        assert_eq!(mul_shr(12_345, one, 64, Rounding::Up).unwrap(), 12_345);
    }

    #[test]
    fn mul_shr_rounds_fractional_part() {
        // 3 * 0.5 = 1.5
        let half = 1u128 << 63;
        assert_eq!(mul_shr(3, half, 64, Rounding::Down).unwrap(), 1);
        assert_eq!(mul_shr(3, half, 64, Rounding::Up).unwrap(), 2);
    }

    #[test]
    fn shl_div_divides_by_q64_price() {
        // 3 / 2.0
        let two = 2u128 << 64;
        assert_eq!(shl_div(3, two, 64, Rounding::Down).unwrap(), 1);
        assert_eq!(shl_div(3, two, 64, Rounding::Up).unwrap(), 2);
    }

    #[test]
    fn shl_div_by_zero_price() {
        let res = shl_div(3, 0, 64, Rounding::Down);
        assert!(matches!(res, Err(MathError::DivisionByZero)));
    }

    #[test]
    fn shift_offset_out_of_range() {
        assert!(matches!(mul_shr(1, 1, 128, Rounding::Down), Err(MathError::Overflow)));
        assert!(matches!(shl_div(1, 1, 200, Rounding::Down), Err(MathError::Overflow)));
    }

    // ------------------------- narrowing tests -------------------------

    #[test]
    fn mul_div_u64_rejects_wide_result() {
        let res = mul_div_u64(u64::MAX, 2, 1, Rounding::Down);
        assert!(matches!(res, Err(MathError::Overflow)));
        assert_eq!(mul_div_u64(u64::MAX, 2, 2, Rounding::Down).unwrap(), u64::MAX);
    }

    #[test]
    fn mul_div_u64_scales_by_ratio() {
        // 10_000 * 1.01 rounded both ways
        assert_eq!(mul_div_u64(10_001, 10_100, 10_000, Rounding::Down).unwrap(), 10_101);
        assert_eq!(mul_div_u64(10_001, 10_100, 10_000, Rounding::Up).unwrap(), 10_102);
    }
}
