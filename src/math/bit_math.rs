use crate::error::MathError;
use alloy_primitives::Uint;

/// Returns the index of the most significant set bit of a fixed-width
/// bitmap word, or `MathError::ZeroValue` if the input is zero.
///
/// Used when scanning bitmaps toward lower array indices.
pub fn most_significant_bit<const BITS: usize, const LIMBS: usize>(
    x: Uint<BITS, LIMBS>,
) -> Result<usize, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(BITS - 1 - x.leading_zeros())
}

/// Returns the index of the least significant set bit of a fixed-width
/// bitmap word, or `MathError::ZeroValue` if the input is zero.
///
/// Used when scanning bitmaps toward higher array indices.
pub fn least_significant_bit<const BITS: usize, const LIMBS: usize>(
    x: Uint<BITS, LIMBS>,
) -> Result<usize, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::bin_array_bitmap::{U512, U1024};

    // ------------------------- most_significant_bit tests -------------------------

    #[test]
    fn msb_errors_on_zero() {
        let res = most_significant_bit(U1024::ZERO);
        assert!(matches!(res, Err(MathError::ZeroValue)));
    }

    #[test]
    fn msb_of_power_of_two() {
        let x = U1024::from(1u64) << 700usize;
        assert_eq!(most_significant_bit(x).unwrap(), 700);
    }

    #[test]
    fn msb_of_multiple_bits() {
        // binary: 1001_0100 (MSB = bit 7)
        let x = U512::from(0b1001_0100u64);
        assert_eq!(most_significant_bit(x).unwrap(), 7);
    }

    #[test]
    fn msb_of_max_word() {
        assert_eq!(most_significant_bit(U1024::MAX).unwrap(), 1023);
        assert_eq!(most_significant_bit(U512::MAX).unwrap(), 511);
    }

    // ------------------------- least_significant_bit tests -------------------------

    #[test]
    fn lsb_errors_on_zero() {
        let res = least_significant_bit(U512::ZERO);
        assert!(matches!(res, Err(MathError::ZeroValue)));
    }

    #[test]
    fn lsb_of_power_of_two() {
        let x = U512::from(1u64) << 300usize;
        assert_eq!(least_significant_bit(x).unwrap(), 300);
    }

    #[test]
    fn lsb_of_multiple_bits() {
        // binary: 1011001000 -> LSB is position 3 (0-based)
        let x = U1024::from(0b1011001000u64);
        assert_eq!(least_significant_bit(x).unwrap(), 3);
    }

    #[test]
    fn lsb_of_max_word() {
        assert_eq!(least_significant_bit(U1024::MAX).unwrap(), 0);
    }
}
