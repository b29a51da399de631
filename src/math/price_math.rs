use crate::error::{Error, MathError, StateError};
use crate::math::math_helpers::{Rounding, mul_div};
use crate::{BASIS_POINT_MAX, MAX_EXPONENTIAL, ONE, SCALE_OFFSET};
use rust_decimal::{Decimal, MathematicalOps};

/// Raises a Q64.64 `base` to a signed integer power using square-and-multiply.
///
/// The base is first inverted (`u128::MAX / base`) whenever it is >= 1.0 so
/// every intermediate squaring stays below `2^64` and can never overflow; the
/// final result is inverted back when needed. Exponents with
/// `|exp| >= MAX_EXPONENTIAL` are rejected, and a result that truncates to
/// zero is reported as `MathError::Underflow`.
pub fn pow(base: u128, exp: i32) -> Result<u128, MathError> {
    if exp == 0 {
        return Ok(ONE);
    }

    let mut invert = exp.is_negative();
    let exp = exp.unsigned_abs();
    if exp >= MAX_EXPONENTIAL {
        return Err(MathError::Overflow);
    }

    let mut squared_base = base;
    let mut result = ONE;

    if squared_base >= result {
        squared_base = u128::MAX
            .checked_div(squared_base)
            .ok_or(MathError::DivisionByZero)?;
        invert = !invert;
    }

    let mut remaining = exp;
    while remaining != 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(squared_base).ok_or(MathError::Overflow)? >> SCALE_OFFSET;
        }
        remaining >>= 1;
        if remaining != 0 {
            squared_base =
                squared_base.checked_mul(squared_base).ok_or(MathError::Overflow)? >> SCALE_OFFSET;
        }
    }

    if result == 0 {
        return Err(MathError::Underflow);
    }

    if invert {
        result = u128::MAX / result;
    }

    Ok(result)
}

/// `1 + bin_step / 10000` in Q64.64.
#[inline]
pub fn get_base(bin_step: u16) -> u128 {
    ONE + (u128::from(bin_step) << SCALE_OFFSET) / BASIS_POINT_MAX
}

/// Returns the Q64.64 price of `bin_id`: `(1 + bin_step / 10000) ^ bin_id`.
pub fn get_q_price_from_id(bin_id: i32, bin_step: u16) -> Result<u128, MathError> {
    pow(get_base(bin_step), bin_id)
}

/// Price lookup used by the inverse searches: ids too far below zero read
/// as price 0 and ids too far above as `u128::MAX`, which keeps the price
/// non-decreasing across the whole `i32` domain.
fn saturating_q_price(bin_id: i64, bin_step: u16) -> u128 {
    let fallback = if bin_id > 0 { u128::MAX } else { 0 };
    match i32::try_from(bin_id) {
        Ok(id) => get_q_price_from_id(id, bin_step).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn estimate_bin_id(price: f64, bin_step: u16) -> i64 {
    let step = f64::from(bin_step) / BASIS_POINT_MAX as f64;
    let estimate = price.ln() / step.ln_1p();
    let bound = f64::from(MAX_EXPONENTIAL - 1);
    if estimate.is_nan() {
        return 0;
    }
    estimate.clamp(-bound, bound) as i64
}

/// Returns the bin whose Q64.64 price brackets `q_price`.
///
/// With `round_down` the result is the largest id whose price is `<= q_price`,
/// otherwise the smallest id whose price is `>= q_price`. A logarithmic
/// estimate picks the starting id and exact comparisons against
/// [`get_q_price_from_id`] settle the last unit.
pub fn get_id_from_q_price(q_price: u128, bin_step: u16, round_down: bool) -> Result<i32, Error> {
    if bin_step == 0 {
        return Err(MathError::DivisionByZero.into());
    }
    if q_price == 0 {
        return Err(StateError::PriceOutOfBounds.into());
    }

    let min_id = -i64::from(MAX_EXPONENTIAL - 1);
    let max_id = i64::from(MAX_EXPONENTIAL - 1);

    let price = q_price as f64 / ONE as f64;
    let mut id = estimate_bin_id(price, bin_step);

    if round_down {
        while id > min_id && saturating_q_price(id, bin_step) > q_price {
            id -= 1;
        }
        while id < max_id && saturating_q_price(id + 1, bin_step) <= q_price {
            id += 1;
        }
    } else {
        while id < max_id && saturating_q_price(id, bin_step) < q_price {
            id += 1;
        }
        while id > min_id && saturating_q_price(id - 1, bin_step) >= q_price {
            id -= 1;
        }
    }

    i32::try_from(id).map_err(|_| StateError::BinIdOutOfBounds.into())
}

/// Returns the extreme bin ids whose Q64.64 price still lies strictly inside
/// `(1, u128::MAX)` for the given step.
///
/// The start is `±floor(ln(u64::MAX) / ln(1 + bin_step / 10000))`, then each
/// bound walks inward one bin at a time until the fixed-point price agrees.
pub fn find_swappable_min_max_bin_id(bin_step: u16) -> Result<(i32, i32), Error> {
    if bin_step == 0 {
        return Err(MathError::DivisionByZero.into());
    }

    let step = f64::from(bin_step) / BASIS_POINT_MAX as f64;
    let n = ((u64::MAX as f64).ln() / step.ln_1p()).floor() as i64;
    let n = n.min(i64::from(MAX_EXPONENTIAL - 1));

    let mut min_bin_id = -n;
    let mut max_bin_id = n;

    while min_bin_id < 0 && saturating_q_price(min_bin_id, bin_step) <= 1 {
        min_bin_id += 1;
    }

    while max_bin_id > 0 {
        let q_price = saturating_q_price(max_bin_id, bin_step);
        if q_price != 0 && q_price < u128::MAX {
            break;
        }
        max_bin_id -= 1;
    }

    let min_bin_id = i32::try_from(min_bin_id).map_err(|_| StateError::BinIdOutOfBounds)?;
    let max_bin_id = i32::try_from(max_bin_id).map_err(|_| StateError::BinIdOutOfBounds)?;
    Ok((min_bin_id, max_bin_id))
}

fn two_pow_64() -> Decimal {
    Decimal::from_i128_with_scale(1i128 << SCALE_OFFSET, 0)
}

/// Converts a Q64.64 price into a decimal price per lamport.
pub fn q64_to_decimal(q_price: u128) -> Decimal {
    let integer = (q_price >> SCALE_OFFSET) as u64;
    let fraction = q_price as u64;
    Decimal::from(integer) + Decimal::from(fraction) / two_pow_64()
}

/// Converts a decimal price per lamport into Q64.64, rounding the last
/// fractional unit in the requested direction.
pub fn decimal_to_q64(price: Decimal, rounding: Rounding) -> Result<u128, Error> {
    if price.is_sign_negative() || price.is_zero() {
        return Err(StateError::PriceOutOfBounds.into());
    }

    let mantissa = price.mantissa().unsigned_abs();
    let denominator = 10u128.pow(price.scale());
    let q_price = mul_div(mantissa, ONE, denominator, rounding)
        .map_err(|_| StateError::PriceOutOfBounds)?;

    if q_price == 0 {
        return Err(StateError::PriceOutOfBounds.into());
    }
    Ok(q_price)
}

/// Inverse of [`get_price_of_bin_by_bin_id`]: the bin id for a decimal price
/// per lamport, floored when `round_down` is set and ceiled otherwise.
pub fn get_bin_id_from_price(price: Decimal, bin_step: u16, round_down: bool) -> Result<i32, Error> {
    let rounding = if round_down { Rounding::Down } else { Rounding::Up };
    let q_price = decimal_to_q64(price, rounding)?;
    get_id_from_q_price(q_price, bin_step, round_down)
}

fn checked_powi_signed(base: Decimal, exp: i64) -> Result<Decimal, MathError> {
    let magnitude = base
        .checked_powi(exp.unsigned_abs() as i64)
        .ok_or(MathError::Overflow)?;
    if exp < 0 {
        Decimal::ONE
            .checked_div(magnitude)
            .ok_or(MathError::DivisionByZero)
    } else {
        Ok(magnitude)
    }
}

/// Decimal price per lamport of a bin, `(1 + bin_step / 10000) ^ bin_id`.
pub fn get_price_of_bin_by_bin_id(bin_id: i32, bin_step: u16) -> Result<Decimal, MathError> {
    let base = Decimal::ONE + Decimal::new(i64::from(bin_step), 4);
    checked_powi_signed(base, i64::from(bin_id))
}

/// UI price (token Y per token X) to price per lamport.
pub fn price_per_lamport(price: Decimal, x_decimals: u8, y_decimals: u8) -> Result<Decimal, MathError> {
    let exp = i64::from(y_decimals) - i64::from(x_decimals);
    let multiplier = checked_powi_signed(Decimal::TEN, exp)?;
    price.checked_mul(multiplier).ok_or(MathError::Overflow)
}

/// Price per lamport back to a UI price (token Y per token X).
pub fn price_per_token(price_per_lamport: Decimal, x_decimals: u8, y_decimals: u8) -> Result<Decimal, MathError> {
    let exp = i64::from(x_decimals) - i64::from(y_decimals);
    let multiplier = checked_powi_signed(Decimal::TEN, exp)?;
    price_per_lamport
        .checked_mul(multiplier)
        .ok_or(MathError::Overflow)
}
