use crate::SCALE_OFFSET;
use crate::error::MathError;
use crate::math::fee_math::{
    StaticParameters, VariableParameters, compute_fee, compute_fee_from_amount,
    compute_protocol_fee,
};
use crate::math::math_helpers::{Rounding, mul_shr, shl_div, to_u64};
use crate::pool::bin_array::Bin;

/// Outcome of swapping against a single bin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BinSwapResult {
    /// Input credited to the bin, fee excluded.
    pub amount_in: u64,
    pub amount_out: u64,
    /// Fee charged on top of `amount_in`.
    pub fee: u64,
    /// Part of `fee` retained by the protocol.
    pub protocol_fee: u64,
}

impl BinSwapResult {
    #[inline]
    pub fn amount_in_with_fees(&self) -> u64 {
        self.amount_in.saturating_add(self.fee)
    }
}

/// Output for `amount_in` at a Q64.64 `price`, rounded down.
///
/// X -> Y multiplies by the price, Y -> X divides by it.
#[inline]
pub fn get_out_amount(amount_in: u64, price: u128, swap_for_y: bool) -> Result<u128, MathError> {
    if swap_for_y {
        mul_shr(amount_in.into(), price, SCALE_OFFSET, Rounding::Down)
    } else {
        shl_div(amount_in.into(), price, SCALE_OFFSET, Rounding::Down)
    }
}

/// Input needed to receive `amount_out` at a Q64.64 `price`, rounded up.
#[inline]
pub fn get_amount_in(amount_out: u64, price: u128, swap_for_y: bool) -> Result<u128, MathError> {
    if swap_for_y {
        shl_div(amount_out.into(), price, SCALE_OFFSET, Rounding::Up)
    } else {
        mul_shr(amount_out.into(), price, SCALE_OFFSET, Rounding::Up)
    }
}

/// Swaps at most `in_amount` (fee included) into one bin.
///
/// When the input exceeds what the bin can absorb, the bin is drained and
/// only the capped input plus its fee is consumed. Otherwise the whole input
/// is consumed, the fee is taken out of it, and the output is capped at the
/// bin's reserve. A bin without reserve on the output side is a no-op.
pub fn swap_exact_in_quote_at_bin(
    bin: &Bin,
    price: u128,
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
    in_amount: u64,
    swap_for_y: bool,
) -> Result<BinSwapResult, MathError> {
    let max_amount_out = bin.max_amount_out(swap_for_y);
    if max_amount_out == 0 {
        return Ok(BinSwapResult::default());
    }

    let max_amount_in = get_amount_in(max_amount_out, price, swap_for_y)?;

    // a cap wider than u64 can never be exceeded by a u64 input
    if let Ok(max_amount_in) = to_u64(max_amount_in) {
        let max_fee = compute_fee(bin_step, s, v, max_amount_in)?;
        let max_amount_in_with_fees = u128::from(max_amount_in) + u128::from(max_fee);

        if u128::from(in_amount) > max_amount_in_with_fees {
            return Ok(BinSwapResult {
                amount_in: max_amount_in,
                amount_out: max_amount_out,
                fee: max_fee,
                protocol_fee: compute_protocol_fee(max_fee, s)?,
            });
        }
    }

    let fee = compute_fee_from_amount(bin_step, s, v, in_amount)?;
    let amount_in_after_fee = in_amount - fee;
    let amount_out = get_out_amount(amount_in_after_fee, price, swap_for_y)?
        .min(u128::from(max_amount_out)) as u64;

    Ok(BinSwapResult {
        amount_in: amount_in_after_fee,
        amount_out,
        fee,
        protocol_fee: compute_protocol_fee(fee, s)?,
    })
}

/// Takes up to `out_amount` out of one bin, pricing the needed input and
/// the fee charged on top of it.
pub fn swap_exact_out_quote_at_bin(
    bin: &Bin,
    price: u128,
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
    out_amount: u64,
    swap_for_y: bool,
) -> Result<BinSwapResult, MathError> {
    let max_amount_out = bin.max_amount_out(swap_for_y);
    if max_amount_out == 0 {
        return Ok(BinSwapResult::default());
    }

    let amount_out = out_amount.min(max_amount_out);
    let amount_in = to_u64(get_amount_in(amount_out, price, swap_for_y)?)?;
    let fee = compute_fee(bin_step, s, v, amount_in)?;

    Ok(BinSwapResult {
        amount_in,
        amount_out,
        fee,
        protocol_fee: compute_protocol_fee(fee, s)?,
    })
}
