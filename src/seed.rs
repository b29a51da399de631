//! Bulk seeding: a curvature-shaped amount per bin, compressed to the
//! 32-bit width bulk deposits accept.
//!
//! Compression divides every bin by a multiplier. What the division drops
//! is handed back to the bins in proportion to their share, and whatever
//! still cannot be placed is reported as a residual that the caller
//! deposits uncompressed into the last bin, so the seeded total is exact.

use crate::error::{Error, LiquidityError, MathError};
use crate::math::bin_array_bitmap::{bin_id_to_bin_array_index, get_bin_array_indexes_coverage};
use crate::math::math_helpers::{Rounding, mul_div_u64};
use crate::math::price_math::{get_bin_id_from_price, get_price_of_bin_by_bin_id, price_per_lamport, price_per_token};
use crate::{MAX_BIN_PER_POSITION, SEED_BIN_CAP};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressedBinAmounts {
    /// Amount per bin divided by the multiplier.
    pub compressed: BTreeMap<i32, u64>,
    /// Uncompressed amount not represented in `compressed`.
    pub loss: u64,
}

/// Divides every amount by `multiplier`, accumulating the remainders.
pub fn compress_bin_amount(
    amounts: &BTreeMap<i32, u64>,
    multiplier: u64,
) -> Result<CompressedBinAmounts, MathError> {
    if multiplier == 0 {
        return Err(MathError::DivisionByZero);
    }

    let mut result = CompressedBinAmounts::default();
    for (&bin_id, &amount) in amounts {
        let compressed = amount / multiplier;
        result.compressed.insert(bin_id, compressed);
        result.loss = result
            .loss
            .checked_add(amount - compressed * multiplier)
            .ok_or(MathError::Overflow)?;
    }
    Ok(result)
}

/// Hands `uncompressed_amount` back to the compressed bins in proportion to
/// their compressed amounts, never lifting a bin above `bin_cap`.
///
/// The returned loss is the part of `uncompressed_amount` that no bin
/// absorbed.
pub fn distribute_amount_to_compressed_bins_by_ratio(
    compressed: &BTreeMap<i32, u64>,
    uncompressed_amount: u64,
    multiplier: u64,
    bin_cap: u64,
) -> Result<CompressedBinAmounts, MathError> {
    if multiplier == 0 {
        return Err(MathError::DivisionByZero);
    }

    let total_compressed: u128 = compressed.values().map(|&a| u128::from(a)).sum();
    if total_compressed == 0 {
        return Ok(CompressedBinAmounts {
            compressed: compressed.clone(),
            loss: uncompressed_amount,
        });
    }

    let mut result = CompressedBinAmounts::default();
    let mut deposited: u64 = 0;
    for (&bin_id, &amount) in compressed {
        let share = mul_div_u64(
            amount,
            uncompressed_amount.into(),
            total_compressed,
            Rounding::Down,
        )?;
        let mut deposit = share / multiplier;
        let mut new_amount = amount.checked_add(deposit).ok_or(MathError::Overflow)?;
        if new_amount > bin_cap {
            // a bin already above the cap keeps its amount
            new_amount = bin_cap.max(amount);
            deposit = new_amount - amount;
        }
        result.compressed.insert(bin_id, new_amount);
        deposited = deposited
            .checked_add(deposit.checked_mul(multiplier).ok_or(MathError::Overflow)?)
            .ok_or(MathError::Overflow)?;
    }

    result.loss = uncompressed_amount
        .checked_sub(deposited)
        .ok_or(MathError::Underflow)?;
    Ok(result)
}

/// Compresses `amounts` and redistributes the compression loss.
///
/// `sum(compressed) * multiplier + loss` always equals `sum(amounts)`.
pub fn compress_for_seeding(
    amounts: &BTreeMap<i32, u64>,
    multiplier: u64,
    bin_cap: u64,
) -> Result<CompressedBinAmounts, MathError> {
    let first_pass = compress_bin_amount(amounts, multiplier)?;
    distribute_amount_to_compressed_bins_by_ratio(&first_pass.compressed, first_pass.loss, multiplier, bin_cap)
}

/// Number of full-width positions needed to cover `[min_bin_id, max_bin_id]`.
#[inline]
pub fn get_position_count(min_bin_id: i32, max_bin_id: i32) -> u64 {
    let bin_delta = (i64::from(max_bin_id) - i64::from(min_bin_id)).max(0);
    (bin_delta / MAX_BIN_PER_POSITION) as u64 + 1
}

/// `floor(amount * ((p - p_min) / (p_max - p_min))^k)` with `p` the token
/// price of `bin_id`.
fn cumulative_amount(
    amount: Decimal,
    bin_id: i32,
    bin_step: u16,
    token_x_decimals: u8,
    token_y_decimals: u8,
    (min_price, max_price): (Decimal, Decimal),
    k: Decimal,
) -> Result<Decimal, MathError> {
    let price = price_per_token(
        get_price_of_bin_by_bin_id(bin_id, bin_step)?,
        token_x_decimals,
        token_y_decimals,
    )?;
    let ratio = (price - min_price)
        .checked_div(max_price - min_price)
        .ok_or(MathError::DivisionByZero)?;

    let scaled = if ratio <= Decimal::ZERO {
        Decimal::ZERO
    } else if ratio == Decimal::ONE || k == Decimal::ONE {
        ratio
    } else {
        ratio.checked_powd(k).ok_or(MathError::Overflow)?
    };
    Ok(amount.checked_mul(scaled).ok_or(MathError::Overflow)?.floor())
}

/// Splits `amount` over the bins in `[min_bin_id, max_bin_id)` following a
/// price curve of exponent `k`.
///
/// Each bin gets the difference of the cumulative curve at its two edges,
/// so the amounts add up to `amount`.
pub fn generate_amount_for_bin_range(
    amount: u64,
    bin_step: u16,
    token_x_decimals: u8,
    token_y_decimals: u8,
    min_bin_id: i32,
    max_bin_id: i32,
    k: Decimal,
) -> Result<BTreeMap<i32, u64>, Error> {
    let price_of = |bin_id: i32| -> Result<Decimal, MathError> {
        price_per_token(
            get_price_of_bin_by_bin_id(bin_id, bin_step)?,
            token_x_decimals,
            token_y_decimals,
        )
    };
    let bounds = (price_of(min_bin_id)?, price_of(max_bin_id)?);
    let amount = Decimal::from(amount);

    let mut amounts = BTreeMap::new();
    let mut previous = cumulative_amount(amount, min_bin_id, bin_step, token_x_decimals, token_y_decimals, bounds, k)?;
    for bin_id in min_bin_id..max_bin_id {
        let next = cumulative_amount(amount, bin_id + 1, bin_step, token_x_decimals, token_y_decimals, bounds, k)?;
        let bin_amount = next
            .checked_sub(previous)
            .and_then(|d| d.max(Decimal::ZERO).to_u64())
            .ok_or(MathError::Overflow)?;
        amounts.insert(bin_id, bin_amount);
        previous = next;
    }
    Ok(amounts)
}

/// Curvature seeding request, prices in UI units (token Y per token X).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedLiquidityParams {
    pub seed_amount: u64,
    /// Curve exponent is `1 / curvature`.
    pub curvature: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

/// A full-width position of the seeding plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPosition {
    pub lower_bin_id: i32,
    /// Capped at the last seeded bin.
    pub upper_bin_id: i32,
    pub lower_bin_array_index: i64,
    pub upper_bin_array_index: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedLiquidityPlan {
    pub min_bin_id: i32,
    /// Exclusive end of the seeded range.
    pub max_bin_id: i32,
    /// Decompression multiplier, `10^token_x_decimals`.
    pub multiplier: u64,
    pub compressed_bin_amounts: BTreeMap<i32, u64>,
    /// Deposited uncompressed into the last seeded bin.
    pub final_loss: u64,
    pub positions: Vec<SeedPosition>,
    /// Every bin array the positions touch, ascending.
    pub bin_array_indexes: Vec<i64>,
}

impl SeedLiquidityPlan {
    #[inline]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }
}

/// Plans a seeding of `params.seed_amount` token X between the two prices.
///
/// The range must start at or above the active bin and span at least two
/// bin ids after rounding inward.
pub fn plan_seed_liquidity(
    params: SeedLiquidityParams,
    active_id: i32,
    bin_step: u16,
    token_x_decimals: u8,
    token_y_decimals: u8,
) -> Result<SeedLiquidityPlan, Error> {
    let min_price = price_per_lamport(params.min_price, token_x_decimals, token_y_decimals)?;
    let max_price = price_per_lamport(params.max_price, token_x_decimals, token_y_decimals)?;
    let min_bin_id = get_bin_id_from_price(min_price, bin_step, false)?;
    let max_bin_id = get_bin_id_from_price(max_price, bin_step, true)?;

    if min_bin_id < active_id {
        return Err(LiquidityError::SeedPriceBelowActivePrice.into());
    }
    if min_bin_id >= max_bin_id {
        return Err(LiquidityError::PriceRangeTooSmall.into());
    }

    let k = Decimal::ONE
        .checked_div(params.curvature)
        .ok_or(MathError::DivisionByZero)?;
    let amounts = generate_amount_for_bin_range(
        params.seed_amount,
        bin_step,
        token_x_decimals,
        token_y_decimals,
        min_bin_id,
        max_bin_id,
        k,
    )?;

    let multiplier = 10u64
        .checked_pow(u32::from(token_x_decimals))
        .ok_or(MathError::Overflow)?;
    let compressed = compress_for_seeding(&amounts, multiplier, SEED_BIN_CAP)?;

    let last_bin_id = max_bin_id - 1;
    let positions: Vec<SeedPosition> = (0..get_position_count(min_bin_id, last_bin_id))
        .map(|i| {
            let lower = i64::from(min_bin_id) + MAX_BIN_PER_POSITION * i as i64;
            let upper = (lower + MAX_BIN_PER_POSITION - 1).min(i64::from(last_bin_id));
            // both bounds lie within [min_bin_id, last_bin_id]
            let (lower, upper) = (lower as i32, upper as i32);
            SeedPosition {
                lower_bin_id: lower,
                upper_bin_id: upper,
                lower_bin_array_index: bin_id_to_bin_array_index(lower),
                upper_bin_array_index: bin_id_to_bin_array_index(upper),
            }
        })
        .collect();

    // positions tile the range without gaps
    let bin_array_indexes = get_bin_array_indexes_coverage(min_bin_id, last_bin_id);

    debug!(
        min_bin_id,
        max_bin_id,
        positions = positions.len(),
        final_loss = compressed.loss,
        "seed liquidity plan"
    );

    Ok(SeedLiquidityPlan {
        min_bin_id,
        max_bin_id,
        multiplier,
        compressed_bin_amounts: compressed.compressed,
        final_loss: compressed.loss,
        positions,
        bin_array_indexes,
    })
}
