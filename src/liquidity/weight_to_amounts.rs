use crate::error::{Error, LiquidityError, MathError};
use crate::liquidity::{BinAmount, BinWeight, BinXYAmount, ensure_continuous};
use crate::math::math_helpers::{Rounding, mul_div_u64};
use crate::math::price_math::get_price_of_bin_by_bin_id;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

#[inline]
fn checked_div(a: Decimal, b: Decimal) -> Result<Decimal, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

#[inline]
fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[inline]
fn floor_amount(amount: Decimal) -> Result<u64, MathError> {
    amount.floor().to_u64().ok_or(MathError::Overflow)
}

/// Weight of an ask-side bin expressed in token X.
fn weight_per_price(bin: &BinWeight, bin_step: u16) -> Result<Decimal, MathError> {
    let price = get_price_of_bin_by_bin_id(bin.bin_id, bin_step)?;
    checked_div(Decimal::from(bin.weight), price)
}

/// Splits the active bin's weight between the tokens following its
/// current reserve ratio, or evenly in value when the bin is empty.
fn active_bin_weights(
    weight: u32,
    active_id: i32,
    bin_step: u16,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
) -> Result<(Decimal, Decimal), MathError> {
    let p0 = get_price_of_bin_by_bin_id(active_id, bin_step)?;
    let weight = Decimal::from(weight);

    if amount_x_in_active_bin == 0 && amount_y_in_active_bin == 0 {
        let wx0 = checked_div(weight, checked_mul(p0, Decimal::TWO)?)?;
        let wy0 = weight / Decimal::TWO;
        return Ok((wx0, wy0));
    }

    let x = Decimal::from(amount_x_in_active_bin);
    let y = Decimal::from(amount_y_in_active_bin);
    let mut wx0 = Decimal::ZERO;
    let mut wy0 = Decimal::ZERO;
    if amount_x_in_active_bin != 0 {
        wx0 = checked_div(weight, p0 + checked_div(y, x)?)?;
    }
    if amount_y_in_active_bin != 0 {
        wy0 = checked_div(weight, Decimal::ONE + checked_div(checked_mul(p0, x)?, y)?)?;
    }
    Ok((wx0, wy0))
}

/// Weight totals of a two-sided distribution: Y for bins below the active
/// bin, X (weight over price) for bins above, the active bin split by
/// [`active_bin_weights`].
struct SideWeights {
    active_x: Decimal,
    active_y: Decimal,
    total_x: Decimal,
    total_y: Decimal,
}

impl SideWeights {
    fn new(
        active_id: i32,
        bin_step: u16,
        amount_x_in_active_bin: u64,
        amount_y_in_active_bin: u64,
        distributions: &[BinWeight],
    ) -> Result<Self, MathError> {
        let (active_x, active_y) = match distributions.iter().find(|b| b.bin_id == active_id) {
            Some(active) => active_bin_weights(
                active.weight,
                active_id,
                bin_step,
                amount_x_in_active_bin,
                amount_y_in_active_bin,
            )?,
            None => (Decimal::ZERO, Decimal::ZERO),
        };

        let mut total_x = active_x;
        let mut total_y = active_y;
        for bin in distributions {
            if bin.bin_id < active_id {
                total_y += Decimal::from(bin.weight);
            } else if bin.bin_id > active_id {
                total_x = total_x
                    .checked_add(weight_per_price(bin, bin_step)?)
                    .ok_or(MathError::Overflow)?;
            }
        }

        Ok(Self {
            active_x,
            active_y,
            total_x,
            total_y,
        })
    }
}

/// Spreads `total_amount` of token Y over the bins at or below the active
/// bin, proportionally to weight. Bins above the active bin get nothing.
pub fn to_amount_bid_side(
    active_id: i32,
    total_amount: u64,
    distributions: &[BinWeight],
) -> Result<Vec<BinAmount>, Error> {
    let total_weight: u128 = distributions
        .iter()
        .filter(|b| b.bin_id <= active_id)
        .map(|b| u128::from(b.weight))
        .sum();
    if total_weight == 0 {
        return Err(LiquidityError::NoLiquidityToAdd.into());
    }

    distributions
        .iter()
        .map(|bin| -> Result<BinAmount, Error> {
            let amount = if bin.bin_id > active_id {
                0
            } else {
                mul_div_u64(total_amount, bin.weight.into(), total_weight, Rounding::Down)?
            };
            Ok(BinAmount {
                bin_id: bin.bin_id,
                amount,
            })
        })
        .collect()
}

/// Spreads `total_amount` of token X over the bins at or above the active
/// bin, proportionally to weight over bin price.
pub fn to_amount_ask_side(
    active_id: i32,
    bin_step: u16,
    total_amount: u64,
    distributions: &[BinWeight],
) -> Result<Vec<BinAmount>, Error> {
    let mut total_weight = Decimal::ZERO;
    for bin in distributions.iter().filter(|b| b.bin_id >= active_id) {
        total_weight = total_weight
            .checked_add(weight_per_price(bin, bin_step)?)
            .ok_or(MathError::Overflow)?;
    }
    if total_weight <= Decimal::ZERO {
        return Err(LiquidityError::NoLiquidityToAdd.into());
    }

    let total_amount = Decimal::from(total_amount);
    distributions
        .iter()
        .map(|bin| -> Result<BinAmount, Error> {
            let amount = if bin.bin_id < active_id {
                0
            } else {
                let share = checked_mul(total_amount, weight_per_price(bin, bin_step)?)?;
                floor_amount(checked_div(share, total_weight)?)?
            };
            Ok(BinAmount {
                bin_id: bin.bin_id,
                amount,
            })
        })
        .collect()
}

pub(crate) fn bid_side_xy(active_id: i32, amount_y: u64, distributions: &[BinWeight]) -> Result<Vec<BinXYAmount>, Error> {
    Ok(to_amount_bid_side(active_id, amount_y, distributions)?
        .into_iter()
        .map(|bin| BinXYAmount {
            bin_id: bin.bin_id,
            amount_x: 0,
            amount_y: bin.amount,
        })
        .collect())
}

pub(crate) fn ask_side_xy(
    active_id: i32,
    bin_step: u16,
    amount_x: u64,
    distributions: &[BinWeight],
) -> Result<Vec<BinXYAmount>, Error> {
    Ok(to_amount_ask_side(active_id, bin_step, amount_x, distributions)?
        .into_iter()
        .map(|bin| BinXYAmount {
            bin_id: bin.bin_id,
            amount_x: bin.amount,
            amount_y: 0,
        })
        .collect())
}

/// Converts a sorted, gap-free weight distribution into per-bin X and Y
/// amounts.
///
/// A range entirely below (above) the active bin takes only Y (X). A range
/// straddling it is scaled by the smaller of `amount_x / total_x` and
/// `amount_y / total_y`, so neither side's budget is exceeded.
pub fn to_amount_both_side(
    active_id: i32,
    bin_step: u16,
    amount_x: u64,
    amount_y: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    distributions: &[BinWeight],
) -> Result<Vec<BinXYAmount>, Error> {
    ensure_continuous(distributions.iter().map(|b| b.bin_id))?;
    let (Some(first), Some(last)) = (distributions.first(), distributions.last()) else {
        return Err(LiquidityError::NoLiquidityToAdd.into());
    };

    if active_id > last.bin_id {
        return bid_side_xy(active_id, amount_y, distributions);
    }
    if active_id < first.bin_id {
        return ask_side_xy(active_id, bin_step, amount_x, distributions);
    }

    let weights = SideWeights::new(
        active_id,
        bin_step,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        distributions,
    )?;

    let kx = (!weights.total_x.is_zero())
        .then(|| checked_div(Decimal::from(amount_x), weights.total_x))
        .transpose()?;
    let ky = (!weights.total_y.is_zero())
        .then(|| checked_div(Decimal::from(amount_y), weights.total_y))
        .transpose()?;
    let k = match (kx, ky) {
        (Some(kx), Some(ky)) => kx.min(ky),
        (Some(k), None) | (None, Some(k)) => k,
        (None, None) => return Err(LiquidityError::NoLiquidityToAdd.into()),
    };

    distributions
        .iter()
        .map(|bin| -> Result<BinXYAmount, Error> {
            let (amount_x, amount_y) = match bin.bin_id.cmp(&active_id) {
                std::cmp::Ordering::Less => (0, floor_amount(checked_mul(k, Decimal::from(bin.weight))?)?),
                std::cmp::Ordering::Greater => {
                    (floor_amount(checked_mul(k, weight_per_price(bin, bin_step)?)?)?, 0)
                }
                std::cmp::Ordering::Equal => (
                    floor_amount(checked_mul(k, weights.active_x)?)?,
                    floor_amount(checked_mul(k, weights.active_y)?)?,
                ),
            };
            Ok(BinXYAmount {
                bin_id: bin.bin_id,
                amount_x,
                amount_y,
            })
        })
        .collect()
}

/// Deposits a single token: Y into the bid side when `deposit_for_y`,
/// otherwise X into the ask side.
pub fn from_weight_distribution_to_amount_one_side(
    amount: u64,
    distributions: &[BinWeight],
    bin_step: u16,
    active_id: i32,
    deposit_for_y: bool,
) -> Result<Vec<BinAmount>, Error> {
    if deposit_for_y {
        to_amount_bid_side(active_id, amount, distributions)
    } else {
        to_amount_ask_side(active_id, bin_step, amount, distributions)
    }
}

/// Sorts `distributions` by bin id and converts them into per-bin amounts.
///
/// Fails with `NoLiquidityToAdd` for an empty distribution and with
/// `DiscontinuousRange` when the sorted ids have gaps.
pub fn from_weight_distribution_to_amount(
    amount_x: u64,
    amount_y: u64,
    distributions: &[BinWeight],
    bin_step: u16,
    active_id: i32,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
) -> Result<Vec<BinXYAmount>, Error> {
    if distributions.is_empty() {
        return Err(LiquidityError::NoLiquidityToAdd.into());
    }
    let mut sorted = distributions.to_vec();
    sorted.sort_unstable_by_key(|b| b.bin_id);

    to_amount_both_side(
        active_id,
        bin_step,
        amount_x,
        amount_y,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        &sorted,
    )
}

/// Amount of Y matching `amount_x` under the given distribution.
pub fn auto_fill_y_by_weight(
    active_id: i32,
    bin_step: u16,
    amount_x: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    distributions: &[BinWeight],
) -> Result<u64, Error> {
    let weights = SideWeights::new(
        active_id,
        bin_step,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        distributions,
    )?;
    let kx = if weights.total_x.is_zero() {
        Decimal::ONE
    } else {
        checked_div(Decimal::from(amount_x), weights.total_x)?
    };
    Ok(floor_amount(checked_mul(kx, weights.total_y)?)?)
}

/// Amount of X matching `amount_y` under the given distribution.
pub fn auto_fill_x_by_weight(
    active_id: i32,
    bin_step: u16,
    amount_y: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    distributions: &[BinWeight],
) -> Result<u64, Error> {
    let weights = SideWeights::new(
        active_id,
        bin_step,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        distributions,
    )?;
    let ky = if weights.total_y.is_zero() {
        Decimal::ONE
    } else {
        checked_div(Decimal::from(amount_y), weights.total_y)?
    };
    Ok(floor_amount(checked_mul(ky, weights.total_x)?)?)
}
