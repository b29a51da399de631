use crate::BASIS_POINT_MAX;
use crate::error::{Error, LiquidityError, MathError};
use crate::liquidity::{BinBpsDistribution, BinWeight, ensure_continuous};
use crate::math::price_math::get_price_of_bin_by_bin_id;
use alloy_primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::f64::consts::PI;

const BPS_MAX: u16 = BASIS_POINT_MAX as u16;
/// Fixed-point scale applied to bin prices when valuing a distribution.
const PRICE_PRECISION: u64 = 1_000_000_000_000;
const MAX_WEIGHT: u64 = u16::MAX as u64;

/// Normal density over bin ids, centred on the active bin or on the range
/// edge closest to it.
struct Gaussian {
    mean: f64,
    variance: f64,
}

impl Gaussian {
    fn around(active_id: i32, min_bin_id: i32, max_bin_id: i32) -> Self {
        let mean = active_id.clamp(min_bin_id, max_bin_id);
        // the range spans four standard deviations
        let std_dev = f64::from(max_bin_id - min_bin_id) / 4.0;
        Self {
            mean: f64::from(mean),
            variance: (std_dev * std_dev).max(1.0),
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        let delta = x - self.mean;
        (-(delta * delta) / (2.0 * self.variance)).exp() / (2.0 * PI * self.variance).sqrt()
    }

    /// Density of every bin normalised to sum to 1. `invert` takes the
    /// reciprocal density, pushing weight away from the mean.
    fn allocations(&self, bin_ids: &[i32], invert: bool) -> Vec<f64> {
        let raw: Vec<f64> = bin_ids
            .iter()
            .map(|&bin_id| {
                let density = self.pdf(f64::from(bin_id));
                if invert { 1.0 / density } else { density }
            })
            .collect();
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|a| a / total).collect()
    }
}

#[inline]
fn to_bps(share: f64) -> u16 {
    // float -> int casts saturate, shares are within [0, 1]
    (share * f64::from(BPS_MAX)) as u16
}

/// Floors every allocation to bps and returns what is left of 10000.
fn compute_allocation_bps(allocations: &[f64]) -> (Vec<u16>, u16) {
    let bps: Vec<u16> = allocations.iter().copied().map(to_bps).collect();
    let total: u32 = bps.iter().map(|&b| u32::from(b)).sum();
    let loss = u32::from(BPS_MAX).saturating_sub(total) as u16;
    (bps, loss)
}

fn bin_range(bin_ids: &[i32]) -> Result<(i32, i32), LiquidityError> {
    ensure_continuous(bin_ids.iter().copied())?;
    match (bin_ids.first(), bin_ids.last()) {
        (Some(&min), Some(&max)) => Ok((min, max)),
        _ => Err(LiquidityError::NoLiquidityToAdd),
    }
}

fn one_sided(bin_ids: &[i32], bps: Vec<u16>, for_x: bool) -> Vec<BinBpsDistribution> {
    bin_ids
        .iter()
        .zip(bps)
        .map(|(&bin_id, bps)| BinBpsDistribution {
            bin_id,
            x_amount_bps_of_total: if for_x { bps } else { 0 },
            y_amount_bps_of_total: if for_x { 0 } else { bps },
        })
        .collect()
}

/// Splits 10000 bps evenly per side.
///
/// With the active bin in range, bins below it take Y, bins above take X,
/// and the active bin counts as half a bin on both sides, absorbing the
/// rounding remainder. Otherwise the whole range is single sided and the
/// remainder lands on the outermost bin.
pub fn calculate_spot_distribution(
    active_id: i32,
    bin_ids: &[i32],
) -> Result<Vec<BinBpsDistribution>, LiquidityError> {
    let (min_bin_id, max_bin_id) = bin_range(bin_ids)?;

    if active_id < min_bin_id || active_id > max_bin_id {
        let count = bin_ids.len() as u32;
        let share = (u32::from(BPS_MAX) / count) as u16;
        let remainder = (u32::from(BPS_MAX) % count) as u16;
        let for_x = active_id < min_bin_id;

        let mut distributions = one_sided(bin_ids, vec![share; bin_ids.len()], for_x);
        if for_x {
            if let Some(last) = distributions.last_mut() {
                last.x_amount_bps_of_total += remainder;
            }
        } else if let Some(first) = distributions.first_mut() {
            first.y_amount_bps_of_total += remainder;
        }
        return Ok(distributions);
    }

    let y_count = (active_id - min_bin_id) as u32;
    let x_count = (max_bin_id - active_id) as u32;
    // 10000 / (count + 0.5)
    let y_bin_bps = 2 * u32::from(BPS_MAX) / (2 * y_count + 1);
    let x_bin_bps = 2 * u32::from(BPS_MAX) / (2 * x_count + 1);
    let y_active_bps = (u32::from(BPS_MAX) - y_bin_bps * y_count) as u16;
    let x_active_bps = (u32::from(BPS_MAX) - x_bin_bps * x_count) as u16;

    Ok(bin_ids
        .iter()
        .map(|&bin_id| match bin_id.cmp(&active_id) {
            std::cmp::Ordering::Less => BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: 0,
                y_amount_bps_of_total: y_bin_bps as u16,
            },
            std::cmp::Ordering::Greater => BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: x_bin_bps as u16,
                y_amount_bps_of_total: 0,
            },
            std::cmp::Ordering::Equal => BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: x_active_bps,
                y_amount_bps_of_total: y_active_bps,
            },
        })
        .collect())
}

/// Per-side totals of a two-sided allocation, the active bin counting half
/// on each side.
fn side_totals(active_id: i32, bin_ids: &[i32], allocations: &[f64]) -> (f64, f64) {
    bin_ids
        .iter()
        .zip(allocations)
        .fold((0.0, 0.0), |(x, y), (&bin_id, &a)| match bin_id.cmp(&active_id) {
            std::cmp::Ordering::Greater => (x + a, y),
            std::cmp::Ordering::Less => (x, y + a),
            std::cmp::Ordering::Equal => (x + a / 2.0, y + a / 2.0),
        })
}

/// Bid-ask shape: the reciprocal of a normal density, so liquidity thickens
/// away from the active bin.
///
/// Rounding remainders go to the outermost bin of each side.
pub fn calculate_bid_ask_distribution(
    active_id: i32,
    bin_ids: &[i32],
) -> Result<Vec<BinBpsDistribution>, LiquidityError> {
    let (min_bin_id, max_bin_id) = bin_range(bin_ids)?;
    let allocations = Gaussian::around(active_id, min_bin_id, max_bin_id).allocations(bin_ids, true);

    if active_id < min_bin_id {
        let (bps, loss) = compute_allocation_bps(&allocations);
        let mut distributions = one_sided(bin_ids, bps, true);
        if let Some(last) = distributions.last_mut() {
            last.x_amount_bps_of_total += loss;
        }
        return Ok(distributions);
    }
    if active_id > max_bin_id {
        let (bps, loss) = compute_allocation_bps(&allocations);
        let mut distributions = one_sided(bin_ids, bps, false);
        if let Some(first) = distributions.first_mut() {
            first.y_amount_bps_of_total += loss;
        }
        return Ok(distributions);
    }

    let (total_x, total_y) = side_totals(active_id, bin_ids, &allocations);
    let mut distributions: Vec<BinBpsDistribution> = bin_ids
        .iter()
        .zip(&allocations)
        .map(|(&bin_id, &a)| {
            let (x_share, y_share) = match bin_id.cmp(&active_id) {
                std::cmp::Ordering::Greater => (a / total_x, 0.0),
                std::cmp::Ordering::Less => (0.0, a / total_y),
                std::cmp::Ordering::Equal => (a / 2.0 / total_x, a / 2.0 / total_y),
            };
            BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: to_bps(x_share),
                y_amount_bps_of_total: to_bps(y_share),
            }
        })
        .collect();

    let sum_x: u32 = distributions.iter().map(|d| u32::from(d.x_amount_bps_of_total)).sum();
    let sum_y: u32 = distributions.iter().map(|d| u32::from(d.y_amount_bps_of_total)).sum();
    if let Some(first) = distributions.first_mut() {
        first.y_amount_bps_of_total += u32::from(BPS_MAX).saturating_sub(sum_y) as u16;
    }
    if let Some(last) = distributions.last_mut() {
        last.x_amount_bps_of_total += u32::from(BPS_MAX).saturating_sub(sum_x) as u16;
    }
    Ok(distributions)
}

/// Curve shape: a normal density centred on the active bin.
///
/// One-sided ranges put the rounding remainder on the bin closest to the
/// active bin; two-sided ranges give the active bin whatever each side has
/// left after its own bins.
pub fn calculate_normal_distribution(
    active_id: i32,
    bin_ids: &[i32],
) -> Result<Vec<BinBpsDistribution>, LiquidityError> {
    let (min_bin_id, max_bin_id) = bin_range(bin_ids)?;
    let allocations = Gaussian::around(active_id, min_bin_id, max_bin_id).allocations(bin_ids, false);

    if active_id < min_bin_id {
        let (bps, loss) = compute_allocation_bps(&allocations);
        let mut distributions = one_sided(bin_ids, bps, true);
        if let Some(first) = distributions.first_mut() {
            first.x_amount_bps_of_total += loss;
        }
        return Ok(distributions);
    }
    if active_id > max_bin_id {
        let (bps, loss) = compute_allocation_bps(&allocations);
        let mut distributions = one_sided(bin_ids, bps, false);
        if let Some(last) = distributions.last_mut() {
            last.y_amount_bps_of_total += loss;
        }
        return Ok(distributions);
    }

    let (total_x, total_y) = side_totals(active_id, bin_ids, &allocations);
    let mut distributions: Vec<BinBpsDistribution> = bin_ids
        .iter()
        .zip(&allocations)
        .map(|(&bin_id, &a)| match bin_id.cmp(&active_id) {
            std::cmp::Ordering::Greater => BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: to_bps(a / total_x),
                y_amount_bps_of_total: 0,
            },
            std::cmp::Ordering::Less => BinBpsDistribution {
                bin_id,
                x_amount_bps_of_total: 0,
                y_amount_bps_of_total: to_bps(a / total_y),
            },
            std::cmp::Ordering::Equal => BinBpsDistribution {
                bin_id,
                ..Default::default()
            },
        })
        .collect();

    let sum_x: u32 = distributions.iter().map(|d| u32::from(d.x_amount_bps_of_total)).sum();
    let sum_y: u32 = distributions.iter().map(|d| u32::from(d.y_amount_bps_of_total)).sum();
    if let Some(active) = distributions.iter_mut().find(|d| d.bin_id == active_id) {
        active.x_amount_bps_of_total = u32::from(BPS_MAX).saturating_sub(sum_x) as u16;
        active.y_amount_bps_of_total = u32::from(BPS_MAX).saturating_sub(sum_y) as u16;
    }
    Ok(distributions)
}

/// Values every bin of a bps distribution in token Y and rescales the
/// values to weights in `1..=65535`.
///
/// Bins whose weight floors to zero are dropped; a distribution worth
/// nothing yields an empty list.
pub fn to_weight_distribution(
    amount_x: u64,
    amount_y: u64,
    distributions: &[BinBpsDistribution],
    bin_step: u16,
) -> Result<Vec<BinWeight>, Error> {
    let precision = Decimal::from(PRICE_PRECISION);
    let bps_max = U256::from(BASIS_POINT_MAX);

    let mut total_quote = U256::ZERO;
    let mut quotes = Vec::with_capacity(distributions.len());
    for bin in distributions {
        let price = get_price_of_bin_by_bin_id(bin.bin_id, bin_step)?
            .checked_mul(precision)
            .and_then(|p| p.floor().to_u128())
            .ok_or(MathError::Overflow)?;

        let quote_x = U256::from(amount_x) * U256::from(bin.x_amount_bps_of_total) * U256::from(price)
            / bps_max
            / U256::from(PRICE_PRECISION);
        let quote_y = U256::from(amount_y) * U256::from(bin.y_amount_bps_of_total) / bps_max;
        let quote = quote_x + quote_y;

        total_quote += quote;
        quotes.push((bin.bin_id, quote));
    }

    if total_quote.is_zero() {
        return Ok(Vec::new());
    }

    let mut weights = Vec::with_capacity(quotes.len());
    for (bin_id, quote) in quotes {
        let weight = quote * U256::from(MAX_WEIGHT) / total_quote;
        let weight = u32::try_from(weight).map_err(|_| MathError::Overflow)?;
        if weight > 0 {
            weights.push(BinWeight { bin_id, weight });
        }
    }
    Ok(weights)
}
