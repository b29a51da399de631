//! Liquidity shapes and their conversion into per-bin deposit amounts.
//!
//! A deposit goes through two stages: a shape generator turns a bin range
//! into per-bin weights (or bps of each side's total), then a converter
//! prices those weights and scales them to the amounts being deposited.

use crate::error::LiquidityError;
use serde::{Deserialize, Serialize};

pub mod strategy;
pub mod weight;
pub mod weight_to_amounts;

/// Relative share of a deposit placed in one bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinWeight {
    pub bin_id: i32,
    pub weight: u32,
}

/// Share of each side's total deposit placed in one bin, in bps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinBpsDistribution {
    pub bin_id: i32,
    pub x_amount_bps_of_total: u16,
    pub y_amount_bps_of_total: u16,
}

/// Single-token amount for one bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinAmount {
    pub bin_id: i32,
    pub amount: u64,
}

/// Two-token amount for one bin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinXYAmount {
    pub bin_id: i32,
    pub amount_x: u64,
    pub amount_y: u64,
}

/// Fails with `DiscontinuousRange` unless the ids ascend one by one.
pub(crate) fn ensure_continuous(
    bin_ids: impl IntoIterator<Item = i32>,
) -> Result<(), LiquidityError> {
    let mut previous: Option<i32> = None;
    for bin_id in bin_ids {
        if let Some(previous) = previous {
            if previous.checked_add(1) != Some(bin_id) {
                return Err(LiquidityError::DiscontinuousRange);
            }
        }
        previous = Some(bin_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- continuity tests ----

    #[test]
    fn continuous_ranges_pass() {
        assert!(ensure_continuous([-2, -1, 0, 1]).is_ok());
        assert!(ensure_continuous([7]).is_ok());
        assert!(ensure_continuous(std::iter::empty()).is_ok());
    }

    #[test]
    fn gaps_and_disorder_are_rejected() {
        assert!(matches!(
            ensure_continuous([0, 1, 3]),
            Err(LiquidityError::DiscontinuousRange)
        ));
        assert!(matches!(
            ensure_continuous([1, 0]),
            Err(LiquidityError::DiscontinuousRange)
        ));
        assert!(matches!(
            ensure_continuous([4, 4]),
            Err(LiquidityError::DiscontinuousRange)
        ));
    }
}
