use crate::error::{Error, LiquidityError};
use crate::liquidity::{BinWeight, BinXYAmount};
use crate::liquidity::weight_to_amounts::{
    ask_side_xy, auto_fill_x_by_weight, auto_fill_y_by_weight, bid_side_xy, to_amount_both_side,
};
use crate::math::price_math::find_swappable_min_max_bin_id;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_WEIGHT: i64 = 2000;
const DEFAULT_MIN_WEIGHT: i64 = 200;

/// Length of the opaque parameter blob the program expects.
pub const STRATEGY_PARAMETERS_LEN: usize = 64;

/// Deposit shape.
///
/// Balanced variants treat the range as one distribution and let the active
/// bin's reserve ratio decide the split. Imbalanced variants fill the bid
/// and ask sides independently, each from its own token budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyType {
    SpotBalanced,
    CurveBalanced,
    BidAskBalanced,
    SpotImBalanced,
    CurveImBalanced,
    BidAskImBalanced,
}

impl StrategyType {
    #[inline]
    pub fn is_balanced(self) -> bool {
        matches!(
            self,
            Self::SpotBalanced | Self::CurveBalanced | Self::BidAskBalanced
        )
    }
}

/// Caller-facing strategy description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParameters {
    pub min_bin_id: i32,
    pub max_bin_id: i32,
    pub strategy_type: StrategyType,
    /// Single-sided imbalanced deposits put the active bin on the X side.
    pub single_sided_x: bool,
}

/// Strategy parameters in the layout the program consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramStrategyParameters {
    pub min_bin_id: i32,
    pub max_bin_id: i32,
    pub strategy_type: StrategyType,
    /// Byte 0 flags `single_sided_x`, the rest is zero.
    pub parameters: [u8; STRATEGY_PARAMETERS_LEN],
}

impl StrategyParameters {
    pub fn to_program_parameters(&self) -> ProgramStrategyParameters {
        let mut parameters = [0u8; STRATEGY_PARAMETERS_LEN];
        parameters[0] = u8::from(self.single_sided_x);
        ProgramStrategyParameters {
            min_bin_id: self.min_bin_id,
            max_bin_id: self.max_bin_id,
            strategy_type: self.strategy_type,
            parameters,
        }
    }
}

fn weights_by(min_bin_id: i32, max_bin_id: i32, weight: impl Fn(i32) -> i64) -> Vec<BinWeight> {
    (min_bin_id..=max_bin_id)
        .map(|bin_id| BinWeight {
            bin_id,
            weight: weight(bin_id).clamp(0, i64::from(u32::MAX)) as u32,
        })
        .collect()
}

/// Weight 1 everywhere.
pub fn to_weight_spot_balanced(min_bin_id: i32, max_bin_id: i32) -> Vec<BinWeight> {
    weights_by(min_bin_id, max_bin_id, |_| 1)
}

/// Weight falling from the range length at `min_bin_id` to 1 at `max_bin_id`.
pub fn to_weight_descending_order(min_bin_id: i32, max_bin_id: i32) -> Vec<BinWeight> {
    weights_by(min_bin_id, max_bin_id, |bin_id| {
        i64::from(max_bin_id) - i64::from(bin_id) + 1
    })
}

/// Weight rising from 1 at `min_bin_id`.
pub fn to_weight_ascending_order(min_bin_id: i32, max_bin_id: i32) -> Vec<BinWeight> {
    weights_by(min_bin_id, max_bin_id, |bin_id| {
        i64::from(bin_id) - i64::from(min_bin_id) + 1
    })
}

/// Per-bin weight step on each side of the active bin, spreading the
/// min-to-max weight difference over the side's width.
fn weight_steps(min_bin_id: i32, max_bin_id: i32, active_id: i32) -> Result<(i64, i64), LiquidityError> {
    if active_id < min_bin_id || active_id > max_bin_id {
        return Err(LiquidityError::InvalidStrategyParameters);
    }
    let diff_weight = DEFAULT_MAX_WEIGHT - DEFAULT_MIN_WEIGHT;
    let left = i64::from(active_id) - i64::from(min_bin_id);
    let right = i64::from(max_bin_id) - i64::from(active_id);
    let diff_min_weight = if left > 0 { diff_weight / left } else { 0 };
    let diff_max_weight = if right > 0 { diff_weight / right } else { 0 };
    Ok((diff_min_weight, diff_max_weight))
}

/// Peak weight at the active bin, decreasing linearly toward both edges.
pub fn to_weight_curve(min_bin_id: i32, max_bin_id: i32, active_id: i32) -> Result<Vec<BinWeight>, LiquidityError> {
    let (diff_min_weight, diff_max_weight) = weight_steps(min_bin_id, max_bin_id, active_id)?;
    let active = i64::from(active_id);
    Ok(weights_by(min_bin_id, max_bin_id, |bin_id| {
        let bin_id = i64::from(bin_id);
        match bin_id.cmp(&active) {
            std::cmp::Ordering::Less => DEFAULT_MAX_WEIGHT - (active - bin_id) * diff_min_weight,
            std::cmp::Ordering::Greater => DEFAULT_MAX_WEIGHT - (bin_id - active) * diff_max_weight,
            std::cmp::Ordering::Equal => DEFAULT_MAX_WEIGHT,
        }
    }))
}

/// Lowest weight at the active bin, increasing linearly toward both edges.
pub fn to_weight_bid_ask(min_bin_id: i32, max_bin_id: i32, active_id: i32) -> Result<Vec<BinWeight>, LiquidityError> {
    let (diff_min_weight, diff_max_weight) = weight_steps(min_bin_id, max_bin_id, active_id)?;
    let active = i64::from(active_id);
    Ok(weights_by(min_bin_id, max_bin_id, |bin_id| {
        let bin_id = i64::from(bin_id);
        match bin_id.cmp(&active) {
            std::cmp::Ordering::Less => DEFAULT_MIN_WEIGHT + (active - bin_id) * diff_min_weight,
            std::cmp::Ordering::Greater => DEFAULT_MIN_WEIGHT + (bin_id - active) * diff_max_weight,
            std::cmp::Ordering::Equal => DEFAULT_MIN_WEIGHT,
        }
    }))
}

/// Weights of a balanced strategy over the whole range.
fn balanced_weights(
    strategy_type: StrategyType,
    min_bin_id: i32,
    max_bin_id: i32,
    active_id: i32,
) -> Result<Vec<BinWeight>, LiquidityError> {
    match strategy_type {
        StrategyType::SpotBalanced => Ok(to_weight_spot_balanced(min_bin_id, max_bin_id)),
        StrategyType::CurveBalanced => to_weight_curve(min_bin_id, max_bin_id, active_id),
        StrategyType::BidAskBalanced => to_weight_bid_ask(min_bin_id, max_bin_id, active_id),
        _ => Err(LiquidityError::InvalidStrategyParameters),
    }
}

/// Shape of one side of an imbalanced strategy. `bid` selects the side
/// below the active bin.
fn imbalanced_side(strategy_type: StrategyType, min_bin_id: i32, max_bin_id: i32, bid: bool) -> Vec<BinWeight> {
    let ascending = match strategy_type {
        StrategyType::CurveImBalanced => bid,
        StrategyType::BidAskImBalanced => !bid,
        _ => return to_weight_spot_balanced(min_bin_id, max_bin_id),
    };
    if ascending {
        to_weight_ascending_order(min_bin_id, max_bin_id)
    } else {
        to_weight_descending_order(min_bin_id, max_bin_id)
    }
}

/// Per-bin amounts for depositing `amount_x` and `amount_y` over
/// `[min_bin_id, max_bin_id]` with the given strategy.
///
/// Imbalanced strategies with the active bin in range fill each side from
/// its own budget. The active bin belongs to the Y side unless the deposit
/// is X only (`amount_y == 0`). The range must stay within the bin ids
/// the bin step can price.
#[allow(clippy::too_many_arguments)]
pub fn to_amounts_both_side_by_strategy(
    active_id: i32,
    bin_step: u16,
    min_bin_id: i32,
    max_bin_id: i32,
    amount_x: u64,
    amount_y: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    strategy_type: StrategyType,
) -> Result<Vec<BinXYAmount>, Error> {
    let (min_swappable, max_swappable) = find_swappable_min_max_bin_id(bin_step)?;
    if min_bin_id > max_bin_id || min_bin_id < min_swappable || max_bin_id > max_swappable {
        return Err(LiquidityError::InvalidStrategyParameters.into());
    }

    let both_side = |weights: Vec<BinWeight>| {
        to_amount_both_side(
            active_id,
            bin_step,
            amount_x,
            amount_y,
            amount_x_in_active_bin,
            amount_y_in_active_bin,
            &weights,
        )
    };

    if strategy_type.is_balanced() {
        return both_side(balanced_weights(strategy_type, min_bin_id, max_bin_id, active_id)?);
    }

    // out of range, the whole range is one side
    if active_id < min_bin_id {
        return both_side(imbalanced_side(strategy_type, min_bin_id, max_bin_id, false));
    }
    if active_id > max_bin_id {
        return both_side(imbalanced_side(strategy_type, min_bin_id, max_bin_id, true));
    }

    // the range is bounded by i32, so its width fits i64
    let width = usize::try_from(i64::from(max_bin_id) - i64::from(min_bin_id) + 1)
        .map_err(|_| LiquidityError::InvalidStrategyParameters)?;

    let is_single_side_x = amount_y == 0;
    let (bid_upper, ask_lower) = if is_single_side_x {
        (active_id.checked_sub(1), Some(active_id))
    } else {
        (Some(active_id), active_id.checked_add(1))
    };

    let mut amounts = Vec::with_capacity(width);
    if let Some(bid_upper) = bid_upper.filter(|&upper| min_bin_id <= upper) {
        let weights = imbalanced_side(strategy_type, min_bin_id, bid_upper, true);
        amounts.extend(bid_side_xy(active_id, amount_y, &weights)?);
    }
    if let Some(ask_lower) = ask_lower.filter(|&lower| lower <= max_bin_id) {
        let weights = imbalanced_side(strategy_type, ask_lower, max_bin_id, false);
        amounts.extend(ask_side_xy(active_id, bin_step, amount_x, &weights)?);
    }
    Ok(amounts)
}

/// Y amount matching `amount_x` for a balanced strategy.
#[allow(clippy::too_many_arguments)]
pub fn auto_fill_y_by_strategy(
    active_id: i32,
    bin_step: u16,
    amount_x: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    min_bin_id: i32,
    max_bin_id: i32,
    strategy_type: StrategyType,
) -> Result<u64, Error> {
    let weights = balanced_weights(strategy_type, min_bin_id, max_bin_id, active_id)?;
    auto_fill_y_by_weight(
        active_id,
        bin_step,
        amount_x,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        &weights,
    )
}

/// X amount matching `amount_y` for a balanced strategy.
#[allow(clippy::too_many_arguments)]
pub fn auto_fill_x_by_strategy(
    active_id: i32,
    bin_step: u16,
    amount_y: u64,
    amount_x_in_active_bin: u64,
    amount_y_in_active_bin: u64,
    min_bin_id: i32,
    max_bin_id: i32,
    strategy_type: StrategyType,
) -> Result<u64, Error> {
    let weights = balanced_weights(strategy_type, min_bin_id, max_bin_id, active_id)?;
    auto_fill_x_by_weight(
        active_id,
        bin_step,
        amount_y,
        amount_x_in_active_bin,
        amount_y_in_active_bin,
        &weights,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_of(distributions: &[BinWeight]) -> Vec<u32> {
        distributions.iter().map(|b| b.weight).collect()
    }

    // ---- weight shape tests ----

    #[test]
    fn linear_shapes() {
        assert_eq!(weights_of(&to_weight_spot_balanced(-1, 1)), vec![1, 1, 1]);
        assert_eq!(weights_of(&to_weight_ascending_order(5, 8)), vec![1, 2, 3, 4]);
        assert_eq!(weights_of(&to_weight_descending_order(5, 8)), vec![4, 3, 2, 1]);
    }

    #[test]
    fn curve_peaks_at_active_bin() {
        // left step 1800 / 2 = 900, right step 1800 / 3 = 600
        let weights = to_weight_curve(-2, 3, 0).unwrap();
        assert_eq!(weights_of(&weights), vec![200, 1_100, 2_000, 1_400, 800, 200]);
    }

    #[test]
    fn bid_ask_dips_at_active_bin() {
        let weights = to_weight_bid_ask(-2, 3, 0).unwrap();
        assert_eq!(weights_of(&weights), vec![2_000, 1_100, 200, 800, 1_400, 2_000]);
    }

    #[test]
    fn centred_shapes_need_active_bin_in_range() {
        assert!(matches!(
            to_weight_curve(0, 10, 11),
            Err(LiquidityError::InvalidStrategyParameters)
        ));
        assert!(matches!(
            to_weight_bid_ask(0, 10, -1),
            Err(LiquidityError::InvalidStrategyParameters)
        ));
    }

    #[test]
    fn program_parameters_flag_single_sided_x() {
        let params = StrategyParameters {
            min_bin_id: -10,
            max_bin_id: 10,
            strategy_type: StrategyType::CurveImBalanced,
            single_sided_x: true,
        };
        let program = params.to_program_parameters();
        assert_eq!(program.parameters[0], 1);
        assert!(program.parameters[1..].iter().all(|&b| b == 0));
        assert_eq!(program.strategy_type, StrategyType::CurveImBalanced);
    }

    #[test]
    fn strategy_parameters_deserialize_from_json() {
        let json = r#"{"minBinId":-5,"maxBinId":5,"strategyType":"bidAskBalanced","singleSidedX":false}"#;
        let params: StrategyParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.strategy_type, StrategyType::BidAskBalanced);
        assert_eq!(params.min_bin_id, -5);
    }

    // ---- by strategy tests ----

    #[test]
    fn spot_balanced_matches_weight_conversion() {
        let by_strategy =
            to_amounts_both_side_by_strategy(0, 10, -1, 1, 1_000, 1_000, 0, 0, StrategyType::SpotBalanced).unwrap();
        let direct = to_amount_both_side(0, 10, 1_000, 1_000, 0, 0, &to_weight_spot_balanced(-1, 1)).unwrap();
        assert_eq!(by_strategy, direct);
    }

    #[test]
    fn spot_imbalanced_fills_each_side_from_its_budget() {
        let amounts =
            to_amounts_both_side_by_strategy(0, 10, -2, 2, 1_000, 3_000, 0, 0, StrategyType::SpotImBalanced).unwrap();
        let ids: Vec<i32> = amounts.iter().map(|b| b.bin_id).collect();
        assert_eq!(ids, vec![-2, -1, 0, 1, 2]);
        // bins -2..=0 share Y evenly, the active bin included
        assert!(amounts[..3].iter().all(|b| b.amount_y == 1_000 && b.amount_x == 0));
        assert!(amounts[3..].iter().all(|b| b.amount_y == 0 && b.amount_x > 0));
        let total_x: u64 = amounts.iter().map(|b| b.amount_x).sum();
        assert!(total_x <= 1_000 && total_x >= 998);
    }

    #[test]
    fn single_sided_x_moves_active_bin_to_ask_side() {
        let amounts =
            to_amounts_both_side_by_strategy(0, 10, -2, 2, 1_000, 0, 0, 0, StrategyType::CurveImBalanced).unwrap();
        let active = amounts.iter().find(|b| b.bin_id == 0).unwrap();
        assert!(active.amount_x > 0);
        assert_eq!(active.amount_y, 0);
        assert!(amounts.iter().filter(|b| b.bin_id < 0).all(|b| b.amount_x == 0 && b.amount_y == 0));
    }

    #[test]
    fn imbalanced_out_of_range_uses_whole_range() {
        // active above the range: bid side, curve ascends toward the active bin
        let amounts =
            to_amounts_both_side_by_strategy(10, 10, 0, 3, 0, 1_000, 0, 0, StrategyType::CurveImBalanced).unwrap();
        let y: Vec<u64> = amounts.iter().map(|b| b.amount_y).collect();
        assert_eq!(y, vec![100, 200, 300, 400]);
    }

    #[test]
    fn ranges_beyond_priceable_bins_are_rejected() {
        for (min_bin_id, max_bin_id) in [(i32::MIN, 10), (-10, i32::MAX), (-43_691, 0)] {
            for strategy_type in [StrategyType::SpotBalanced, StrategyType::CurveImBalanced] {
                let res = to_amounts_both_side_by_strategy(
                    0,
                    10,
                    min_bin_id,
                    max_bin_id,
                    1_000,
                    1_000,
                    0,
                    0,
                    strategy_type,
                );
                assert!(matches!(
                    res,
                    Err(Error::LiquidityError(LiquidityError::InvalidStrategyParameters))
                ));
            }
        }

        // the outermost priceable bins are still accepted
        let amounts =
            to_amounts_both_side_by_strategy(0, 10, -43_690, -43_689, 0, 1_000, 0, 0, StrategyType::CurveImBalanced)
                .unwrap();
        assert_eq!(amounts.len(), 2);
    }

    #[test]
    fn autofill_rejects_imbalanced_strategies() {
        let res = auto_fill_y_by_strategy(0, 10, 1_000, 0, 0, -1, 1, StrategyType::SpotImBalanced);
        assert!(matches!(
            res,
            Err(Error::LiquidityError(LiquidityError::InvalidStrategyParameters))
        ));
    }

    #[test]
    fn autofill_by_strategy_matches_weights() {
        let y = auto_fill_y_by_strategy(0, 10, 1_000, 0, 0, -1, 1, StrategyType::SpotBalanced).unwrap();
        assert_eq!(y, 1_000);
        let x = auto_fill_x_by_strategy(0, 10, 1_000, 0, 0, -1, 1, StrategyType::SpotBalanced).unwrap();
        assert_eq!(x, 999);
    }
}
