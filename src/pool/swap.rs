use crate::error::{Error, MathError, StateError, SwapError};
use crate::math::bin_array_bitmap::get_bin_array_lower_upper_bin_id;
use crate::math::fee_math::VariableParameters;
use crate::math::math_helpers::{Rounding, mul_div_u64};
use crate::math::price_math::{get_q_price_from_id, q64_to_decimal};
use crate::math::swap_math::{BinSwapResult, swap_exact_in_quote_at_bin, swap_exact_out_quote_at_bin};
use crate::pool::bin_array::{BinArray, BinArrayProvider};
use crate::pool::lb_pair::LbPair;
use crate::{BASIS_POINT_MAX, FastSet};
use rust_decimal::Decimal;
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapQuoteParams {
    /// Input amount for [`LbPair::swap_quote`], output amount for
    /// [`LbPair::swap_quote_exact_out`].
    pub amount: u64,
    /// Swap direction: `true` for X → Y, `false` for Y → X.
    pub swap_for_y: bool,
    /// Tolerated slippage in bps, applied to the min output / max input.
    pub allowed_slippage_bps: u16,
    /// Exact-in only: stop at the last reachable bin instead of failing
    /// when liquidity runs out.
    pub is_partial_fill: bool,
    /// Unix timestamp the volatility reference is advanced to.
    pub current_timestamp: i64,
}

impl SwapQuoteParams {
    #[inline]
    pub fn new(amount: u64, swap_for_y: bool) -> Self {
        Self {
            amount,
            swap_for_y,
            allowed_slippage_bps: 0,
            is_partial_fill: false,
            current_timestamp: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_slippage_bps(mut self, allowed_slippage_bps: u16) -> Self {
        self.allowed_slippage_bps = allowed_slippage_bps;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_partial_fill(mut self, is_partial_fill: bool) -> Self {
        self.is_partial_fill = is_partial_fill;
        self
    }

    #[inline]
    #[must_use]
    pub fn at_timestamp(mut self, current_timestamp: i64) -> Self {
        self.current_timestamp = current_timestamp;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapQuote {
    /// Input actually used, fee included. Lower than the requested amount
    /// only for partial fills.
    pub consumed_in_amount: u64,
    pub out_amount: u64,
    pub fee: u64,
    pub protocol_fee: u64,
    /// `out_amount` reduced by the allowed slippage.
    pub min_out_amount: u64,
    /// Percentage move from the active bin the quote started at to the
    /// last filled bin.
    pub price_impact: Decimal,
    /// Indices of every bin array the swap walked through, in order.
    pub bin_arrays: Vec<i64>,
    /// Q64.64 price of the last filled bin.
    pub end_price: u128,
    /// Volatility state after the swap.
    pub v_parameters: VariableParameters,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapQuoteExactOut {
    /// Input the trader pays, fee included.
    pub in_amount: u64,
    /// `in_amount` raised by the allowed slippage.
    pub max_in_amount: u64,
    pub out_amount: u64,
    pub fee: u64,
    pub protocol_fee: u64,
    pub price_impact: Decimal,
    pub bin_arrays: Vec<i64>,
    pub v_parameters: VariableParameters,
}

// the running state of a quote; the pair snapshot itself is never written
struct SwapState {
    // the amount remaining to be filled, input for exact in, output for exact out
    amount_remaining: u64,
    // the bin currently swapped against
    active_id: i32,
    // quote-local copy of the volatility state
    v_parameters: VariableParameters,
    // accumulated input including fees
    amount_in: u64,
    // accumulated output
    amount_out: u64,
    fee: u64,
    protocol_fee: u64,
    // active bin when the quote started, and the last bin that was filled
    start_bin_id: i32,
    last_filled_bin_id: Option<i32>,
    // bin arrays visited, in order, without duplicates
    bin_arrays: Vec<i64>,
    seen_bin_arrays: FastSet<i64>,
}

impl SwapState {
    fn new(pair: &LbPair, amount: u64, current_timestamp: i64) -> Result<Self, MathError> {
        Ok(Self {
            amount_remaining: amount,
            active_id: pair.active_id,
            v_parameters: pair.v_parameters.update_references(
                pair.active_id,
                current_timestamp,
                &pair.parameters,
            )?,
            amount_in: 0,
            amount_out: 0,
            fee: 0,
            protocol_fee: 0,
            start_bin_id: pair.active_id,
            last_filled_bin_id: None,
            bin_arrays: Vec::new(),
            seen_bin_arrays: FastSet::default(),
        })
    }

    fn touch(&mut self, bin_array: &BinArray) {
        if self.seen_bin_arrays.insert(bin_array.index) {
            self.bin_arrays.push(bin_array.index);
        }
    }

    // skips empty bins between the active id and the array that was found
    fn enter(&mut self, bin_array: &BinArray, swap_for_y: bool) -> Result<(), StateError> {
        if bin_array.is_bin_id_within_range(self.active_id) {
            return Ok(());
        }
        let (lower, upper) = get_bin_array_lower_upper_bin_id(bin_array.index);
        let entry = if swap_for_y { upper } else { lower };
        self.active_id = i32::try_from(entry).map_err(|_| StateError::BinIdOutOfBounds)?;
        Ok(())
    }

    fn step(&mut self, swap_for_y: bool) -> Result<(), StateError> {
        self.active_id = if swap_for_y {
            self.active_id.checked_sub(1)
        } else {
            self.active_id.checked_add(1)
        }
        .ok_or(StateError::BinIdOutOfBounds)?;
        Ok(())
    }

    fn record(&mut self, step: &BinSwapResult) -> Result<(), MathError> {
        self.amount_in = self
            .amount_in
            .checked_add(step.amount_in_with_fees())
            .ok_or(MathError::Overflow)?;
        self.amount_out = self
            .amount_out
            .checked_add(step.amount_out)
            .ok_or(MathError::Overflow)?;
        self.fee = self.fee.checked_add(step.fee).ok_or(MathError::Overflow)?;
        self.protocol_fee = self
            .protocol_fee
            .checked_add(step.protocol_fee)
            .ok_or(MathError::Overflow)?;
        self.last_filled_bin_id = Some(self.active_id);
        Ok(())
    }
}

/// `|start - end| / start * 100`, in percent.
fn price_impact(start_price: u128, end_price: u128) -> Result<Decimal, MathError> {
    let start = q64_to_decimal(start_price);
    let diff = q64_to_decimal(start_price.abs_diff(end_price));
    diff.checked_div(start)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(MathError::Overflow)
}

fn apply_slippage(amount: u64, allowed_slippage_bps: u16, up: bool) -> Result<u64, MathError> {
    let slippage = u128::from(allowed_slippage_bps).min(BASIS_POINT_MAX);
    let factor = if up {
        BASIS_POINT_MAX + slippage
    } else {
        BASIS_POINT_MAX - slippage
    };
    mul_div_u64(amount, factor, BASIS_POINT_MAX, Rounding::Down)
}

impl LbPair {
    /// Quotes an exact-input swap by walking bins in the trade direction,
    /// consuming liquidity bin by bin.
    ///
    /// Each bin is charged the fee implied by the volatility state at that
    /// bin. The walk only visits bin arrays present in `bin_arrays`; running
    /// out of them fails with `SwapError::InsufficientLiquidity` unless
    /// `params.is_partial_fill` is set. The pair is not modified, the
    /// evolved volatility state is returned in the quote.
    pub fn swap_quote<P>(&self, params: SwapQuoteParams, bin_arrays: &P) -> Result<SwapQuote, Error>
    where
        P: BinArrayProvider + ?Sized,
    {
        if params.amount == 0 {
            return Err(Error::SwapError(SwapError::AmountIsZero));
        }

        let swap_for_y = params.swap_for_y;
        let mut state = SwapState::new(self, params.amount, params.current_timestamp)?;

        'arrays: while state.amount_remaining > 0 {
            let Some(bin_array) =
                self.find_next_bin_array_with_liquidity(swap_for_y, state.active_id, bin_arrays)?
            else {
                if params.is_partial_fill {
                    break;
                }
                return Err(Error::SwapError(SwapError::InsufficientLiquidity));
            };

            state.touch(bin_array);
            state.enter(bin_array, swap_for_y)?;

            while bin_array.is_bin_id_within_range(state.active_id) {
                state.v_parameters = state
                    .v_parameters
                    .update_volatility_accumulator(state.active_id, &self.parameters);

                let bin = bin_array.get_bin(state.active_id)?;
                let price = get_q_price_from_id(state.active_id, self.bin_step)?;
                let step = swap_exact_in_quote_at_bin(
                    bin,
                    price,
                    self.bin_step,
                    &self.parameters,
                    &state.v_parameters,
                    state.amount_remaining,
                    swap_for_y,
                )?;

                if step.amount_in_with_fees() > 0 {
                    trace!(
                        bin_id = state.active_id,
                        amount_in = step.amount_in,
                        amount_out = step.amount_out,
                        fee = step.fee,
                        "filled bin"
                    );
                    state.amount_remaining -= step.amount_in_with_fees();
                    state.record(&step)?;
                }

                if state.amount_remaining == 0 {
                    break 'arrays;
                }
                state.step(swap_for_y)?;
            }
        }

        let Some(end_bin_id) = state.last_filled_bin_id else {
            return Err(Error::SwapError(SwapError::InsufficientLiquidity));
        };

        let start_price = get_q_price_from_id(state.start_bin_id, self.bin_step)?;
        let end_price = get_q_price_from_id(end_bin_id, self.bin_step)?;
        let min_out_amount = apply_slippage(state.amount_out, params.allowed_slippage_bps, false)?;

        debug!(
            consumed_in = state.amount_in,
            out = state.amount_out,
            fee = state.fee,
            start_bin_id = state.start_bin_id,
            end_bin_id,
            "exact in quote"
        );

        Ok(SwapQuote {
            consumed_in_amount: state.amount_in,
            out_amount: state.amount_out,
            fee: state.fee,
            protocol_fee: state.protocol_fee,
            min_out_amount,
            price_impact: price_impact(start_price, end_price)?,
            bin_arrays: state.bin_arrays,
            end_price,
            v_parameters: state.v_parameters,
        })
    }

    /// Quotes an exact-output swap: the input (fee included) needed to take
    /// `params.amount` out of the pair.
    ///
    /// Fails with `SwapError::InsufficientLiquidity` when the supplied bin
    /// arrays cannot provide the full output.
    pub fn swap_quote_exact_out<P>(
        &self,
        params: SwapQuoteParams,
        bin_arrays: &P,
    ) -> Result<SwapQuoteExactOut, Error>
    where
        P: BinArrayProvider + ?Sized,
    {
        if params.amount == 0 {
            return Err(Error::SwapError(SwapError::AmountIsZero));
        }

        let swap_for_y = params.swap_for_y;
        let mut state = SwapState::new(self, params.amount, params.current_timestamp)?;

        'arrays: while state.amount_remaining > 0 {
            let Some(bin_array) =
                self.find_next_bin_array_with_liquidity(swap_for_y, state.active_id, bin_arrays)?
            else {
                return Err(Error::SwapError(SwapError::InsufficientLiquidity));
            };

            state.touch(bin_array);
            state.enter(bin_array, swap_for_y)?;

            while bin_array.is_bin_id_within_range(state.active_id) {
                state.v_parameters = state
                    .v_parameters
                    .update_volatility_accumulator(state.active_id, &self.parameters);

                let bin = bin_array.get_bin(state.active_id)?;
                let price = get_q_price_from_id(state.active_id, self.bin_step)?;
                let step = swap_exact_out_quote_at_bin(
                    bin,
                    price,
                    self.bin_step,
                    &self.parameters,
                    &state.v_parameters,
                    state.amount_remaining,
                    swap_for_y,
                )?;

                if step.amount_out > 0 {
                    trace!(
                        bin_id = state.active_id,
                        amount_in = step.amount_in,
                        amount_out = step.amount_out,
                        fee = step.fee,
                        "filled bin"
                    );
                    state.amount_remaining -= step.amount_out;
                    state.record(&step)?;
                }

                if state.amount_remaining == 0 {
                    break 'arrays;
                }
                state.step(swap_for_y)?;
            }
        }

        // the loop only exits with the full output filled
        let end_bin_id = state.last_filled_bin_id.unwrap_or(state.start_bin_id);
        let start_price = get_q_price_from_id(state.start_bin_id, self.bin_step)?;
        let end_price = get_q_price_from_id(end_bin_id, self.bin_step)?;
        let max_in_amount = apply_slippage(state.amount_in, params.allowed_slippage_bps, true)?;

        debug!(
            in_amount = state.amount_in,
            out = state.amount_out,
            fee = state.fee,
            start_bin_id = state.start_bin_id,
            end_bin_id,
            "exact out quote"
        );

        Ok(SwapQuoteExactOut {
            in_amount: state.amount_in,
            max_in_amount,
            out_amount: state.amount_out,
            fee: state.fee,
            protocol_fee: state.protocol_fee,
            price_impact: price_impact(start_price, end_price)?,
            bin_arrays: state.bin_arrays,
            v_parameters: state.v_parameters,
        })
    }

    /// Largest output a swap in the given direction can take out of the
    /// supplied bin arrays, walking from the active bin.
    pub fn max_amount_out<P>(&self, swap_for_y: bool, bin_arrays: &P) -> Result<u64, Error>
    where
        P: BinArrayProvider + ?Sized,
    {
        let mut active_id = self.active_id;
        let mut total: u64 = 0;

        while let Some(bin_array) =
            self.find_next_bin_array_with_liquidity(swap_for_y, active_id, bin_arrays)?
        {
            for (bin_id, bin) in bin_array.iter_bins() {
                let ahead = if swap_for_y {
                    bin_id <= active_id
                } else {
                    bin_id >= active_id
                };
                if ahead {
                    total = total
                        .checked_add(bin.max_amount_out(swap_for_y))
                        .ok_or(MathError::Overflow)?;
                }
            }

            let (lower, upper) = bin_array.lower_upper_bin_id();
            let next = if swap_for_y { lower - 1 } else { upper + 1 };
            active_id = match i32::try_from(next) {
                Ok(next) => next,
                Err(_) => break,
            };
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fee_math::StaticParameters;
    use crate::math::math_helpers::mul_shr;
    use crate::{FastMap, ONE, SCALE_OFFSET};
    use tracing_test::traced_test;

    fn parameters() -> StaticParameters {
        StaticParameters {
            base_factor: 10_000,
            filter_period: 30,
            decay_period: 600,
            reduction_factor: 5_000,
            variable_fee_control: 0,
            max_volatility_accumulator: 350_000,
            min_bin_id: -43690,
            max_bin_id: 43690,
            protocol_share: 500,
        }
    }

    fn make_pool(active_id: i32, bin_step: u16, bins: &[(i32, u64, u64)]) -> (LbPair, FastMap<i64, BinArray>) {
        let mut pair = LbPair::new(active_id, bin_step, parameters());
        let mut bin_arrays: FastMap<i64, BinArray> = FastMap::default();

        for (bin_id, amount_x, amount_y) in bins {
            let bin_array = bin_arrays
                .entry(BinArray::containing(*bin_id).index)
                .or_insert_with(|| BinArray::containing(*bin_id));
            let bin = bin_array.get_bin_mut(*bin_id).unwrap();
            bin.amount_x = *amount_x;
            bin.amount_y = *amount_y;
            bin.price = get_q_price_from_id(*bin_id, bin_step).unwrap();
            pair.set_bin_array_initialized(bin_array.index).unwrap();
        }
        (pair, bin_arrays)
    }

    // ---------------- exact in ----------------

    #[test]
    fn exact_in_single_bin_end_to_end() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 1_000_000, 500_000)]);
        let params = SwapQuoteParams::new(100_000, true).with_slippage_bps(100);
        let quote = pair.swap_quote(params, &bin_arrays).unwrap();

        let price = pair.active_bin_price().unwrap();
        let gross_out = mul_shr(100_000, price, SCALE_OFFSET, Rounding::Down).unwrap() as u64;

        assert_eq!(quote.consumed_in_amount, 100_000);
        assert_eq!(quote.fee, 100);
        assert_eq!(quote.out_amount, 99_900);
        assert!(quote.out_amount <= gross_out - quote.fee);
        assert_eq!(quote.protocol_fee, 5);
        assert_eq!(quote.min_out_amount, 98_901);
        assert_eq!(quote.price_impact, Decimal::ZERO);
        assert_eq!(quote.bin_arrays, vec![0]);
        assert_eq!(quote.end_price, ONE);
    }

    #[test]
    fn exact_in_crosses_bins_and_accumulates_protocol_fee() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000_000), (-1, 0, 1_000_000)]);
        let quote = pair
            .swap_quote(SwapQuoteParams::new(1_500_000, true), &bin_arrays)
            .unwrap();

        let v = VariableParameters::default();
        let s = pair.parameters;
        let first = bin_arrays.bin_array(0).unwrap().get_bin(0).unwrap();
        let first = swap_exact_in_quote_at_bin(first, ONE, 10, &s, &v, 1_500_000, true).unwrap();
        let remaining = 1_500_000 - first.amount_in_with_fees();
        let second = bin_arrays.bin_array(-1).unwrap().get_bin(-1).unwrap();
        let price = get_q_price_from_id(-1, 10).unwrap();
        let second = swap_exact_in_quote_at_bin(second, price, 10, &s, &v, remaining, true).unwrap();

        // drained bin: 1002 fee, 50 protocol; partial bin: 499 fee, 24 protocol
        assert_eq!(first.fee, 1_002);
        assert_eq!(quote.consumed_in_amount, 1_500_000);
        assert_eq!(quote.out_amount, first.amount_out + second.amount_out);
        assert_eq!(quote.fee, first.fee + second.fee);
        assert_eq!(quote.protocol_fee, first.protocol_fee + second.protocol_fee);
        assert_eq!(quote.protocol_fee, 74);
        assert!(quote.price_impact > Decimal::ZERO);
        assert_eq!(quote.end_price, price);
        assert_eq!(quote.bin_arrays, vec![0, -1]);
    }

    #[test]
    fn exact_in_skips_empty_bins_and_arrays() {
        // active bin is empty; liquidity sits two arrays below
        let (mut pair, mut bin_arrays) = make_pool(5, 10, &[(-100, 0, 1_000_000)]);
        pair.set_bin_array_initialized(0).unwrap();
        bin_arrays.insert(0, BinArray::new(0));

        let quote = pair
            .swap_quote(SwapQuoteParams::new(1_000, true), &bin_arrays)
            .unwrap();
        assert_eq!(quote.consumed_in_amount, 1_000);
        assert!(quote.out_amount > 0);
        assert_eq!(quote.bin_arrays, vec![0, -2]);
        assert_eq!(quote.end_price, get_q_price_from_id(-100, 10).unwrap());
        // measured from the starting active bin, not the first filled one
        let expected = price_impact(get_q_price_from_id(5, 10).unwrap(), quote.end_price).unwrap();
        assert_eq!(quote.price_impact, expected);
    }

    #[test]
    fn price_impact_counts_empty_bins_below_active() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(-5, 0, 1_000_000)]);
        let expected = price_impact(ONE, get_q_price_from_id(-5, 10).unwrap()).unwrap();
        // 1 - 1.001^-5, roughly half a percent
        assert!(expected > Decimal::new(4, 1) && expected < Decimal::new(6, 1));

        let exact_in = pair
            .swap_quote(SwapQuoteParams::new(1_000, true), &bin_arrays)
            .unwrap();
        assert_eq!(exact_in.price_impact, expected);

        let exact_out = pair
            .swap_quote_exact_out(SwapQuoteParams::new(1_000, true), &bin_arrays)
            .unwrap();
        assert_eq!(exact_out.price_impact, expected);
    }

    #[test]
    fn price_impact_counts_empty_bins_above_active() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(5, 1_000_000, 0)]);
        let expected = price_impact(ONE, get_q_price_from_id(5, 10).unwrap()).unwrap();
        assert!(expected > Decimal::new(4, 1) && expected < Decimal::new(6, 1));

        let exact_in = pair
            .swap_quote(SwapQuoteParams::new(1_000, false), &bin_arrays)
            .unwrap();
        assert_eq!(exact_in.price_impact, expected);

        let exact_out = pair
            .swap_quote_exact_out(SwapQuoteParams::new(1_000, false), &bin_arrays)
            .unwrap();
        assert_eq!(exact_out.price_impact, expected);
    }

    #[test]
    fn exact_in_insufficient_liquidity() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000)]);
        let res = pair.swap_quote(SwapQuoteParams::new(1_000_000, true), &bin_arrays);
        assert!(matches!(
            res,
            Err(Error::SwapError(SwapError::InsufficientLiquidity))
        ));
    }

    #[test]
    fn exact_in_partial_fill_returns_what_was_filled() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000)]);
        let params = SwapQuoteParams::new(1_000_000, true).with_partial_fill(true);
        let quote = pair.swap_quote(params, &bin_arrays).unwrap();
        assert_eq!(quote.out_amount, 1_000);
        assert!(quote.consumed_in_amount < 1_000_000);
        // 1_000 net plus ceil(1_000 * 1e6 / 999e6) = 2 of fee
        assert_eq!(quote.consumed_in_amount, 1_002);
    }

    #[test]
    fn exact_in_without_any_liquidity_fails_even_with_partial_fill() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 1_000, 0)]);
        let params = SwapQuoteParams::new(100, true).with_partial_fill(true);
        let res = pair.swap_quote(params, &bin_arrays);
        assert!(matches!(
            res,
            Err(Error::SwapError(SwapError::InsufficientLiquidity))
        ));
    }

    #[test]
    fn exact_in_rejects_zero_amount() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 1_000, 1_000)]);
        let res = pair.swap_quote(SwapQuoteParams::new(0, true), &bin_arrays);
        assert!(matches!(res, Err(Error::SwapError(SwapError::AmountIsZero))));
    }

    #[test]
    fn exact_in_y_for_x_moves_up() {
        let (pair, bin_arrays) = make_pool(69, 10, &[(69, 1_000, 0), (70, 1_000, 0)]);
        let quote = pair
            .swap_quote(SwapQuoteParams::new(1_500, false), &bin_arrays)
            .unwrap();
        assert_eq!(quote.bin_arrays, vec![0, 1]);
        assert_eq!(quote.end_price, get_q_price_from_id(70, 10).unwrap());
        assert!(quote.out_amount > 1_000);
    }

    #[test]
    fn quote_leaves_pair_untouched_and_returns_volatility() {
        let mut parameters = parameters();
        parameters.variable_fee_control = 40_000;
        let (mut pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000), (-1, 0, 1_000), (-2, 0, 1_000)]);
        pair.parameters = parameters;
        let before = pair.clone();

        let quote = pair
            .swap_quote(SwapQuoteParams::new(2_500, true).at_timestamp(10_000), &bin_arrays)
            .unwrap();

        assert_eq!(pair, before);
        assert_eq!(quote.v_parameters.index_reference, 0);
        assert_eq!(quote.v_parameters.volatility_accumulator, 20_000);
    }

    #[test]
    #[traced_test]
    fn quote_logs_summary() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 1_000, 1_000)]);
        pair.swap_quote(SwapQuoteParams::new(100, true), &bin_arrays)
            .unwrap();
        assert!(logs_contain("exact in quote"));
    }

    // ---------------- exact out ----------------

    #[test]
    fn exact_out_single_bin() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 1_000_000, 500_000)]);
        let params = SwapQuoteParams::new(100_000, true).with_slippage_bps(100);
        let quote = pair.swap_quote_exact_out(params, &bin_arrays).unwrap();

        assert_eq!(quote.out_amount, 100_000);
        assert_eq!(quote.fee, 101);
        assert_eq!(quote.in_amount, 100_101);
        assert_eq!(quote.max_in_amount, 101_102);
        assert_eq!(quote.protocol_fee, 5);
        assert_eq!(quote.price_impact, Decimal::ZERO);
    }

    #[test]
    fn exact_out_crosses_bins() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000), (-1, 0, 1_000)]);
        let quote = pair
            .swap_quote_exact_out(SwapQuoteParams::new(1_500, true), &bin_arrays)
            .unwrap();
        assert_eq!(quote.out_amount, 1_500);
        assert!(quote.in_amount > 1_500);
        assert!(quote.price_impact > Decimal::ZERO);
        assert_eq!(quote.bin_arrays, vec![0, -1]);
    }

    #[test]
    fn exact_out_insufficient_liquidity() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(0, 0, 1_000)]);
        let res = pair.swap_quote_exact_out(SwapQuoteParams::new(1_001, true), &bin_arrays);
        assert!(matches!(
            res,
            Err(Error::SwapError(SwapError::InsufficientLiquidity))
        ));
    }

    // ---------------- helpers ----------------

    #[test]
    fn max_amount_out_sums_reachable_reserves() {
        let (pair, bin_arrays) = make_pool(0, 10, &[(1, 0, 7), (0, 0, 10), (-80, 0, 20), (-1, 5, 0)]);
        assert_eq!(pair.max_amount_out(true, &bin_arrays).unwrap(), 30);
        assert_eq!(pair.max_amount_out(false, &bin_arrays).unwrap(), 0);
    }

    #[test]
    fn slippage_bounds() {
        assert_eq!(apply_slippage(10_000, 50, false).unwrap(), 9_950);
        assert_eq!(apply_slippage(10_000, 20_000, false).unwrap(), 0);
        assert_eq!(apply_slippage(10_000, 50, true).unwrap(), 10_050);
    }
}
