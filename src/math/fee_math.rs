use crate::error::{MathError, ParameterError};
use crate::math::math_helpers::{Rounding, mul_div, to_u64};
use crate::{BASIS_POINT_MAX, FEE_PRECISION, MAX_FEE_RATE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticParameters {
    /// Used for base fee calculation. base_fee_rate = base_factor * bin_step * 10
    pub base_factor: u16,
    /// Filter period determine high frequency trading time window.
    pub filter_period: u16,
    /// Decay period determine when the volatile fee start decay / decrease.
    pub decay_period: u16,
    /// Reduction factor controls the volatile fee rate decrement rate.
    pub reduction_factor: u16,
    /// Used to scale the variable fee component depending on the dynamic of the market
    pub variable_fee_control: u32,
    /// Maximum number of bin crossed can be accumulated. Used to cap volatile fee rate.
    pub max_volatility_accumulator: u32,
    /// Min bin id supported by the pool based on the configured bin step.
    pub min_bin_id: i32,
    /// Max bin id supported by the pool based on the configured bin step.
    pub max_bin_id: i32,
    /// Share of the swap fee, in bps, retained by the protocol.
    pub protocol_share: u16,
}

/// Volatility state driving the variable fee.
///
/// Every update returns a new value; a quote works on its own copy and the
/// pair snapshot it was taken from is left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableParameters {
    /// Number of bins crossed since the reference bin, scaled by 10000.
    pub volatility_accumulator: u32,
    /// Decayed volatility accumulator. It is always <= volatility_accumulator
    pub volatility_reference: u32,
    /// Active bin id of last swap.
    pub index_reference: i32,
    /// Last timestamp the variable parameters was updated
    pub last_update_timestamp: i64,
}

impl VariableParameters {
    /// Moves the reference bin to `active_id` once the filter period has
    /// elapsed, decaying or resetting the volatility reference depending on
    /// whether the decay period has elapsed too.
    ///
    /// A `reduction_factor` above `BASIS_POINT_MAX` can push the decayed
    /// reference past `u32`, which fails with `MathError::Overflow`.
    pub fn update_references(
        self,
        active_id: i32,
        current_timestamp: i64,
        s: &StaticParameters,
    ) -> Result<Self, MathError> {
        let elapsed = current_timestamp.saturating_sub(self.last_update_timestamp);
        if elapsed < i64::from(s.filter_period) {
            return Ok(self);
        }

        let volatility_reference = if elapsed < i64::from(s.decay_period) {
            let decayed = u64::from(self.volatility_accumulator) * u64::from(s.reduction_factor)
                / BASIS_POINT_MAX as u64;
            u32::try_from(decayed).map_err(|_| MathError::Overflow)?
        } else {
            0
        };

        Ok(Self {
            index_reference: active_id,
            volatility_reference,
            ..self
        })
    }

    /// Recomputes the accumulator for `active_id` from the reference state,
    /// capped at `max_volatility_accumulator`.
    #[must_use]
    pub fn update_volatility_accumulator(self, active_id: i32, s: &StaticParameters) -> Self {
        let delta_id = (i64::from(self.index_reference) - i64::from(active_id)).unsigned_abs();
        let accumulator = u64::from(self.volatility_reference)
            .saturating_add(delta_id.saturating_mul(BASIS_POINT_MAX as u64));
        let volatility_accumulator = accumulator.min(u64::from(s.max_volatility_accumulator)) as u32;

        Self {
            volatility_accumulator,
            ..self
        }
    }
}

#[inline]
pub fn get_base_fee(bin_step: u16, s: &StaticParameters) -> u128 {
    u128::from(s.base_factor) * u128::from(bin_step) * 10
}

/// `ceil(variable_fee_control * (volatility_accumulator * bin_step)^2 / 1e11)`.
pub fn get_variable_fee(
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
) -> Result<u128, MathError> {
    if s.variable_fee_control == 0 {
        return Ok(0);
    }

    let square_vfa_bin = (u128::from(v.volatility_accumulator) * u128::from(bin_step)).pow(2);
    let v_fee = square_vfa_bin
        .checked_mul(u128::from(s.variable_fee_control))
        .ok_or(MathError::Overflow)?;

    Ok(v_fee.div_ceil(100_000_000_000))
}

/// Base plus variable fee, capped at `MAX_FEE_RATE`.
pub fn get_total_fee(
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
) -> Result<u128, MathError> {
    let total = get_base_fee(bin_step, s)
        .checked_add(get_variable_fee(bin_step, s, v)?)
        .ok_or(MathError::Overflow)?;
    Ok(total.min(MAX_FEE_RATE))
}

/// Fee to charge on top of a net input amount so that `amount + fee` nets
/// to `amount` after the fee is taken out.
pub fn compute_fee(
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
    in_amount: u64,
) -> Result<u64, MathError> {
    let total_fee_rate = get_total_fee(bin_step, s, v)?;
    let denominator = FEE_PRECISION - total_fee_rate;
    let fee = mul_div(in_amount.into(), total_fee_rate, denominator, Rounding::Up)?;
    to_u64(fee)
}

/// Fee contained in a gross input amount.
pub fn compute_fee_from_amount(
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
    in_amount_with_fees: u64,
) -> Result<u64, MathError> {
    let total_fee_rate = get_total_fee(bin_step, s, v)?;
    let fee = mul_div(
        in_amount_with_fees.into(),
        total_fee_rate,
        FEE_PRECISION,
        Rounding::Up,
    )?;
    to_u64(fee)
}

pub fn compute_protocol_fee(fee_amount: u64, s: &StaticParameters) -> Result<u64, MathError> {
    let protocol_fee = mul_div(
        fee_amount.into(),
        s.protocol_share.into(),
        BASIS_POINT_MAX,
        Rounding::Down,
    )?;
    to_u64(protocol_fee)
}

/// Base factor giving exactly `fee_bps` of base fee at `bin_step`.
pub fn compute_base_factor_from_fee_bps(bin_step: u16, fee_bps: u16) -> Result<u16, ParameterError> {
    if bin_step == 0 {
        return Err(ParameterError::ParameterOverflow);
    }

    let numerator = u64::from(fee_bps) * BASIS_POINT_MAX as u64;
    let base_factor = numerator / u64::from(bin_step);
    let exact = numerator % u64::from(bin_step) == 0;

    if base_factor >= u64::from(u16::MAX) && (!exact || base_factor > u64::from(u16::MAX)) {
        return Err(ParameterError::ParameterOverflow);
    }
    if !exact {
        if base_factor == 0 {
            return Err(ParameterError::ParameterUnderflow);
        }
        return Err(ParameterError::InexactBaseFactor);
    }

    Ok(base_factor as u16)
}

/// Fee rates of a pair expressed as percentages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeInfo {
    pub base_fee_rate_percentage: Decimal,
    pub max_fee_rate_percentage: Decimal,
    pub protocol_fee_percentage: Decimal,
}

fn fee_rate_to_percentage(fee_rate: u128) -> Decimal {
    Decimal::from(fee_rate as u64) * Decimal::ONE_HUNDRED / Decimal::from(FEE_PRECISION as u64)
}

pub fn fee_info(bin_step: u16, s: &StaticParameters) -> FeeInfo {
    FeeInfo {
        base_fee_rate_percentage: fee_rate_to_percentage(get_base_fee(bin_step, s)),
        max_fee_rate_percentage: fee_rate_to_percentage(MAX_FEE_RATE),
        protocol_fee_percentage: Decimal::from(s.protocol_share) * Decimal::ONE_HUNDRED
            / Decimal::from(BASIS_POINT_MAX as u64),
    }
}

/// Total fee, as a percentage, a swap starting now at `active_id` would pay
/// in its first bin.
pub fn dynamic_fee(
    bin_step: u16,
    s: &StaticParameters,
    v: &VariableParameters,
    active_id: i32,
    current_timestamp: i64,
) -> Result<Decimal, MathError> {
    let v = v
        .update_references(active_id, current_timestamp, s)?
        .update_volatility_accumulator(active_id, s);
    Ok(fee_rate_to_percentage(get_total_fee(bin_step, s, &v)?))
}
