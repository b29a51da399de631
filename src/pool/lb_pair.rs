use crate::error::{MathError, StateError};
use crate::math::bin_array_bitmap::{
    BinArrayBitmapExtension, flip_bin_array_bit, is_bin_array_initialized,
    is_overflow_default_bin_array_bitmap, next_bin_array_index_with_liquidity,
};
use crate::math::fee_math::{self, FeeInfo, StaticParameters, VariableParameters};
use crate::math::price_math::{get_price_of_bin_by_bin_id, get_q_price_from_id};
use crate::pool::bin_array::{BinArray, BinArrayProvider};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Snapshot of a liquidity book pair: fee configuration, volatility state,
/// active bin and the bitmaps locating its initialized bin arrays.
///
/// The bin arrays themselves are not part of the pair; quotes read them
/// through a [`BinArrayProvider`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LbPair {
    pub parameters: StaticParameters,
    pub v_parameters: VariableParameters,
    /// Bin id holding the current price.
    pub active_id: i32,
    /// Price increment between adjacent bins, in bps.
    pub bin_step: u16,
    /// Initialized bin arrays for indices `[-512, 511]`.
    pub bin_array_bitmap: [u64; 16],
    /// Initialized bin arrays beyond the default bitmap, when the pair has
    /// an extension account.
    pub bin_array_bitmap_extension: Option<BinArrayBitmapExtension>,
}

impl LbPair {
    pub fn new(active_id: i32, bin_step: u16, parameters: StaticParameters) -> Self {
        Self {
            parameters,
            active_id,
            bin_step,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_variable_parameters(mut self, v_parameters: VariableParameters) -> Self {
        self.v_parameters = v_parameters;
        self
    }

    #[must_use]
    pub fn with_bitmap_extension(mut self, extension: BinArrayBitmapExtension) -> Self {
        self.bin_array_bitmap_extension = Some(extension);
        self
    }

    pub fn is_bin_array_initialized(&self, index: i64) -> Result<bool, StateError> {
        if !is_overflow_default_bin_array_bitmap(index) {
            return is_bin_array_initialized(&self.bin_array_bitmap, index);
        }
        match &self.bin_array_bitmap_extension {
            Some(extension) => extension.is_bin_array_initialized(index),
            None => Ok(false),
        }
    }

    /// Marks a bin array as initialized, creating an empty extension when
    /// the index lies outside the default bitmap.
    pub fn set_bin_array_initialized(&mut self, index: i64) -> Result<(), StateError> {
        if self.is_bin_array_initialized(index)? {
            return Ok(());
        }
        if !is_overflow_default_bin_array_bitmap(index) {
            return flip_bin_array_bit(&mut self.bin_array_bitmap, index);
        }
        self.bin_array_bitmap_extension
            .get_or_insert_with(BinArrayBitmapExtension::default)
            .flip_bin_array_bit(index)
    }

    pub fn next_bin_array_index_with_liquidity(
        &self,
        swap_for_y: bool,
        active_id: i32,
    ) -> Result<Option<i64>, StateError> {
        next_bin_array_index_with_liquidity(
            swap_for_y,
            active_id,
            &self.bin_array_bitmap,
            self.bin_array_bitmap_extension.as_ref(),
        )
    }

    /// Next initialized bin array in the swap direction, looked up in
    /// `bin_arrays`. An array the bitmap points at but the provider does not
    /// hold ends the search.
    pub fn find_next_bin_array_with_liquidity<'a, P>(
        &self,
        swap_for_y: bool,
        active_id: i32,
        bin_arrays: &'a P,
    ) -> Result<Option<&'a BinArray>, StateError>
    where
        P: BinArrayProvider + ?Sized,
    {
        let Some(index) = self.next_bin_array_index_with_liquidity(swap_for_y, active_id)? else {
            return Ok(None);
        };

        let bin_array = bin_arrays.bin_array(index);
        if bin_array.is_none() {
            warn!(index, active_id, "initialized bin array missing from snapshot");
        }
        Ok(bin_array)
    }

    /// Q64.64 price of the active bin.
    pub fn active_bin_price(&self) -> Result<u128, MathError> {
        get_q_price_from_id(self.active_id, self.bin_step)
    }

    /// Decimal price per lamport of the active bin.
    pub fn active_bin_price_per_lamport(&self) -> Result<Decimal, MathError> {
        get_price_of_bin_by_bin_id(self.active_id, self.bin_step)
    }

    pub fn fee_info(&self) -> FeeInfo {
        fee_math::fee_info(self.bin_step, &self.parameters)
    }

    /// Total fee percentage a swap starting at `current_timestamp` would pay
    /// in the active bin.
    pub fn dynamic_fee(&self, current_timestamp: i64) -> Result<Decimal, MathError> {
        fee_math::dynamic_fee(
            self.bin_step,
            &self.parameters,
            &self.v_parameters,
            self.active_id,
            current_timestamp,
        )
    }
}
