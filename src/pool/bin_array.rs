use crate::FastMap;
use crate::MAX_BIN_PER_ARRAY;
use crate::error::{MathError, StateError};
use crate::math::bin_array_bitmap::{bin_id_to_bin_array_index, get_bin_array_lower_upper_bin_id};
use crate::math::price_math::get_q_price_from_id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    /// Amount of token X in the bin.
    pub amount_x: u64,
    /// Amount of token Y in the bin.
    pub amount_y: u64,
    /// Cached Q64.64 price. Quotes recompute the price from the bin id.
    pub price: u128,
    /// Liquidity share units minted against the bin.
    pub liquidity_supply: u128,
    pub reward_per_token_stored: [u128; 2],
    pub fee_amount_x_per_token_stored: u128,
    pub fee_amount_y_per_token_stored: u128,
}

impl Bin {
    /// Reserve a swap in the given direction can take out of this bin.
    #[inline]
    pub fn max_amount_out(&self, swap_for_y: bool) -> u64 {
        if swap_for_y { self.amount_y } else { self.amount_x }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.amount_x == 0 && self.amount_y == 0
    }
}

/// Snapshot of `MAX_BIN_PER_ARRAY` consecutive bins starting at
/// `index * MAX_BIN_PER_ARRAY`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinArray {
    pub index: i64,
    pub bins: [Bin; MAX_BIN_PER_ARRAY],
}

impl BinArray {
    pub fn new(index: i64) -> Self {
        Self {
            index,
            bins: [Bin::default(); MAX_BIN_PER_ARRAY],
        }
    }

    /// Empty array covering `bin_id`.
    pub fn containing(bin_id: i32) -> Self {
        Self::new(bin_id_to_bin_array_index(bin_id))
    }

    #[inline]
    pub fn lower_upper_bin_id(&self) -> (i64, i64) {
        get_bin_array_lower_upper_bin_id(self.index)
    }

    #[inline]
    pub fn is_bin_id_within_range(&self, bin_id: i32) -> bool {
        let (lower, upper) = self.lower_upper_bin_id();
        (lower..=upper).contains(&i64::from(bin_id))
    }

    fn bin_offset(&self, bin_id: i32) -> Result<usize, StateError> {
        if !self.is_bin_id_within_range(bin_id) {
            return Err(StateError::BinNotInArray {
                bin_id,
                index: self.index,
            });
        }
        let (lower, _) = self.lower_upper_bin_id();
        Ok((i64::from(bin_id) - lower) as usize)
    }

    pub fn get_bin(&self, bin_id: i32) -> Result<&Bin, StateError> {
        Ok(&self.bins[self.bin_offset(bin_id)?])
    }

    pub fn get_bin_mut(&mut self, bin_id: i32) -> Result<&mut Bin, StateError> {
        let offset = self.bin_offset(bin_id)?;
        Ok(&mut self.bins[offset])
    }

    /// Bins paired with their ids, lowest id first.
    pub fn iter_bins(&self) -> impl Iterator<Item = (i32, &Bin)> + '_ {
        let (lower, _) = self.lower_upper_bin_id();
        self.bins
            .iter()
            .enumerate()
            .map(move |(offset, bin)| ((lower + offset as i64) as i32, bin))
    }
}

/// Source of bin array snapshots, keyed by array index.
///
/// `None` means the caller never fetched the array or it is uninitialized.
pub trait BinArrayProvider {
    fn bin_array(&self, index: i64) -> Option<&BinArray>;
}

impl BinArrayProvider for FastMap<i64, BinArray> {
    #[inline]
    fn bin_array(&self, index: i64) -> Option<&BinArray> {
        self.get(&index)
    }
}

impl BinArrayProvider for [BinArray] {
    fn bin_array(&self, index: i64) -> Option<&BinArray> {
        self.iter().find(|bin_array| bin_array.index == index)
    }
}

impl BinArrayProvider for Vec<BinArray> {
    fn bin_array(&self, index: i64) -> Option<&BinArray> {
        self.as_slice().bin_array(index)
    }
}

/// Flattens bin arrays into a bin id lookup.
pub fn bins_by_id<'a>(bin_arrays: impl IntoIterator<Item = &'a BinArray>) -> FastMap<i32, Bin> {
    let mut bins = FastMap::default();
    for bin_array in bin_arrays {
        bins.extend(bin_array.iter_bins().map(|(bin_id, bin)| (bin_id, *bin)));
    }
    bins
}

/// A bin as seen by a range enumeration, with its recomputed price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinLiquidity {
    pub bin_id: i32,
    pub amount_x: u64,
    pub amount_y: u64,
    pub liquidity_supply: u128,
    /// Q64.64 price of `bin_id`.
    pub price: u128,
}

/// Yields every bin in `[lower_bin_id, upper_bin_id]` in ascending order.
///
/// Ids missing from `bins` come back as empty placeholders. The iterator is
/// `Clone`, so a caller can restart the walk from a saved copy.
pub fn enumerate_bins(
    bins: &FastMap<i32, Bin>,
    lower_bin_id: i32,
    upper_bin_id: i32,
    bin_step: u16,
) -> impl Iterator<Item = Result<BinLiquidity, MathError>> + Clone + '_ {
    (lower_bin_id..=upper_bin_id).map(move |bin_id| -> Result<BinLiquidity, MathError> {
        let bin = bins.get(&bin_id).copied().unwrap_or_default();
        Ok(BinLiquidity {
            bin_id,
            amount_x: bin.amount_x,
            amount_y: bin.amount_y,
            liquidity_supply: bin.liquidity_supply,
            price: get_q_price_from_id(bin_id, bin_step)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ONE;

    fn array_with(index: i64, bins: &[(i32, u64, u64)]) -> BinArray {
        let mut bin_array = BinArray::new(index);
        for (bin_id, amount_x, amount_y) in bins {
            let bin = bin_array.get_bin_mut(*bin_id).unwrap();
            bin.amount_x = *amount_x;
            bin.amount_y = *amount_y;
        }
        bin_array
    }

    // ---- bin array tests ----

    #[test]
    fn negative_array_bin_lookup() {
        let bin_array = array_with(-1, &[(-70, 1, 0), (-1, 0, 2)]);
        assert_eq!(bin_array.bins[0].amount_x, 1);
        assert_eq!(bin_array.bins[69].amount_y, 2);
        assert_eq!(bin_array.get_bin(-1).unwrap().amount_y, 2);
    }

    #[test]
    fn get_bin_outside_array_errors() {
        let bin_array = BinArray::new(0);
        let res = bin_array.get_bin(70);
        assert!(matches!(
            res,
            Err(StateError::BinNotInArray { bin_id: 70, index: 0 })
        ));
    }

    #[test]
    fn containing_picks_floor_index() {
        assert_eq!(BinArray::containing(-1).index, -1);
        assert_eq!(BinArray::containing(139).index, 1);
    }

    #[test]
    fn providers_find_by_index() {
        let arrays = vec![BinArray::new(-1), BinArray::new(3)];
        assert_eq!(arrays.bin_array(3).map(|a| a.index), Some(3));
        assert!(arrays.bin_array(0).is_none());

        let mut map = FastMap::default();
        map.insert(3, BinArray::new(3));
        assert!(map.bin_array(3).is_some());
        assert!(map.bin_array(-1).is_none());
    }

    // ---- enumerate_bins tests ----

    #[test]
    fn enumeration_fills_gaps_with_empty_bins() {
        let arrays = [array_with(0, &[(1, 10, 0), (3, 0, 30)])];
        let lookup = bins_by_id(arrays.iter());
        let bins: Vec<_> = enumerate_bins(&lookup, -2, 3, 10)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(bins.len(), 6);
        assert_eq!(bins[0].bin_id, -2);
        assert_eq!(bins[0].amount_x, 0);
        assert_eq!(bins[3].amount_x, 10);
        assert_eq!(bins[5].amount_y, 30);
        assert_eq!(bins[2].price, ONE);
    }

    #[test]
    fn enumeration_is_restartable() {
        let lookup = bins_by_id([array_with(0, &[(0, 5, 5)])].iter());
        let walk = enumerate_bins(&lookup, 0, 2, 10);
        let first: Vec<_> = walk.clone().map(|b| b.unwrap().bin_id).collect();
        let second: Vec<_> = walk.map(|b| b.unwrap().bin_id).collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn enumeration_of_inverted_range_is_empty() {
        let lookup = FastMap::default();
        assert_eq!(enumerate_bins(&lookup, 5, 4, 10).count(), 0);
    }
}
