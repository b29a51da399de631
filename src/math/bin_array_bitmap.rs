use crate::error::StateError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use crate::{BIN_ARRAY_BITMAP_SIZE, EXTENSION_BINARRAY_BITMAP_SIZE, MAX_BIN_PER_ARRAY};
use alloy_primitives::Uint;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type U1024 = Uint<1024, 16>;
pub type U512 = Uint<512, 8>;

const BINS_PER_ARRAY: i64 = MAX_BIN_PER_ARRAY as i64;
const EXTENSION_CHUNK_BITS: i64 = BIN_ARRAY_BITMAP_SIZE;
const INTERNAL_BITMAP_BITS: usize = 1024;

/// Index of the bin array holding `bin_id` (floor division, so negative
/// ids land in negative arrays).
#[inline]
pub fn bin_id_to_bin_array_index(bin_id: i32) -> i64 {
    i64::from(bin_id).div_euclid(BINS_PER_ARRAY)
}

/// Inclusive bin id bounds `[index * 70, index * 70 + 69]` of an array.
#[inline]
pub fn get_bin_array_lower_upper_bin_id(index: i64) -> (i64, i64) {
    let lower = index * BINS_PER_ARRAY;
    (lower, lower + BINS_PER_ARRAY - 1)
}

#[inline]
pub fn is_bin_id_within_bin_array(bin_id: i32, index: i64) -> bool {
    let (lower, upper) = get_bin_array_lower_upper_bin_id(index);
    (lower..=upper).contains(&i64::from(bin_id))
}

/// Array indices covered by the pair's own bitmap, `[-512, 511]`.
#[inline]
pub const fn internal_bitmap_range() -> (i64, i64) {
    (-BIN_ARRAY_BITMAP_SIZE, BIN_ARRAY_BITMAP_SIZE - 1)
}

/// Array indices addressable with the extension attached.
#[inline]
pub const fn extension_bitmap_range() -> (i64, i64) {
    let chunks = EXTENSION_BINARRAY_BITMAP_SIZE as i64 + 1;
    (
        -BIN_ARRAY_BITMAP_SIZE * chunks,
        BIN_ARRAY_BITMAP_SIZE * chunks - 1,
    )
}

#[inline]
pub fn is_overflow_default_bin_array_bitmap(index: i64) -> bool {
    let (min_index, max_index) = internal_bitmap_range();
    index < min_index || index > max_index
}

/// Every array index touched by the bin range `[lower_bin_id, upper_bin_id]`.
pub fn get_bin_array_indexes_coverage(lower_bin_id: i32, upper_bin_id: i32) -> Vec<i64> {
    let lower = bin_id_to_bin_array_index(lower_bin_id);
    let upper = bin_id_to_bin_array_index(upper_bin_id);
    (lower..=upper).collect()
}

fn internal_bit_offset(index: i64) -> Result<usize, StateError> {
    if is_overflow_default_bin_array_bitmap(index) {
        return Err(StateError::BinArrayIndexOutOfBounds(index));
    }
    Ok((index + BIN_ARRAY_BITMAP_SIZE) as usize)
}

/// Tests an array index against the pair's 1024-bit bitmap.
pub fn is_bin_array_initialized(bitmap: &[u64; 16], index: i64) -> Result<bool, StateError> {
    let offset = internal_bit_offset(index)?;
    Ok(U1024::from_limbs(*bitmap).bit(offset))
}

pub fn flip_bin_array_bit(bitmap: &mut [u64; 16], index: i64) -> Result<(), StateError> {
    let offset = internal_bit_offset(index)?;
    bitmap[offset / 64] ^= 1u64 << (offset % 64);
    Ok(())
}

/// Bitmap for array indices outside `[-512, 511]`.
///
/// Each side holds twelve 512-bit chunks stored as little-endian `u64`
/// words. Positive index `i` lives in chunk `i / 512 - 1` at bit `i % 512`;
/// negative index `i` is mirrored through `-(i + 1)` first so offsets stay
/// non-negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinArrayBitmapExtension {
    pub positive_bin_array_bitmap: [[u64; 8]; EXTENSION_BINARRAY_BITMAP_SIZE],
    pub negative_bin_array_bitmap: [[u64; 8]; EXTENSION_BINARRAY_BITMAP_SIZE],
}

impl BinArrayBitmapExtension {
    fn check_index(index: i64) -> Result<(), StateError> {
        let (min_index, max_index) = extension_bitmap_range();
        if !is_overflow_default_bin_array_bitmap(index) || index < min_index || index > max_index {
            return Err(StateError::BinArrayIndexOutOfBounds(index));
        }
        Ok(())
    }

    #[inline]
    fn bitmap_offset(index: i64) -> usize {
        if index > 0 {
            (index / EXTENSION_CHUNK_BITS - 1) as usize
        } else {
            (-(index + 1) / EXTENSION_CHUNK_BITS - 1) as usize
        }
    }

    #[inline]
    fn bin_array_offset_in_bitmap(index: i64) -> usize {
        if index > 0 {
            (index % EXTENSION_CHUNK_BITS) as usize
        } else {
            (-(index + 1) % EXTENSION_CHUNK_BITS) as usize
        }
    }

    // inclusive array index bounds of the chunk holding `index`
    fn chunk_bounds(index: i64) -> (i64, i64) {
        if index > 0 {
            let lower = index / EXTENSION_CHUNK_BITS * EXTENSION_CHUNK_BITS;
            (lower, lower + EXTENSION_CHUNK_BITS - 1)
        } else {
            let chunk = -(index + 1) / EXTENSION_CHUNK_BITS;
            (
                -(chunk + 1) * EXTENSION_CHUNK_BITS,
                -chunk * EXTENSION_CHUNK_BITS - 1,
            )
        }
    }

    fn words_mut(&mut self, index: i64) -> &mut [u64; 8] {
        let offset = Self::bitmap_offset(index);
        if index > 0 {
            &mut self.positive_bin_array_bitmap[offset]
        } else {
            &mut self.negative_bin_array_bitmap[offset]
        }
    }

    fn chunk(&self, index: i64) -> Result<U512, StateError> {
        Self::check_index(index)?;
        let offset = Self::bitmap_offset(index);
        let words = if index > 0 {
            self.positive_bin_array_bitmap[offset]
        } else {
            self.negative_bin_array_bitmap[offset]
        };
        Ok(U512::from_limbs(words))
    }

    pub fn is_bin_array_initialized(&self, index: i64) -> Result<bool, StateError> {
        let chunk = self.chunk(index)?;
        Ok(chunk.bit(Self::bin_array_offset_in_bitmap(index)))
    }

    pub fn flip_bin_array_bit(&mut self, index: i64) -> Result<(), StateError> {
        Self::check_index(index)?;
        let bit = Self::bin_array_offset_in_bitmap(index);
        self.words_mut(index)[bit / 64] ^= 1u64 << (bit % 64);
        Ok(())
    }

    /// Nearest initialized index walking from `start` to `end`, both
    /// inclusive and on the same side of the extension.
    fn next_set_bit(&self, start: i64, end: i64) -> Result<Option<i64>, StateError> {
        let step: i64 = if end >= start { 1 } else { -1 };
        let past_end = |index: i64| if step > 0 { index > end } else { index < end };

        let mut index = start;
        while !past_end(index) {
            let chunk = self.chunk(index)?;
            let (lower, upper) = Self::chunk_bounds(index);
            let stop = if step > 0 { upper.min(end) } else { lower.max(end) };

            if !chunk.is_zero() {
                let mut cursor = index;
                loop {
                    if chunk.bit(Self::bin_array_offset_in_bitmap(cursor)) {
                        return Ok(Some(cursor));
                    }
                    if cursor == stop {
                        break;
                    }
                    cursor += step;
                }
            }
            index = stop + step;
        }
        Ok(None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchState {
    Internal(i64),
    ExtensionNegative(i64),
    ExtensionPositive(i64),
    Exhausted,
}

impl SearchState {
    fn start(index: i64, swap_for_y: bool, has_extension: bool) -> Self {
        let (min_internal, max_internal) = internal_bitmap_range();
        let (min_extension, max_extension) = extension_bitmap_range();

        if (min_internal..=max_internal).contains(&index) {
            return SearchState::Internal(index);
        }
        if !has_extension {
            return SearchState::Exhausted;
        }

        if index < min_internal {
            if index >= min_extension {
                SearchState::ExtensionNegative(index)
            } else if swap_for_y {
                SearchState::Exhausted
            } else {
                SearchState::ExtensionNegative(min_extension)
            }
        } else if index <= max_extension {
            SearchState::ExtensionPositive(index)
        } else if swap_for_y {
            SearchState::ExtensionPositive(max_extension)
        } else {
            SearchState::Exhausted
        }
    }
}

/// Finds the nearest initialized bin array index at or beyond the array
/// holding `active_id`, walking down when `swap_for_y` and up otherwise.
///
/// The walk crosses between the pair's bitmap and the extension as needed
/// and returns `None` once the addressable range is exhausted. Without an
/// extension, a start outside `[-512, 511]` yields `None` immediately.
pub fn next_bin_array_index_with_liquidity(
    swap_for_y: bool,
    active_id: i32,
    bitmap: &[u64; 16],
    extension: Option<&BinArrayBitmapExtension>,
) -> Result<Option<i64>, StateError> {
    let (min_internal, max_internal) = internal_bitmap_range();
    let (min_extension, max_extension) = extension_bitmap_range();

    let start_index = bin_id_to_bin_array_index(active_id);
    let mut state = SearchState::start(start_index, swap_for_y, extension.is_some());

    loop {
        state = match state {
            SearchState::Internal(index) => {
                let offset = (index - min_internal) as usize;
                let word = U1024::from_limbs(*bitmap);

                if swap_for_y {
                    let cropped = word << (INTERNAL_BITMAP_BITS - 1 - offset);
                    if let Ok(msb) = most_significant_bit(cropped) {
                        return Ok(Some(index - (INTERNAL_BITMAP_BITS - 1 - msb) as i64));
                    }
                    if extension.is_some() {
                        debug!(from = index, "bitmap exhausted downward, entering extension");
                        SearchState::ExtensionNegative(min_internal - 1)
                    } else {
                        SearchState::Exhausted
                    }
                } else {
                    let cropped = word >> offset;
                    if let Ok(lsb) = least_significant_bit(cropped) {
                        return Ok(Some(index + lsb as i64));
                    }
                    if extension.is_some() {
                        debug!(from = index, "bitmap exhausted upward, entering extension");
                        SearchState::ExtensionPositive(max_internal + 1)
                    } else {
                        SearchState::Exhausted
                    }
                }
            }
            SearchState::ExtensionNegative(index) => match extension {
                None => SearchState::Exhausted,
                Some(ext) if swap_for_y => match ext.next_set_bit(index, min_extension)? {
                    Some(found) => return Ok(Some(found)),
                    None => SearchState::Exhausted,
                },
                Some(ext) => match ext.next_set_bit(index, min_internal - 1)? {
                    Some(found) => return Ok(Some(found)),
                    None => {
                        debug!(from = index, "negative extension exhausted, re-entering bitmap");
                        SearchState::Internal(min_internal)
                    }
                },
            },
            SearchState::ExtensionPositive(index) => match extension {
                None => SearchState::Exhausted,
                Some(ext) if swap_for_y => match ext.next_set_bit(index, max_internal + 1)? {
                    Some(found) => return Ok(Some(found)),
                    None => {
                        debug!(from = index, "positive extension exhausted, re-entering bitmap");
                        SearchState::Internal(max_internal)
                    }
                },
                Some(ext) => match ext.next_set_bit(index, max_extension)? {
                    Some(found) => return Ok(Some(found)),
                    None => SearchState::Exhausted,
                },
            },
            SearchState::Exhausted => return Ok(None),
        };
    }
}
