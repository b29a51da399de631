//! Bin-based liquidity (DLMM) math and swap simulation in pure Rust.
//!
//! This crate exposes:
//! - Low‑level math primitives (`math::*`) for Q64.64 bin prices, fees,
//!   per-bin swaps and the bin array bitmap.
//! - An in‑memory [`LbPair`] snapshot that quotes exact-in and exact-out
//!   swaps bin by bin against caller supplied bin arrays.
//! - Liquidity shape helpers (`liquidity::*`) turning a strategy and a bin
//!   range into per-bin deposit amounts.
//! - Seeding helpers (`seed`) that compress dense per-bin amounts into the
//!   32-bit width used by bulk deposits.
//!
//! Nothing here performs I/O or mutates the snapshots it is handed.
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use dlmm_swap_math::{math::price_math, ONE};
//!
//! let price = price_math::get_q_price_from_id(0, 25).unwrap();
//! assert_eq!(price, ONE);
//! let bin_id = price_math::get_id_from_q_price(price, 25, true).unwrap();
//! assert_eq!(bin_id, 0);
//! ```
//!
//! ## Quoting a swap
//! ```no_run
//! use dlmm_swap_math::{
//!     pool::{bin_array::BinArray, swap::SwapQuoteParams},
//!     FastMap, LbPair, StaticParameters,
//! };
//!
//! let parameters = StaticParameters {
//!     base_factor: 10_000,
//!     protocol_share: 500,
//!     ..Default::default()
//! };
//! let mut pair = LbPair::new(0, 10, parameters);
//!
//! let mut bin_array = BinArray::new(0);
//! bin_array.bins[0].amount_x = 1_000_000;
//! bin_array.bins[0].amount_y = 500_000;
//! pair.set_bin_array_initialized(0).unwrap();
//!
//! let mut bin_arrays = FastMap::default();
//! bin_arrays.insert(bin_array.index, bin_array);
//!
//! let params = SwapQuoteParams::new(100_000, true).with_slippage_bps(50);
//! let quote = pair.swap_quote(params, &bin_arrays).unwrap();
//! println!("out: {}, fee: {}", quote.out_amount, quote.fee);
//! ```

pub use alloy_primitives::U256;
pub use rust_decimal::Decimal;

pub mod error;
mod hash;
pub mod liquidity;
pub mod math;
pub mod seed;

pub use hash::{FastMap, FastSet};

pub mod pool;

pub use math::fee_math::{StaticParameters, VariableParameters};
pub use pool::lb_pair::LbPair;

/// Fractional bits of every Q64.64 price.
pub const SCALE_OFFSET: u8 = 64;
/// 1.0 in Q64.64.
pub const ONE: u128 = 1u128 << SCALE_OFFSET;

pub const BASIS_POINT_MAX: u128 = 10_000;
pub const FEE_PRECISION: u128 = 1_000_000_000;
/// Total fee cap, 10% of `FEE_PRECISION`.
pub const MAX_FEE_RATE: u128 = 100_000_000;

pub const MAX_BIN_PER_ARRAY: usize = 70;
pub const MAX_BIN_PER_POSITION: i64 = 70;

/// Half-width of the array-index window covered by the pair's own bitmap.
pub const BIN_ARRAY_BITMAP_SIZE: i64 = 512;
/// Number of 512-bit chunks on each side of the bitmap extension.
pub const EXTENSION_BINARRAY_BITMAP_SIZE: usize = 12;

/// Exclusive bound on `|bin_id|` accepted by [`math::price_math::pow`].
pub const MAX_EXPONENTIAL: u32 = 0x80000;

/// Largest compressed per-bin amount accepted by bulk seeding.
pub const SEED_BIN_CAP: u64 = u32::MAX as u64;
