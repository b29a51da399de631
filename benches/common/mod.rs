#![allow(dead_code)]

use criterion::{BenchmarkId, Criterion};
use dlmm_swap_math::liquidity::strategy::{StrategyType, to_amounts_both_side_by_strategy};
use dlmm_swap_math::liquidity::weight::{calculate_normal_distribution, calculate_spot_distribution};
use dlmm_swap_math::math::bin_array_bitmap::next_bin_array_index_with_liquidity;
use dlmm_swap_math::math::bit_math::{least_significant_bit, most_significant_bit};
use dlmm_swap_math::math::fee_math::{compute_fee, get_total_fee};
use dlmm_swap_math::math::math_helpers::{Rounding, mul_div, mul_shr, shl_div};
use dlmm_swap_math::math::price_math::{get_id_from_q_price, get_q_price_from_id};
use dlmm_swap_math::math::swap_math::swap_exact_in_quote_at_bin;
use dlmm_swap_math::pool::bin_array::BinArray;
use dlmm_swap_math::pool::swap::SwapQuoteParams;
use dlmm_swap_math::seed::compress_for_seeding;
use dlmm_swap_math::{FastMap, LbPair, SEED_BIN_CAP, StaticParameters, U256, VariableParameters};
use std::collections::BTreeMap;
use std::hint::black_box;

pub const BIN_STEP: u16 = 25;

pub fn parameters() -> StaticParameters {
    StaticParameters {
        base_factor: 10_000,
        filter_period: 30,
        decay_period: 600,
        reduction_factor: 5_000,
        variable_fee_control: 40_000,
        max_volatility_accumulator: 350_000,
        min_bin_id: -43690,
        max_bin_id: 43690,
        protocol_share: 500,
    }
}

/// Pool with `width` funded bins on each side of bin 0, Y below and X above.
pub fn funded_pool(width: i32) -> (LbPair, FastMap<i64, BinArray>) {
    let mut pair = LbPair::new(0, BIN_STEP, parameters());
    let mut bin_arrays: FastMap<i64, BinArray> = FastMap::default();

    for bin_id in -width..=width {
        let bin_array = bin_arrays
            .entry(BinArray::containing(bin_id).index)
            .or_insert_with(|| BinArray::containing(bin_id));
        let bin = bin_array.get_bin_mut(bin_id).expect("bin in array");
        if bin_id <= 0 {
            bin.amount_y = 1_000_000_000;
        }
        if bin_id >= 0 {
            bin.amount_x = 1_000_000_000;
        }
        bin.price = get_q_price_from_id(bin_id, BIN_STEP).expect("price in range");
        pair.set_bin_array_initialized(bin_array.index)
            .expect("index in bitmap");
    }
    (pair, bin_arrays)
}

pub fn bench_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_math");

    for bin_id in [-20_000, -1, 0, 1, 5_000, 20_000] {
        group.bench_with_input(BenchmarkId::new("get_q_price_from_id", bin_id), &bin_id, |b, &id| {
            b.iter(|| get_q_price_from_id(black_box(id), black_box(BIN_STEP)))
        });
    }

    let q_price = get_q_price_from_id(5_000, BIN_STEP).expect("price in range");
    group.bench_function("get_id_from_q_price", |b| {
        b.iter(|| get_id_from_q_price(black_box(q_price), black_box(BIN_STEP), true))
    });
    group.finish();
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("math_helpers");
    let price = get_q_price_from_id(1_234, BIN_STEP).expect("price in range");

    group.bench_function("mul_div", |b| {
        b.iter(|| mul_div(black_box(u64::MAX as u128), black_box(999_999), black_box(1_000_000_007), Rounding::Up))
    });
    group.bench_function("mul_shr", |b| {
        b.iter(|| mul_shr(black_box(1_000_000_000), black_box(price), 64, Rounding::Down))
    });
    group.bench_function("shl_div", |b| {
        b.iter(|| shl_div(black_box(1_000_000_000), black_box(price), 64, Rounding::Up))
    });
    group.finish();
}

pub fn bench_bit_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_math");
    let value = U256::from(1u64) << 200usize | U256::from(1u64) << 3usize;

    group.bench_function("most_significant_bit", |b| b.iter(|| most_significant_bit(black_box(value))));
    group.bench_function("least_significant_bit", |b| b.iter(|| least_significant_bit(black_box(value))));
    group.finish();
}

pub fn bench_bin_array_bitmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin_array_bitmap");
    let mut bitmap = [0u64; 16];
    // a single initialized array far below the start
    bitmap[0] = 1;

    group.bench_function("next_index_far_walk", |b| {
        b.iter(|| next_bin_array_index_with_liquidity(true, black_box(35_000), &bitmap, None))
    });
    group.finish();
}

pub fn bench_fee_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_math");
    let s = parameters();
    let v = VariableParameters {
        volatility_accumulator: 120_000,
        ..Default::default()
    };

    group.bench_function("get_total_fee", |b| b.iter(|| get_total_fee(black_box(BIN_STEP), &s, &v)));
    group.bench_function("compute_fee", |b| {
        b.iter(|| compute_fee(BIN_STEP, &s, &v, black_box(1_000_000_000)))
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_math");
    let (_, bin_arrays) = funded_pool(1);
    let bin = bin_arrays[&0i64].get_bin(0).expect("bin in array");
    let price = get_q_price_from_id(0, BIN_STEP).expect("price in range");
    let s = parameters();
    let v = VariableParameters::default();

    for amount in [1_000u64, 500_000_000, 5_000_000_000] {
        group.bench_with_input(BenchmarkId::new("exact_in_at_bin", amount), &amount, |b, &amount| {
            b.iter(|| swap_exact_in_quote_at_bin(bin, price, BIN_STEP, &s, &v, black_box(amount), true))
        });
    }
    group.finish();
}

pub fn bench_swap_quote(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_quote");
    let (pair, bin_arrays) = funded_pool(300);

    // each funded bin holds 1e9, so the amount sets how many bins are crossed
    for bins_crossed in [1u64, 10, 100] {
        let params = SwapQuoteParams::new(bins_crossed * 1_000_000_000, true).with_partial_fill(true);
        group.bench_with_input(BenchmarkId::new("exact_in", bins_crossed), &params, |b, &params| {
            b.iter(|| pair.swap_quote(black_box(params), &bin_arrays))
        });
        group.bench_with_input(BenchmarkId::new("exact_out", bins_crossed), &params, |b, &params| {
            b.iter(|| pair.swap_quote_exact_out(black_box(params), &bin_arrays))
        });
    }
    group.bench_function("max_amount_out", |b| b.iter(|| pair.max_amount_out(black_box(true), &bin_arrays)));
    group.finish();
}

pub fn bench_liquidity(c: &mut Criterion) {
    let mut group = c.benchmark_group("liquidity");
    let bin_ids: Vec<i32> = (-34..=34).collect();

    group.bench_function("spot_distribution", |b| {
        b.iter(|| calculate_spot_distribution(black_box(0), &bin_ids))
    });
    group.bench_function("normal_distribution", |b| {
        b.iter(|| calculate_normal_distribution(black_box(0), &bin_ids))
    });
    group.bench_function("curve_balanced_amounts", |b| {
        b.iter(|| {
            to_amounts_both_side_by_strategy(
                0,
                BIN_STEP,
                -34,
                34,
                black_box(1_000_000_000),
                black_box(1_000_000_000),
                0,
                0,
                StrategyType::CurveBalanced,
            )
        })
    });
    group.finish();
}

pub fn bench_seed(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed");
    let amounts: BTreeMap<i32, u64> = (0..700).map(|i| (i, 1_000_000_000 + i as u64 * 7_919)).collect();

    group.bench_function("compress_for_seeding", |b| {
        b.iter(|| compress_for_seeding(black_box(&amounts), black_box(1_000_000), SEED_BIN_CAP))
    });
    group.finish();
}
