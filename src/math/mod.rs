pub mod bin_array_bitmap;
pub mod bit_math;
pub mod fee_math;
pub mod math_helpers;
pub mod price_math;
pub mod swap_math;
