use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - bin id out of bounds")]
    BinIdOutOfBounds,
    #[error("State error - bin array index {0} outside the bitmap range")]
    BinArrayIndexOutOfBounds(i64),
    #[error("State error - price out of bounds")]
    PriceOutOfBounds,
    #[error("State error - bin {bin_id} is not part of bin array {index}")]
    BinNotInArray { bin_id: i32, index: i64 },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - amount is 0")]
    AmountIsZero,
    #[error("Swap error - insufficient liquidity in bin arrays")]
    InsufficientLiquidity,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityError {
    #[error("Liquidity error - invalid strategy parameters")]
    InvalidStrategyParameters,
    #[error("Liquidity error - no liquidity to add")]
    NoLiquidityToAdd,
    #[error("Liquidity error - discontinuous bin id range")]
    DiscontinuousRange,
    #[error("Liquidity error - seed min price is below the active bin price")]
    SeedPriceBelowActivePrice,
    #[error("Liquidity error - price range too small")]
    PriceRangeTooSmall,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Parameter error - base factor overflows u16")]
    ParameterOverflow,
    #[error("Parameter error - base factor underflows to 0")]
    ParameterUnderflow,
    #[error("Parameter error - fee bps has no exact base factor for this bin step")]
    InexactBaseFactor,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),

    #[error(transparent)]
    LiquidityError(#[from] crate::error::LiquidityError),

    #[error(transparent)]
    ParameterError(#[from] crate::error::ParameterError),
}
