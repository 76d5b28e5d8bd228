//! Pure pricing: destination fees and humanized amounts.
//!
//! # Data Flow
//! ```text
//! OperationSettings (mint price, gas budget, presets)
//!     → fee.rs (FeeSchedule::quote(source gas price) → FeeQuote)
//!     → humanize.rs (AmountStrategy::draw(rng) → DecimalAmount)
//! ```
//!
//! Nothing here performs I/O.

pub mod fee;
pub mod humanize;
pub mod types;

pub use fee::{estimate_fee, FeeScalar, FeeSchedule, TestnetFeePreset};
pub use humanize::{humanize, humanize_around, AmountStrategy};
pub use types::{DecimalAmount, FeeQuote, QuoteError, QuoteResult};
