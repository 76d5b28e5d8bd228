//! Exact decimal amounts, fee quotes and unit conversion.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimals of the native currency (wei per ether = 10^18).
pub const ETHER_DECIMALS: u8 = 18;

/// Decimals of a gwei amount expressed in wei.
pub const GWEI_DECIMALS: u8 = 9;

/// Errors raised by pure pricing computations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// A configured or computed value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A humanized amount fell below zero.
    #[error("Humanized amount {center} - {offset} is negative")]
    NegativeAmount { center: String, offset: String },
}

/// Result type for pricing operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// A non-negative decimal amount that remembers how many fractional digits
/// it was written with.
///
/// `"0.00005"` is stored as `scaled = 5`, `decimals = 5`. The precision is
/// what the humanizer rounds its output to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct DecimalAmount {
    scaled: u128,
    decimals: u8,
}

impl DecimalAmount {
    /// Build an amount from its scaled integer and precision.
    pub const fn new(scaled: u128, decimals: u8) -> Self {
        Self { scaled, decimals }
    }

    /// The zero amount with no fractional digits.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// The value multiplied by `10^decimals`.
    pub fn scaled(&self) -> u128 {
        self.scaled
    }

    /// Number of fractional digits.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.scaled == 0
    }

    /// Re-express the amount with `decimals` fractional digits.
    ///
    /// Only widening is exact; narrowing returns `None` if digits would be lost.
    pub fn rescale(&self, decimals: u8) -> Option<u128> {
        if decimals >= self.decimals {
            let factor = 10u128.checked_pow(u32::from(decimals - self.decimals))?;
            self.scaled.checked_mul(factor)
        } else {
            let factor = 10u128.checked_pow(u32::from(self.decimals - decimals))?;
            (self.scaled % factor == 0).then(|| self.scaled / factor)
        }
    }

    /// Convert into integer base units of a currency with `unit_decimals`.
    pub fn to_units(&self, unit_decimals: u8) -> QuoteResult<U256> {
        if self.decimals > unit_decimals {
            return Err(QuoteError::InvalidArgument(format!(
                "{} has more than {} decimal places",
                self, unit_decimals
            )));
        }
        let factor = U256::from(10u8).pow(U256::from(unit_decimals - self.decimals));
        U256::from(self.scaled)
            .checked_mul(factor)
            .ok_or_else(|| QuoteError::InvalidArgument(format!("{} overflows", self)))
    }

    /// Convert an ether-denominated amount into wei.
    pub fn to_wei(&self) -> QuoteResult<U256> {
        self.to_units(ETHER_DECIMALS)
    }

    /// Convert a gwei-denominated amount into wei.
    pub fn gwei_to_wei(&self) -> QuoteResult<U256> {
        self.to_units(GWEI_DECIMALS)
    }
}

impl Default for DecimalAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for DecimalAmount {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(QuoteError::InvalidArgument("empty amount".to_string()));
        }
        if text.starts_with('-') {
            return Err(QuoteError::InvalidArgument(format!("negative amount '{}'", text)));
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(QuoteError::InvalidArgument(format!("malformed amount '{}'", text)));
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(QuoteError::InvalidArgument(format!("malformed amount '{}'", text)));
        }
        if fraction.len() > usize::from(ETHER_DECIMALS) {
            return Err(QuoteError::InvalidArgument(format!(
                "amount '{}' has more than {} decimal places",
                text, ETHER_DECIMALS
            )));
        }

        let overflow = || QuoteError::InvalidArgument(format!("amount '{}' is too large", text));
        let decimals = fraction.len() as u8;
        let whole_value: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| overflow())? };
        let fraction_value: u128 = if fraction.is_empty() { 0 } else { fraction.parse().map_err(|_| overflow())? };
        let scaled = whole_value
            .checked_mul(10u128.pow(u32::from(decimals)))
            .and_then(|v| v.checked_add(fraction_value))
            .ok_or_else(overflow)?;

        Ok(Self { scaled, decimals })
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.scaled);
        }
        let factor = 10u128.pow(u32::from(self.decimals));
        write!(
            f,
            "{}.{:0width$}",
            self.scaled / factor,
            self.scaled % factor,
            width = usize::from(self.decimals)
        )
    }
}

impl From<DecimalAmount> for String {
    fn from(amount: DecimalAmount) -> Self {
        amount.to_string()
    }
}

/// Accepted config representations: `"0.001"`, `18`, or `0.001`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl TryFrom<AmountRepr> for DecimalAmount {
    type Error = QuoteError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Text(s) => s.parse(),
            AmountRepr::Integer(n) => Ok(Self::new(u128::from(n), 0)),
            // f64 Display never uses exponent notation, so this keeps the written digits.
            AmountRepr::Float(x) => x.to_string().parse(),
        }
    }
}

/// Render an integer amount of base units with trailing zeros trimmed.
pub fn format_units(value: U256, unit_decimals: u8) -> String {
    let factor = U256::from(10u8).pow(U256::from(unit_decimals));
    let whole = value / factor;
    let fraction = value % factor;
    if fraction.is_zero() {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction.to_string(), width = usize::from(unit_decimals));
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Render wei as ether.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Render a wei gas price as gwei.
pub fn format_gwei(wei: u128) -> String {
    format_units(U256::from(wei), GWEI_DECIMALS)
}

/// Destination-network fee required for one operation, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Value transferred by the operation itself (mint price; zero for bridge-only).
    pub base: U256,
    /// Execution gas on the destination network.
    pub execution: U256,
    /// Data-availability charge derived from the source-network gas price.
    pub data: U256,
}

impl FeeQuote {
    /// Total fee in wei.
    pub fn total(&self) -> U256 {
        self.base + self.execution + self.data
    }
}

impl fmt::Display for FeeQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} eth", format_ether(self.total()))
    }
}
