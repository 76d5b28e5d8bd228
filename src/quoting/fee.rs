//! Destination-network fee estimation.
//!
//! The destination is an optimistic rollup: on top of execution gas and the
//! transferred value it charges a data fee proportional to the source-network
//! gas price. On mainnet that fee is `source_gas_price * 4000 * 0.684`
//! (4000 gas of calldata times the rollup's fee scalar). Testnets use a 1:1
//! scalar with one of two calldata presets.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::quoting::types::{FeeQuote, QuoteError, QuoteResult};

/// Calldata gas charged by the rollup per operation on mainnet.
pub const MAINNET_DATA_GAS: u64 = 4000;

/// Mainnet fee scalar 0.684 in thousandths.
pub const MAINNET_FEE_SCALAR_MILLIS: u64 = 684;

/// Testnet calldata gas applied to the live source gas price.
pub const TESTNET_SCALAR_A: u64 = 6000;

/// Testnet calldata gas applied to a fixed source gas price floor.
pub const TESTNET_SCALAR_B: u64 = 7000;

/// Fixed source gas price used with [`TESTNET_SCALAR_B`] (4 gwei).
pub const TESTNET_GAS_PRICE_FLOOR_WEI: u128 = 4_000_000_000;

/// Which testnet data-fee preset an operation uses.
///
/// The two presets disagree for the same destination network; both are kept
/// until the correct one is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestnetFeePreset {
    /// `source_gas_price * 6000`.
    #[default]
    ScalarA,
    /// `4 gwei * 7000`.
    ScalarB,
}

/// Data-fee rule applied by [`estimate_fee`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeScalar {
    Mainnet,
    TestnetScalarA,
    TestnetScalarB,
}

impl FeeScalar {
    /// Select the rule for a network.
    pub fn for_network(is_testnet: bool, preset: TestnetFeePreset) -> Self {
        match (is_testnet, preset) {
            (false, _) => FeeScalar::Mainnet,
            (true, TestnetFeePreset::ScalarA) => FeeScalar::TestnetScalarA,
            (true, TestnetFeePreset::ScalarB) => FeeScalar::TestnetScalarB,
        }
    }

    /// Whether the rule reads the live source-network gas price.
    pub fn needs_source_gas_price(&self) -> bool {
        !matches!(self, FeeScalar::TestnetScalarB)
    }

    fn data_fee(&self, source_gas_price: u128) -> U256 {
        let price = U256::from(source_gas_price);
        match self {
            FeeScalar::Mainnet => {
                price * U256::from(MAINNET_DATA_GAS) * U256::from(MAINNET_FEE_SCALAR_MILLIS)
                    / U256::from(1000u64)
            }
            FeeScalar::TestnetScalarA => price * U256::from(TESTNET_SCALAR_A),
            FeeScalar::TestnetScalarB => {
                U256::from(TESTNET_GAS_PRICE_FLOOR_WEI) * U256::from(TESTNET_SCALAR_B)
            }
        }
    }
}

/// Compute the destination fee for one operation.
///
/// `fee = base_price + gas_price_for_op * gas_units + data_fee(source_gas_price)`,
/// all in wei. Pure; fails only if the result does not fit in 256 bits.
pub fn estimate_fee(
    base_price: U256,
    gas_price_for_op: U256,
    gas_units: u64,
    source_gas_price: u128,
    scalar: FeeScalar,
) -> QuoteResult<FeeQuote> {
    let overflow = || QuoteError::InvalidArgument("fee computation overflows".to_string());

    let execution = gas_price_for_op
        .checked_mul(U256::from(gas_units))
        .ok_or_else(overflow)?;
    let data = scalar.data_fee(source_gas_price);

    base_price
        .checked_add(execution)
        .and_then(|v| v.checked_add(data))
        .ok_or_else(overflow)?;

    Ok(FeeQuote {
        base: base_price,
        execution,
        data,
    })
}

/// Fee inputs fixed for one operation kind, quoted against a live gas price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub base_price: U256,
    pub gas_price_for_op: U256,
    pub gas_units: u64,
    pub scalar: FeeScalar,
}

impl FeeSchedule {
    /// Quote the fee at the given source-network gas price (wei).
    pub fn quote(&self, source_gas_price: u128) -> QuoteResult<FeeQuote> {
        estimate_fee(
            self.base_price,
            self.gas_price_for_op,
            self.gas_units,
            source_gas_price,
            self.scalar,
        )
    }
}
