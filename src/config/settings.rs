//! Resolved, immutable settings for one run.

use alloy::primitives::{Address, U256};
use std::fmt;
use thiserror::Error;

use crate::quoting::{AmountStrategy, DecimalAmount, FeeScalar, FeeSchedule, QuoteResult};

/// Settings after validation. Built once per batch and never mutated.
#[derive(Debug, Clone)]
pub struct OperationSettings {
    /// Mint price in ether.
    pub mint_price: DecimalAmount,
    /// Destination gas price assumed when quoting the mint fee, in gwei.
    pub gas_price_for_mint: DecimalAmount,
    pub gas_for_mint: u64,
    /// Source gas price ceiling for bridging, in gwei.
    pub max_gas_in_gwei: DecimalAmount,
    pub bridge_amount: AmountStrategy,
    pub bridge: OperationNetwork,
    pub mint: OperationNetwork,
    pub target: MintTargetSpec,
}

/// Network selection for one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationNetwork {
    pub testnet: bool,
    pub fee_scalar: FeeScalar,
    pub bridge_contract: Address,
    pub minter_contract: Address,
}

impl OperationSettings {
    /// Fee inputs for an operation on `network`.
    ///
    /// Both operations quote what the mint will cost on the destination:
    /// bridging tops the destination up to exactly that requirement.
    pub fn fee_schedule(&self, network: &OperationNetwork) -> QuoteResult<FeeSchedule> {
        Ok(FeeSchedule {
            base_price: self.mint_price.to_wei()?,
            gas_price_for_op: self.gas_price_for_mint.gwei_to_wei()?,
            gas_units: self.gas_for_mint,
            scalar: network.fee_scalar,
        })
    }
}

/// Raised when the mint target cannot be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Malformed mint target: {0}")]
pub struct MalformedTarget(pub String);

/// Where to mint, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintTargetSpec {
    pub nft_contract: Option<String>,
    pub nft_url: Option<String>,
    pub nft_id: Option<String>,
}

/// A resolved collection and token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintTarget {
    pub collection: Address,
    pub token_id: U256,
}

impl fmt::Display for MintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.collection, self.token_id)
    }
}

impl MintTargetSpec {
    /// Resolve the collection and token id.
    ///
    /// `nft_url` wins over `nft_contract` when both are set; a locator without
    /// a token segment falls back to `nft_id`.
    pub fn resolve(&self) -> Result<MintTarget, MalformedTarget> {
        let (collection, locator_id) = match (&self.nft_url, &self.nft_contract) {
            (Some(locator), _) => parse_locator(locator)?,
            (None, Some(contract)) => (parse_address(contract)?, None),
            (None, None) => {
                return Err(MalformedTarget("neither nft_url nor nft_contract is set".to_string()))
            }
        };

        let id_text = locator_id
            .or_else(|| self.nft_id.clone())
            .ok_or_else(|| MalformedTarget("nft_id is not set".to_string()))?;
        let token_id = parse_token_id(&id_text)?;

        Ok(MintTarget {
            collection,
            token_id,
        })
    }
}

/// Parse `…/collect/<network>:<contract>[/<token id>]`.
fn parse_locator(locator: &str) -> Result<(Address, Option<String>), MalformedTarget> {
    let url = url::Url::parse(locator.trim())
        .map_err(|e| MalformedTarget(format!("'{}' is not a URL: {}", locator, e)))?;
    let mut segments = url
        .path_segments()
        .ok_or_else(|| MalformedTarget(format!("'{}' has no path", locator)))?
        .filter(|s| !s.is_empty());

    if !segments.by_ref().any(|s| s == "collect") {
        return Err(MalformedTarget(format!("'{}' has no collect segment", locator)));
    }
    let collection = segments
        .next()
        .ok_or_else(|| MalformedTarget(format!("'{}' is missing the collection", locator)))?;
    let contract = collection
        .rsplit_once(':')
        .map(|(_, contract)| contract)
        .unwrap_or(collection);

    Ok((parse_address(contract)?, segments.next().map(str::to_string)))
}

fn parse_address(text: &str) -> Result<Address, MalformedTarget> {
    text.trim()
        .parse()
        .map_err(|e| MalformedTarget(format!("invalid contract address '{}': {}", text, e)))
}

fn parse_token_id(text: &str) -> Result<U256, MalformedTarget> {
    U256::from_str_radix(text.trim(), 10)
        .map_err(|_| MalformedTarget(format!("invalid token id '{}'", text)))
}
