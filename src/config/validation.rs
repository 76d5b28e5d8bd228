//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve the bridge amount strategy from the flat settings
//! - Validate value ranges (intervals > 0, min ≤ max, amounts representable in wei)
//! - Parse contract addresses and RPC URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<OperationSettings, Vec<ValidationError>>
//! - The mint target is checked per account at mint time, not here

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{AppConfig, EndpointConfig, NetworkSet, SettingsConfig};
use crate::config::settings::{MintTargetSpec, OperationNetwork, OperationSettings};
use crate::quoting::{AmountStrategy, DecimalAmount, FeeScalar};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("min_amount_for_bridge ({min}) exceeds max_amount_for_bridge ({max})")]
    InvertedRange { min: String, max: String },

    #[error("bridge amount is not configured: set min/max_amount_for_bridge or bridge_amount")]
    MissingBridgeAmount,

    #[error("{present} is set but {missing} is not")]
    IncompleteRange { present: String, missing: String },

    #[error("{field}: invalid address '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: String, value: String },
}

/// Validate the config without keeping the resolved settings.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    resolve_settings(config).map(|_| ())
}

/// Validate the config and resolve it into [`OperationSettings`].
pub fn resolve_settings(config: &AppConfig) -> Result<OperationSettings, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let settings = &config.settings;

    check_wei(&mut errors, "settings.mint_price", settings.mint_price, Unit::Ether);
    check_wei(&mut errors, "settings.gas_price_for_mint", settings.gas_price_for_mint, Unit::Gwei);
    check_wei(&mut errors, "settings.max_gas_in_gwei", settings.max_gas_in_gwei, Unit::Gwei);
    if settings.gas_for_mint == 0 {
        errors.push(ValidationError::NotPositive {
            field: "settings.gas_for_mint".to_string(),
        });
    }

    let bridge_amount = resolve_amount_strategy(settings, &mut errors);

    let positive = [
        ("rpc.timeout_secs", config.rpc.timeout_secs),
        ("polling.gas_poll_secs", config.polling.gas_poll_secs),
        ("polling.balance_poll_secs", config.polling.balance_poll_secs),
        ("polling.receipt_timeout_secs", config.polling.receipt_timeout_secs),
        ("polling.receipt_poll_secs", config.polling.receipt_poll_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NotPositive {
                field: field.to_string(),
            });
        }
    }

    if config.accounts.path.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            field: "accounts.path".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let bridge = resolve_network(
        &mut errors,
        config.networks.set(settings.is_testnet_bridge),
        network_label(settings.is_testnet_bridge),
        settings.is_testnet_bridge,
        FeeScalar::for_network(settings.is_testnet_bridge, settings.testnet_fee_preset_bridge),
    );
    let mint = if settings.is_testnet_mint == settings.is_testnet_bridge {
        bridge.map(|network| OperationNetwork {
            fee_scalar: FeeScalar::for_network(settings.is_testnet_mint, settings.testnet_fee_preset_mint),
            ..network
        })
    } else {
        resolve_network(
            &mut errors,
            config.networks.set(settings.is_testnet_mint),
            network_label(settings.is_testnet_mint),
            settings.is_testnet_mint,
            FeeScalar::for_network(settings.is_testnet_mint, settings.testnet_fee_preset_mint),
        )
    };

    match (bridge_amount, bridge, mint) {
        (Some(bridge_amount), Some(bridge), Some(mint)) if errors.is_empty() => Ok(OperationSettings {
            mint_price: settings.mint_price,
            gas_price_for_mint: settings.gas_price_for_mint,
            gas_for_mint: settings.gas_for_mint,
            max_gas_in_gwei: settings.max_gas_in_gwei,
            bridge_amount,
            bridge,
            mint,
            target: MintTargetSpec {
                nft_contract: settings.nft_contract.clone(),
                nft_url: settings.nft_url.clone(),
                nft_id: settings.nft_id.clone(),
            },
        }),
        _ => Err(errors),
    }
}

#[derive(Clone, Copy)]
enum Unit {
    Ether,
    Gwei,
}

fn check_wei(errors: &mut Vec<ValidationError>, field: &str, amount: DecimalAmount, unit: Unit) {
    let converted = match unit {
        Unit::Ether => amount.to_wei(),
        Unit::Gwei => amount.gwei_to_wei(),
    };
    if let Err(e) = converted {
        errors.push(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: e.to_string(),
        });
    }
}

/// min/max take precedence over bridge_amount ± accuracy.
fn resolve_amount_strategy(
    settings: &SettingsConfig,
    errors: &mut Vec<ValidationError>,
) -> Option<AmountStrategy> {
    match (settings.min_amount_for_bridge, settings.max_amount_for_bridge) {
        (Some(min), Some(max)) => {
            check_wei(errors, "settings.min_amount_for_bridge", min, Unit::Ether);
            check_wei(errors, "settings.max_amount_for_bridge", max, Unit::Ether);
            let decimals = min.decimals().max(max.decimals());
            match (min.rescale(decimals), max.rescale(decimals)) {
                (Some(low), Some(high)) if low > high => {
                    errors.push(ValidationError::InvertedRange {
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                    None
                }
                _ => Some(AmountStrategy::Range { min, max }),
            }
        }
        (Some(_), None) => {
            errors.push(ValidationError::IncompleteRange {
                present: "settings.min_amount_for_bridge".to_string(),
                missing: "settings.max_amount_for_bridge".to_string(),
            });
            None
        }
        (None, Some(_)) => {
            errors.push(ValidationError::IncompleteRange {
                present: "settings.max_amount_for_bridge".to_string(),
                missing: "settings.min_amount_for_bridge".to_string(),
            });
            None
        }
        (None, None) => match settings.bridge_amount {
            Some(center) => {
                let accuracy = settings
                    .accuracy_in_amount_for_bridge
                    .unwrap_or_else(DecimalAmount::zero);
                check_wei(errors, "settings.bridge_amount", center, Unit::Ether);
                check_wei(errors, "settings.accuracy_in_amount_for_bridge", accuracy, Unit::Ether);
                Some(AmountStrategy::Around { center, accuracy })
            }
            None => {
                errors.push(ValidationError::MissingBridgeAmount);
                None
            }
        },
    }
}

fn network_label(testnet: bool) -> &'static str {
    if testnet {
        "networks.testnet"
    } else {
        "networks.mainnet"
    }
}

fn resolve_network(
    errors: &mut Vec<ValidationError>,
    set: &NetworkSet,
    label: &str,
    testnet: bool,
    fee_scalar: FeeScalar,
) -> Option<OperationNetwork> {
    check_endpoint(errors, &format!("{}.source", label), &set.source);
    check_endpoint(errors, &format!("{}.destination", label), &set.destination);

    let bridge_contract = parse_address(errors, &format!("{}.bridge_contract", label), &set.bridge_contract);
    let minter_contract = parse_address(errors, &format!("{}.minter_contract", label), &set.minter_contract);

    Some(OperationNetwork {
        testnet,
        fee_scalar,
        bridge_contract: bridge_contract?,
        minter_contract: minter_contract?,
    })
}

fn check_endpoint(errors: &mut Vec<ValidationError>, label: &str, endpoint: &EndpointConfig) {
    let urls = std::iter::once(&endpoint.rpc_url).chain(endpoint.failover_urls.iter());
    for url in urls {
        if url::Url::parse(url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: format!("{}.rpc_url", label),
                value: url.clone(),
            });
        }
    }
    if endpoint.chain_id == 0 {
        errors.push(ValidationError::NotPositive {
            field: format!("{}.chain_id", label),
        });
    }
}

fn parse_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) -> Option<Address> {
    match value.trim().parse::<Address>() {
        Ok(address) => Some(address),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field: field.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}
