//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_mint_outcomes_total` (counter): account outcomes by operation, outcome
//! - `bridge_mint_transactions_total` (counter): broadcast transactions by network
//! - `bridge_mint_gas_polls_total` (counter): gas price checks above the ceiling
//! - `bridge_mint_balance_polls_total` (counter): destination balance checks while waiting
//! - `bridge_mint_ledger_persists_total` (counter): ledger rewrites
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - The Prometheus exporter is opt-in through `[observability]`

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "bridge_mint_outcomes_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_transaction(network: &'static str) {
    metrics::counter!("bridge_mint_transactions_total", "network" => network).increment(1);
}

pub fn record_gas_poll() {
    metrics::counter!("bridge_mint_gas_polls_total").increment(1);
}

pub fn record_balance_poll() {
    metrics::counter!("bridge_mint_balance_polls_total").increment(1);
}

pub fn record_persist() {
    metrics::counter!("bridge_mint_ledger_persists_total").increment(1);
}
