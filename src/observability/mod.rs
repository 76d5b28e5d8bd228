//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrators and batch runner produce:
//!     → audit.rs (per-account audit lines, elided subject)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod audit;
pub mod logging;
pub mod metrics;

pub use audit::{AuditLog, TracingAudit};
