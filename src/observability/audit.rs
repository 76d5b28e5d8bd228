//! Operator-visible audit trail.
//!
//! Every state transition and terminal outcome of an account goes through an
//! [`AuditLog`] with the elided account address as its subject.

/// Sink for per-account audit lines.
pub trait AuditLog: Send + Sync {
    fn info(&self, subject: &str, message: &str);
    fn warning(&self, subject: &str, message: &str);
    fn error(&self, subject: &str, message: &str);
    /// A run-level line with no account subject.
    fn banner(&self, message: &str);
}

/// Writes audit lines as `tracing` events under the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditLog for TracingAudit {
    fn info(&self, subject: &str, message: &str) {
        tracing::info!(target: "bridge_mint::audit", account = subject, "{}", message);
    }

    fn warning(&self, subject: &str, message: &str) {
        tracing::warn!(target: "bridge_mint::audit", account = subject, "{}", message);
    }

    fn error(&self, subject: &str, message: &str) {
        tracing::error!(target: "bridge_mint::audit", account = subject, "{}", message);
    }

    fn banner(&self, message: &str) {
        tracing::info!(target: "bridge_mint::audit", "{}", message);
    }
}
