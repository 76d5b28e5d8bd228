//! Per-account inputs shared by the orchestrators.

use std::time::Duration;

use crate::accounts::Account;
use crate::config::schema::PollingConfig;
use crate::config::OperationSettings;
use crate::lifecycle::Cancellation;
use crate::observability::AuditLog;

/// Poll intervals and the receipt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub gas_poll: Duration,
    pub balance_poll: Duration,
    pub receipt_timeout: Duration,
}

impl Timing {
    pub fn from_polling(polling: &PollingConfig) -> Self {
        Self {
            gas_poll: Duration::from_secs(polling.gas_poll_secs),
            balance_poll: Duration::from_secs(polling.balance_poll_secs),
            receipt_timeout: Duration::from_secs(polling.receipt_timeout_secs),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from_polling(&PollingConfig::default())
    }
}

/// Everything an orchestrator needs besides its ledger clients.
pub struct StepContext<'a> {
    pub account: &'a Account,
    pub settings: &'a OperationSettings,
    pub audit: &'a dyn AuditLog,
    pub cancel: &'a Cancellation,
    pub timing: Timing,
    /// Elided address, computed once.
    pub subject: String,
}

impl<'a> StepContext<'a> {
    pub fn new(
        account: &'a Account,
        settings: &'a OperationSettings,
        audit: &'a dyn AuditLog,
        cancel: &'a Cancellation,
        timing: Timing,
    ) -> Self {
        Self {
            subject: account.subject(),
            account,
            settings,
            audit,
            cancel,
            timing,
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.audit.info(&self.subject, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.audit.warning(&self.subject, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.audit.error(&self.subject, message.as_ref());
    }
}
