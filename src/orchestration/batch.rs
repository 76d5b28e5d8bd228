//! Batch runner: walk the ledger one account at a time.
//!
//! # Responsibilities
//! - Filter accounts to those with a pending step for the operation kind
//! - Open ledger clients per account (each account's own proxy)
//! - Clear and persist a flag right after its step succeeds
//! - Halt the whole batch on the first account that does not succeed
//!
//! # Design Decisions
//! - Strictly sequential: funds-moving steps never race on nonces
//! - An orchestrator error is logged and halts like any other failure

use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::accounts::{Account, AccountId, AccountStore, Flag, StoreResult};
use crate::blockchain::{LedgerConnector, NetworkRole};
use crate::config::OperationSettings;
use crate::lifecycle::Cancellation;
use crate::observability::{metrics, AuditLog};
use crate::orchestration::bridge::bridge_account;
use crate::orchestration::context::{StepContext, Timing};
use crate::orchestration::mint::mint_account;
use crate::orchestration::outcome::{
    FailureReason, OperationKind, OperationOutcome, OrchestrationError,
};

/// Outcome of one step for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub account: AccountId,
    pub subject: String,
    pub step: Flag,
    pub outcome: OperationOutcome,
}

/// Why a batch stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    pub account: AccountId,
    pub subject: String,
    pub step: Flag,
    pub reason: String,
}

/// Everything a batch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Correlates every log line of one run.
    pub run_id: Uuid,
    pub kind: OperationKind,
    pub steps: Vec<StepReport>,
    /// Accounts with no pending step for this kind.
    pub skipped: usize,
    pub halted: Option<Halt>,
}

impl BatchReport {
    fn new(kind: OperationKind) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind,
            steps: Vec::new(),
            skipped: 0,
            halted: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }

    /// Accounts that reached at least one step.
    pub fn processed(&self) -> usize {
        let mut ids: Vec<AccountId> = self.steps.iter().map(|s| s.account).collect();
        ids.dedup();
        ids.len()
    }

    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_success()).count()
    }
}

/// Order in which accounts are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOrder {
    Ledger,
    Shuffled,
}

/// Runs one operation kind over the account ledger.
pub struct BatchRunner<'a, C, S: ?Sized> {
    connector: &'a C,
    store: &'a S,
    settings: &'a OperationSettings,
    audit: &'a dyn AuditLog,
    cancel: Cancellation,
    timing: Timing,
    order: AccountOrder,
    rng: StdRng,
}

impl<'a, C, S> BatchRunner<'a, C, S>
where
    C: LedgerConnector,
    S: AccountStore + ?Sized,
{
    pub fn new(
        connector: &'a C,
        store: &'a S,
        settings: &'a OperationSettings,
        audit: &'a dyn AuditLog,
        timing: Timing,
    ) -> Self {
        Self {
            connector,
            store,
            settings,
            audit,
            cancel: Cancellation::never(),
            timing,
            order: AccountOrder::Shuffled,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_order(mut self, order: AccountOrder) -> Self {
        self.order = order;
        self
    }

    /// Fix the seed used for shuffling and amount humanization.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Load the ledger and run `kind` over it.
    pub async fn run_batch(&mut self, kind: OperationKind) -> StoreResult<BatchReport> {
        let accounts = match self.order {
            AccountOrder::Ledger => self.store.load_all()?,
            AccountOrder::Shuffled => self.store.load_shuffled(&mut self.rng)?,
        };
        Ok(self.run_accounts(accounts, kind).await)
    }

    /// Run `kind` over `accounts` in the given order.
    pub async fn run_accounts(&mut self, accounts: Vec<Account>, kind: OperationKind) -> BatchReport {
        let mut report = BatchReport::new(kind);
        self.audit.banner(kind.start_banner());
        tracing::info!(run_id = %report.run_id, operation = %kind, accounts = accounts.len(), "Batch started");

        'accounts: for mut account in accounts {
            let pending: Vec<Flag> = kind
                .steps()
                .iter()
                .copied()
                .filter(|step| account.needs(*step))
                .collect();
            if pending.is_empty() {
                report.skipped += 1;
                continue;
            }

            for step in pending {
                let subject = account.subject();
                let outcome = if self.cancel.is_cancelled() {
                    OperationOutcome::Failed(FailureReason::Cancelled)
                } else {
                    match self.run_step(&account, step).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            self.audit.error(&subject, &e.to_string());
                            OperationOutcome::Failed(FailureReason::Unexpected(e.to_string()))
                        }
                    }
                };
                metrics::record_outcome(step.as_str(), outcome.label());

                let mut halt_reason = (!outcome.is_success()).then(|| outcome.to_string());
                if outcome.is_success() {
                    match self.store.clear_flag(account.id, step) {
                        Ok(updated) => {
                            account = updated;
                            self.audit.info(&subject, &format!("Account {} turned off.", step));
                        }
                        Err(e) => {
                            self.audit.error(&subject, &format!("Failed to persist ledger: {}", e));
                            halt_reason = Some(format!("ledger persist failed: {}", e));
                        }
                    }
                }

                report.steps.push(StepReport {
                    account: account.id,
                    subject: subject.clone(),
                    step,
                    outcome,
                });

                if let Some(reason) = halt_reason {
                    tracing::error!(
                        run_id = %report.run_id,
                        operation = %kind,
                        account = %subject,
                        step = %step,
                        reason = %reason,
                        "Batch halted"
                    );
                    report.halted = Some(Halt {
                        account: account.id,
                        subject,
                        step,
                        reason,
                    });
                    break 'accounts;
                }
            }
        }

        if report.is_complete() {
            self.audit.banner(kind.finish_banner());
        } else {
            self.audit.banner("Batch stopped. Investigate the account above before rerunning.");
        }
        tracing::info!(
            run_id = %report.run_id,
            operation = %kind,
            processed = report.processed(),
            succeeded = report.succeeded(),
            skipped = report.skipped,
            halted = report.halted.is_some(),
            "Batch finished"
        );
        report
    }

    async fn run_step(&mut self, account: &Account, step: Flag) -> Result<OperationOutcome, OrchestrationError> {
        let network = match step {
            Flag::Bridge => &self.settings.bridge,
            Flag::Mint => &self.settings.mint,
        };
        let proxy = account.proxy.as_ref();
        let source = self
            .connector
            .connect(NetworkRole::Source, network.testnet, proxy)
            .await?;
        let destination = self
            .connector
            .connect(NetworkRole::Destination, network.testnet, proxy)
            .await?;

        let ctx = StepContext::new(account, self.settings, self.audit, &self.cancel, self.timing);
        match step {
            Flag::Bridge => bridge_account(&ctx, &source, &destination, &mut self.rng).await,
            Flag::Mint => mint_account(&ctx, &source, &destination).await,
        }
    }
}
