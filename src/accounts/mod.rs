//! Account ledger: validated accounts and their durable flags.
//!
//! # Data Flow
//! ```text
//! accounts.json
//!     → store.rs (read, validate every row)
//!     → Vec<Account> (ledger order or shuffled)
//!     → batch runner
//!     → store.rs clear_flag (after a confirmed success only)
//! ```

pub mod store;
pub mod types;

pub use store::{AccountStore, JsonAccountStore, MemoryAccountStore};
pub use types::{elide, Account, AccountId, AccountRecord, Flag, SecretKey, StoreError, StoreResult};
