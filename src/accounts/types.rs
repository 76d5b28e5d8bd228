//! Account records and their validated form.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::blockchain::{ProxySpec, Wallet};

/// Errors from the account ledger store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Ledger IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed account at row {row}: {reason}")]
    MalformedAccount { row: usize, reason: String },

    #[error("Unknown account {0}")]
    UnknownAccount(AccountId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Position of an account in the ledger file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub usize);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which pending operation a flag tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Bridge,
    Mint,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Bridge => "bridge",
            Flag::Mint => "mint",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorten an identifier to its first 6 and last 4 characters.
pub fn elide(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 10 {
        return text.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Signing key text. Formatting never reveals more than the elided form.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The full key. Only for signing and persistence.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&elide(&self.0))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", elide(&self.0))
    }
}

/// One row of the ledger file, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub address: String,
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub bridge: bool,
    pub mint: bool,
}

/// A validated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub address: Address,
    pub secret: SecretKey,
    pub proxy: Option<ProxySpec>,
    pub needs_bridge: bool,
    pub needs_mint: bool,
}

impl Account {
    /// Validate a stored row: the address parses, the key controls it and
    /// the proxy, if any, parses.
    pub fn from_record(row: usize, record: AccountRecord) -> StoreResult<Self> {
        let malformed = |reason: String| StoreError::MalformedAccount { row, reason };

        let address: Address = record
            .address
            .trim()
            .parse()
            .map_err(|_| malformed(format!("invalid address '{}'", record.address)))?;

        let wallet = Wallet::from_private_key(record.private_key.trim())
            .map_err(|_| malformed(format!("invalid private key for {}", elide(&address.to_string()))))?;
        if wallet.address() != address {
            return Err(malformed(format!(
                "private key does not control {}",
                elide(&address.to_string())
            )));
        }

        let proxy = match record.proxy.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(
                text.parse::<ProxySpec>()
                    .map_err(|e| malformed(format!("invalid proxy: {}", e)))?,
            ),
        };

        Ok(Self {
            id: AccountId(row),
            address,
            secret: SecretKey::new(record.private_key.trim()),
            proxy,
            needs_bridge: record.bridge,
            needs_mint: record.mint,
        })
    }

    pub fn to_record(&self) -> AccountRecord {
        AccountRecord {
            address: self.address.to_checksum(None),
            private_key: self.secret.expose().to_string(),
            proxy: self.proxy.as_ref().map(ProxySpec::url_form),
            bridge: self.needs_bridge,
            mint: self.needs_mint,
        }
    }

    /// Elided checksummed address used as the log subject.
    pub fn subject(&self) -> String {
        elide(&self.address.to_checksum(None))
    }

    pub fn needs(&self, flag: Flag) -> bool {
        match flag {
            Flag::Bridge => self.needs_bridge,
            Flag::Mint => self.needs_mint,
        }
    }

    pub fn clear(&mut self, flag: Flag) {
        match flag {
            Flag::Bridge => self.needs_bridge = false,
            Flag::Mint => self.needs_mint = false,
        }
    }

    /// Neither operation is pending.
    pub fn is_inert(&self) -> bool {
        !self.needs_bridge && !self.needs_mint
    }

    pub fn wallet(&self) -> crate::blockchain::BlockchainResult<Wallet> {
        Wallet::from_private_key(self.secret.expose())
    }
}
