//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, amount strategy resolution)
//!     → OperationSettings (validated, immutable)
//!     → passed by reference to every orchestrator in the batch
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once resolved; a batch never sees a change
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadedConfig};
pub use schema::AppConfig;
pub use settings::{MalformedTarget, MintTarget, MintTargetSpec, OperationNetwork, OperationSettings};
pub use validation::{resolve_settings, validate_config, ValidationError};
