//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse, overlay TMRW_* environment)
//!     → validation.rs (semantic checks)
//!     → SkillConfig (validated, immutable)
//!     → contracts.rs (address book with overrides)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Environment lookups go through a closure so tests never mutate process state

pub mod contracts;
pub mod loader;
pub mod schema;
pub mod validation;

pub use contracts::{ContractBook, ContractName, ProposalContractType};
pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, ChainsConfig, HttpConfig, ObservabilityConfig, SkillConfig};
