//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SdkConfig (validated, immutable)
//!     → AdvancedSdk::new wires each section into its component
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new SDK instance picks up changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApiConfig, AuthConfig, CacheConfig, ObservabilityConfig, RetryConfig, SdkConfig,
    StorageConfig,
};
pub use validation::ValidationError;
