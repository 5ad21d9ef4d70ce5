//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or JSON by extension)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, rewrite rules compiled once)
//!     → ProxyConfig (validated, immutable)
//!     → RewriteConfig handed to the rewrite layer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ProxyConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
pub use schema::{Rewrite, RewriteConfig, RewriteMiddlewareConfig};
