//! Ferrous Relay Domain Layer
pub mod authority;
pub mod config;
pub mod errors;

pub use authority::{Authority, Protocol};
pub use config::{
    AuthorityConfig, CacheConfig, CliOverrides, Config, ConfigError, LogFormat, LoggingConfig,
    ServerConfig,
};
pub use errors::DomainError;
