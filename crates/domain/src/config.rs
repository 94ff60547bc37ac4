pub mod authority;
pub mod cache;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;

pub use authority::AuthorityConfig;
pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
