use crate::authority::{Authority, Protocol};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `[[authorities]]` entry of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub protocol: Protocol,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Suffix routed to this authority; absent or empty means catch-all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl AuthorityConfig {
    pub fn to_authority(&self) -> Authority {
        let authority = Authority::new(
            self.address.as_str(),
            self.port,
            self.protocol,
            Duration::from_secs(self.timeout_secs),
        );

        match self.domain.as_deref() {
            Some(domain) => authority.with_suffix(domain),
            None => authority,
        }
    }
}

fn default_port() -> u16 {
    53
}

fn default_timeout() -> u64 {
    2
}
