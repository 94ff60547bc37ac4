use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Suffix of the DNS root; every name falls under it.
const ROOT_SUFFIX: &str = ".";

/// Transport used to talk to an upstream authority or to accept client queries.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            other => Err(format!("unknown protocol '{}' (expected udp or tcp)", other)),
        }
    }
}

/// An upstream DNS server answering for a domain suffix, or for everything
/// when it has no suffix (catch-all).
///
/// Immutable once built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub address: Arc<str>,
    pub port: u16,
    pub protocol: Protocol,
    pub timeout: Duration,
    pub domain_suffix: Option<Arc<str>>,
}

impl Authority {
    pub fn new(
        address: impl Into<Arc<str>>,
        port: u16,
        protocol: Protocol,
        timeout: Duration,
    ) -> Self {
        Self {
            address: address.into(),
            port,
            protocol,
            timeout,
            domain_suffix: None,
        }
    }

    /// Restricts this authority to names ending with `suffix`.
    ///
    /// The trailing root dot is dropped; an empty suffix keeps the authority
    /// a catch-all. The bare root `"."` stays a suffix that every name matches.
    pub fn with_suffix(mut self, suffix: impl AsRef<str>) -> Self {
        let raw = suffix.as_ref();
        let suffix = raw.trim_end_matches('.');
        self.domain_suffix = match (raw.is_empty(), suffix.is_empty()) {
            (true, _) => None,
            (false, true) => Some(Arc::from(ROOT_SUFFIX)),
            (false, false) => Some(Arc::from(suffix)),
        };
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.domain_suffix.is_none()
    }

    /// Plain string-suffix test, no wildcard or label-boundary semantics.
    /// Catch-all authorities never match here.
    pub fn matches_suffix(&self, name: &str) -> bool {
        match self.domain_suffix.as_deref() {
            Some(ROOT_SUFFIX) => true,
            Some(suffix) => name.ends_with(suffix),
            None => false,
        }
    }

    /// `address:port`, bracketing IPv6 literals.
    pub fn endpoint(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.endpoint())
    }
}
