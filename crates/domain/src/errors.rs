use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No authority found for {0}")]
    NoAuthorityFound(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Upstream timeout waiting for {server}")]
    UpstreamTimeout { server: String },

    #[error("Upstream transport error with {server}: {reason}")]
    UpstreamTransport { server: String, reason: String },

    #[error("Failed to write response: {0}")]
    ResponseWrite(String),
}

impl DomainError {
    /// True for every failure that happens while exchanging with an authority.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomainName(_)
                | Self::InvalidDnsResponse(_)
                | Self::UpstreamTimeout { .. }
                | Self::UpstreamTransport { .. }
        )
    }
}
