use ferrous_relay_application::services::{AuthorityDirectory, QueryCache};
use ferrous_relay_application::use_cases::{HandleDnsQueryUseCase, ResponseAssembler};
use ferrous_relay_domain::Config;
use ferrous_relay_infrastructure::dns::UpstreamResolver;
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub cache: Arc<QueryCache>,
    pub handler: Arc<HandleDnsQueryUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config) -> Self {
        let authorities = config.authorities();
        for authority in &authorities {
            info!(
                authority = %authority,
                domain = authority.domain_suffix.as_deref().unwrap_or("*"),
                timeout_ms = authority.timeout.as_millis() as u64,
                "Authority configured"
            );
        }

        let directory = Arc::new(AuthorityDirectory::new(authorities));
        let cache = Arc::new(QueryCache::new());
        let assembler = ResponseAssembler::new(
            Arc::clone(&cache),
            Arc::new(UpstreamResolver::new()),
            config.cache.ttl(),
        );

        Self {
            cache,
            handler: Arc::new(HandleDnsQueryUseCase::new(directory, assembler)),
        }
    }
}
