mod assemble_response;
mod handle_dns_query;
mod inflight;

pub use assemble_response::ResponseAssembler;
pub use handle_dns_query::HandleDnsQueryUseCase;
pub use inflight::{InflightGuard, InflightRequests};
