//! Network side of the relay: upstream transports, the resolver that
//! implements the application's `UpstreamExchange` port, the UDP/TCP
//! listeners feeding client queries into the request handler, and the
//! background cache sweep.

pub mod dns;
pub mod jobs;
