//! Client-facing listeners.
//!
//! Each listener decodes incoming queries and hands them to the request
//! handler together with a `ResponseSink` bound to the client.

mod sink;
mod tcp;
mod udp;

pub use sink::{TcpResponseSink, UdpResponseSink};
pub use tcp::TcpDnsListener;
pub use udp::UdpDnsListener;
