pub mod forwarding;
pub mod server;
pub mod transport;

pub use forwarding::{MessageBuilder, UpstreamResolver};
pub use server::{TcpDnsListener, TcpResponseSink, UdpDnsListener, UdpResponseSink};
pub use transport::{create_transport, DnsTransport, Transport, TransportResponse};
