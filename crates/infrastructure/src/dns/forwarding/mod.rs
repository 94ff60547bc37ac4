pub mod message_builder;
pub mod upstream_resolver;

pub use message_builder::MessageBuilder;
pub use upstream_resolver::UpstreamResolver;
