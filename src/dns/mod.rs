//! DNS query construction, transport and resolution.
//!
//! This module provides:
//! - Query expansion (four questions per domain: DS, SPF, DKIM, DMARC)
//! - Wire request building and reply decoding with `hickory-proto`
//! - UDP and TCP transports over tokio sockets
//! - The per-worker `Resolver` (UDP first, one TCP retry on truncation)

mod message;
mod query;
mod resolver;
mod transport;

// Re-export public API
pub use message::{
    build_request, decode_reply, encode_request, Answer, DsRecord, Protocol, Response,
    RCODE_NO_ERROR, RCODE_NX_DOMAIN, RCODE_SERVER_FAILURE,
};
pub use query::{expand, Query, RecordKind};
pub use resolver::Resolver;
pub use transport::{DnsTransport, TcpTransport, UdpTransport};

#[cfg(test)]
mod tests;
