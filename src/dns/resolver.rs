//! Query resolution with UDP to TCP escalation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::Message;
use log::debug;

use crate::dns::message::{decode_reply, encode_request, Protocol, Response};
use crate::dns::query::Query;
use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use crate::error_handling::{InfoType, ProcessingStats, TransportError};

/// Resolves queries against one recursive resolver.
///
/// `resolve` never fails: every query ends in exactly one [`Response`], either
/// received from the resolver or synthesized locally as SERVFAIL when the
/// exchange did not produce a decodable reply. A truncated UDP reply is asked
/// again over TCP once; whatever TCP returns, truncated or not, is final.
pub struct Resolver {
    udp: Box<dyn DnsTransport>,
    tcp: Box<dyn DnsTransport>,
    timeout: Duration,
    stats: Arc<ProcessingStats>,
}

impl Resolver {
    pub fn new(
        udp: Box<dyn DnsTransport>,
        tcp: Box<dyn DnsTransport>,
        timeout: Duration,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            udp,
            tcp,
            timeout,
            stats,
        }
    }

    /// Resolver using real UDP and TCP sockets towards `server`.
    pub fn network(server: SocketAddr, timeout: Duration, stats: Arc<ProcessingStats>) -> Self {
        Self::new(
            Box::new(UdpTransport::new(server)),
            Box::new(TcpTransport::new(server)),
            timeout,
            stats,
        )
    }

    pub async fn resolve(&self, query: Query) -> Response {
        let udp = self.udp.protocol();
        let request = match encode_request(&query, rand::random()) {
            Ok(bytes) => bytes,
            Err(e) => return self.synthetic_failure(query, udp, e),
        };

        let reply = match self.exchange(self.udp.as_ref(), &request).await {
            Ok(reply) => reply,
            Err(e) => return self.synthetic_failure(query, udp, e),
        };
        if !reply.truncated() {
            return Response::from_message(query, &reply, udp);
        }

        debug!("Truncated UDP reply for {query}, retrying over TCP");
        self.stats.increment_info(InfoType::TruncatedRetry);

        let tcp = self.tcp.protocol();
        match self.exchange(self.tcp.as_ref(), &request).await {
            Ok(reply) => Response::from_message(query, &reply, tcp),
            Err(e) => self.synthetic_failure(query, tcp, e),
        }
    }

    async fn exchange(
        &self,
        transport: &dyn DnsTransport,
        request: &[u8],
    ) -> Result<Message, TransportError> {
        let bytes = transport.exchange(request, self.timeout).await?;
        decode_reply(&bytes)
    }

    fn synthetic_failure(
        &self,
        query: Query,
        transport: Protocol,
        error: TransportError,
    ) -> Response {
        debug!("{query}: {error}");
        self.stats.increment_error(error.error_type());
        self.stats.increment_info(InfoType::SyntheticServerFailure);
        Response::server_failure(query, transport)
    }
}
