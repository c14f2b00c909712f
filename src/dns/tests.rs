//! Resolver tests against scripted transports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::TXT;
use hickory_proto::rr::{Name, RData, Record};

use super::*;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, TransportError};

enum Step {
    Reply(Message),
    Timeout,
    Garbage,
}

struct ScriptedTransport {
    protocol: Protocol,
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedTransport {
    fn new(protocol: Protocol, steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            protocol,
            steps: Mutex::new(steps.into()),
            calls: Arc::clone(&calls),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        (transport, calls)
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    async fn exchange(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.to_vec());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted");
        match step {
            Step::Reply(message) => Ok(message.to_vec().unwrap()),
            Step::Timeout => Err(TransportError::Timeout {
                protocol: self.protocol.as_str(),
                server: "192.0.2.53:53".parse().unwrap(),
                timeout,
            }),
            Step::Garbage => Ok(vec![0xde, 0xad]),
        }
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }
}

fn reply(rcode: ResponseCode, truncated: bool, txt: &[&str]) -> Message {
    let mut message = Message::new();
    message
        .set_id(1)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_response_code(rcode)
        .set_truncated(truncated)
        .set_recursion_available(true);
    for text in txt {
        message.add_answer(Record::from_rdata(
            Name::from_ascii("example.fr.").unwrap(),
            300,
            RData::TXT(TXT::new(vec![text.to_string()])),
        ));
    }
    message
}

struct Harness {
    resolver: Resolver,
    udp_calls: Arc<AtomicUsize>,
    tcp_calls: Arc<AtomicUsize>,
    stats: Arc<ProcessingStats>,
}

fn harness(udp: Vec<Step>, tcp: Vec<Step>) -> Harness {
    let (udp, udp_calls) = ScriptedTransport::new(Protocol::Udp, udp);
    let (tcp, tcp_calls) = ScriptedTransport::new(Protocol::Tcp, tcp);
    let stats = Arc::new(ProcessingStats::new());
    let resolver = Resolver::new(
        Box::new(udp),
        Box::new(tcp),
        Duration::from_secs(5),
        Arc::clone(&stats),
    );
    Harness {
        resolver,
        udp_calls,
        tcp_calls,
        stats,
    }
}

fn spf_query() -> Query {
    Query::new("example.fr.", RecordKind::Spf)
}

#[tokio::test]
async fn test_udp_reply_is_final_when_not_truncated() {
    let h = harness(
        vec![Step::Reply(reply(ResponseCode::NoError, false, &["v=spf1 -all"]))],
        vec![],
    );

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.rcode, RCODE_NO_ERROR);
    assert_eq!(response.transport, Protocol::Udp);
    assert_eq!(response.answers, vec![Answer::Txt(vec!["v=spf1 -all".into()])]);
    assert!(!response.synthetic);
    assert_eq!(h.udp_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tcp_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_nxdomain_reply_is_passed_through() {
    let h = harness(
        vec![Step::Reply(reply(ResponseCode::NXDomain, false, &[]))],
        vec![],
    );

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.rcode, RCODE_NX_DOMAIN);
    assert!(response.answers.is_empty());
    assert!(!response.synthetic);
}

#[tokio::test]
async fn test_truncated_udp_reply_escalates_to_tcp_once() {
    let h = harness(
        vec![Step::Reply(reply(ResponseCode::NoError, true, &[]))],
        vec![Step::Reply(reply(
            ResponseCode::NoError,
            false,
            &["v=spf1 include:_spf.example.com ~all"],
        ))],
    );

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.transport, Protocol::Tcp);
    assert!(!response.truncated);
    assert_eq!(response.answers.len(), 1);
    assert_eq!(h.udp_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tcp_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.stats.get_info_count(InfoType::TruncatedRetry), 1);
}

#[tokio::test]
async fn test_truncated_tcp_reply_is_accepted_as_final() {
    let h = harness(
        vec![Step::Reply(reply(ResponseCode::NoError, true, &[]))],
        vec![Step::Reply(reply(ResponseCode::NoError, true, &["v=spf1"]))],
    );

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.transport, Protocol::Tcp);
    assert!(response.truncated);
    assert!(!response.synthetic);
    assert_eq!(h.udp_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tcp_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_udp_timeout_yields_one_synthetic_failure() {
    let h = harness(vec![Step::Timeout], vec![]);

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.rcode, RCODE_SERVER_FAILURE);
    assert!(response.synthetic);
    assert!(response.recursion_available);
    assert!(response.answers.is_empty());
    assert_eq!(response.query, spf_query());
    assert_eq!(h.udp_calls.load(Ordering::SeqCst), 1);
    // A failed exchange is never retried, over UDP or TCP
    assert_eq!(h.tcp_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.stats.get_error_count(ErrorType::DnsQueryTimeout), 1);
    assert_eq!(h.stats.get_info_count(InfoType::SyntheticServerFailure), 1);
}

#[tokio::test]
async fn test_tcp_timeout_after_truncation_yields_synthetic_failure() {
    let h = harness(
        vec![Step::Reply(reply(ResponseCode::NoError, true, &[]))],
        vec![Step::Timeout],
    );

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.rcode, RCODE_SERVER_FAILURE);
    assert!(response.synthetic);
    assert_eq!(response.transport, Protocol::Tcp);
    assert_eq!(h.tcp_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.stats.get_info_count(InfoType::SyntheticServerFailure), 1);
}

#[tokio::test]
async fn test_malformed_reply_yields_synthetic_failure() {
    let h = harness(vec![Step::Garbage], vec![]);

    let response = h.resolver.resolve(spf_query()).await;

    assert_eq!(response.rcode, RCODE_SERVER_FAILURE);
    assert!(response.synthetic);
    assert_eq!(h.stats.get_error_count(ErrorType::DnsMalformedReply), 1);
}

#[tokio::test]
async fn test_unencodable_query_never_reaches_the_network() {
    let h = harness(vec![], vec![]);
    let domain = format!("{}.fr.", "x".repeat(70));

    let response = h.resolver.resolve(Query::new(&domain, RecordKind::Ds)).await;

    assert_eq!(response.rcode, RCODE_SERVER_FAILURE);
    assert!(response.synthetic);
    assert_eq!(h.udp_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.stats.get_error_count(ErrorType::DnsQueryEncodeError), 1);
}

#[tokio::test]
async fn test_tcp_retry_resends_the_same_request() {
    let (udp, _) = ScriptedTransport::new(
        Protocol::Udp,
        vec![Step::Reply(reply(ResponseCode::NoError, true, &[]))],
    );
    let (tcp, _) = ScriptedTransport::new(
        Protocol::Tcp,
        vec![Step::Reply(reply(ResponseCode::NoError, false, &[]))],
    );
    let udp_requests = Arc::clone(&udp.requests);
    let tcp_requests = Arc::clone(&tcp.requests);
    let resolver = Resolver::new(
        Box::new(udp),
        Box::new(tcp),
        Duration::from_secs(5),
        Arc::new(ProcessingStats::new()),
    );

    resolver
        .resolve(Query::new("example.fr.", RecordKind::Dkim))
        .await;

    let udp_requests = udp_requests.lock().unwrap();
    let tcp_requests = tcp_requests.lock().unwrap();
    assert_eq!(udp_requests.len(), 1);
    assert_eq!(*udp_requests, *tcp_requests);

    let sent = Message::from_vec(&udp_requests[0]).unwrap();
    assert!(sent.checking_disabled());
    assert_eq!(
        sent.queries()[0].name(),
        &Name::from_ascii("_domainkey.example.fr.").unwrap()
    );
}
