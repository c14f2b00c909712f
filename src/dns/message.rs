//! DNS wire messages: building requests and reading replies.
//!
//! Requests carry one question, recursion desired, checking disabled and an
//! EDNS(0) OPT record advertising a 4096 byte payload. Replies are reduced to
//! the two answer kinds this crate inspects (DS and TXT); everything else in
//! the answer section is ignored.

use std::fmt;

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query as Question};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;

use crate::config::EDNS_MAX_PAYLOAD;
use crate::dns::query::Query;
use crate::error_handling::TransportError;

/// Result code of a successful query.
pub const RCODE_NO_ERROR: u16 = 0;
/// Result code of a server failure, also used for synthetic failures.
pub const RCODE_SERVER_FAILURE: u16 = 2;
/// Result code of a query for a name that does not exist.
pub const RCODE_NX_DOMAIN: u16 = 3;

/// Transport a reply was received over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Udp => "UDP",
            Protocol::Tcp => "TCP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delegation Signer record data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl DsRecord {
    /// Parses DS rdata: key tag (2 bytes), algorithm, digest type, digest.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        Some(Self {
            key_tag: u16::from_be_bytes([data[0], data[1]]),
            algorithm: data[2],
            digest_type: data[3],
            digest: data[4..].to_vec(),
        })
    }
}

/// Presentation format: `<keyTag> <algorithm> <digestType> <DIGEST HEX>`.
impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            hex::encode_upper(&self.digest)
        )
    }
}

/// An answer entry this crate knows how to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Ds(DsRecord),
    /// The character-strings of one TXT record, in wire order.
    Txt(Vec<String>),
}

impl Answer {
    /// Extracts a DS or TXT answer from a resource record; `None` for any other type.
    pub fn from_record(record: &Record) -> Option<Self> {
        let rdata = record.data()?;
        match record.record_type() {
            // DS is decoded as opaque rdata unless DNSSEC support is compiled
            // into hickory; re-emitting it gives the wire bytes either way.
            RecordType::DS => {
                let bytes = rdata.to_bytes().ok()?;
                DsRecord::parse(&bytes).map(Answer::Ds)
            }
            RecordType::TXT => match rdata {
                RData::TXT(txt) => Some(Answer::Txt(
                    txt.iter()
                        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                        .collect(),
                )),
                _ => None,
            },
            _ => None,
        }
    }

    /// TXT strings joined with a single space.
    pub fn txt_value(strings: &[String]) -> String {
        strings.join(" ")
    }
}

/// The single outcome of a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub query: Query,
    pub rcode: u16,
    pub answers: Vec<Answer>,
    pub truncated: bool,
    pub recursion_available: bool,
    pub transport: Protocol,
    /// Built locally because the exchange failed, not received from the resolver.
    pub synthetic: bool,
}

impl Response {
    /// Wraps a decoded reply.
    pub fn from_message(query: Query, message: &Message, transport: Protocol) -> Self {
        Self {
            query,
            rcode: u16::from(message.response_code()),
            answers: message
                .answers()
                .iter()
                .filter_map(Answer::from_record)
                .collect(),
            truncated: message.truncated(),
            recursion_available: message.recursion_available(),
            transport,
            synthetic: false,
        }
    }

    /// Stand-in for an exchange that produced no usable reply.
    pub fn server_failure(query: Query, transport: Protocol) -> Self {
        Self {
            query,
            rcode: RCODE_SERVER_FAILURE,
            answers: Vec::new(),
            truncated: false,
            recursion_available: true,
            transport,
            synthetic: true,
        }
    }
}

/// Builds the wire request for `query` with message id `id`.
pub fn build_request(query: &Query, id: u16) -> Result<Message, TransportError> {
    let name = Name::from_utf8(query.qname())
        .map_err(|e| TransportError::Encode(format!("invalid name '{}': {e}", query.qname())))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_checking_disabled(true);
    message.add_query(Question::query(name, query.record_type()));

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_MAX_PAYLOAD);
    edns.set_dnssec_ok(false);
    message.set_edns(edns);

    Ok(message)
}

/// Encodes the request for `query` to wire bytes.
pub fn encode_request(query: &Query, id: u16) -> Result<Vec<u8>, TransportError> {
    build_request(query, id)?
        .to_vec()
        .map_err(|e| TransportError::Encode(e.to_string()))
}

/// Decodes a reply received from the resolver.
pub fn decode_reply(bytes: &[u8]) -> Result<Message, TransportError> {
    Message::from_vec(bytes).map_err(|e| TransportError::Malformed(e.to_string()))
}
