//! Query expansion.
//!
//! Every domain is checked for four signals, each answered by exactly one DNS
//! question. DKIM and DMARC questions target a derived owner name, but their
//! results are always filed under the apex domain.

use std::fmt;

use hickory_proto::rr::RecordType;

/// The signal a query checks, and the `qtype` label its rows are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Ds,
    Spf,
    Dkim,
    Dmarc,
}

impl RecordKind {
    /// All kinds, in the order queries are issued for a domain.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Ds,
        RecordKind::Spf,
        RecordKind::Dkim,
        RecordKind::Dmarc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Ds => "DS",
            RecordKind::Spf => "SPF",
            RecordKind::Dkim => "DKIM",
            RecordKind::Dmarc => "DMARC",
        }
    }

    /// DNS record type of the underlying question.
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordKind::Ds => RecordType::DS,
            RecordKind::Spf | RecordKind::Dkim | RecordKind::Dmarc => RecordType::TXT,
        }
    }

    fn owner_label(&self) -> Option<&'static str> {
        match self {
            RecordKind::Dkim => Some("_domainkey"),
            RecordKind::Dmarc => Some("_dmarc"),
            RecordKind::Ds | RecordKind::Spf => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One DNS question to ask for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    domain: String,
    kind: RecordKind,
    qname: String,
}

impl Query {
    /// Builds the query for `kind` on the fully-qualified `domain`.
    pub fn new(domain: &str, kind: RecordKind) -> Self {
        let qname = match kind.owner_label() {
            Some(label) => format!("{label}.{domain}"),
            None => domain.to_string(),
        };
        Self {
            domain: domain.to_string(),
            kind,
            qname,
        }
    }

    /// Apex domain the result is stored under.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Owner name actually sent on the wire.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn record_type(&self) -> RecordType {
        self.kind.record_type()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.qname, self.record_type(), self.kind)
    }
}

/// Expands a domain into its four queries: DS, SPF, DKIM, DMARC.
pub fn expand(domain: &str) -> [Query; 4] {
    RecordKind::ALL.map(|kind| Query::new(domain, kind))
}
