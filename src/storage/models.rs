// storage/models.rs
// Database models and types

use crate::dns::RecordKind;

/// One row of the `records` table.
///
/// `name` is always the apex domain the query was made for, with its trailing
/// dot. `kind` is stored as its label (`DS`, `SPF`, `DKIM`, `DMARC`) in the
/// `qtype` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub kind: RecordKind,
    pub rcode: u16,
    pub value: Option<String>,
}

impl Record {
    pub fn new(name: &str, kind: RecordKind, rcode: u16, value: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            rcode,
            value,
        }
    }
}
