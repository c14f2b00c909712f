//! Response classification.
//!
//! Turns one [`Response`] into the rows persisted for it. Classification is
//! pure; it never fails and always yields at least one row.

use crate::dns::{Answer, RecordKind, Response, RCODE_NO_ERROR};
use crate::storage::Record;

const SPF_PREFIX: &str = "v=spf1";
const DMARC_PREFIX: &str = "v=DMARC1;";

/// Rows produced for one response, plus how many TXT answers the prefix
/// filters rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub records: Vec<Record>,
    pub rejected_txt: usize,
}

/// Classifies `response` into one or more records.
///
/// Rows are always filed under the apex domain of the query, never under the
/// derived `_dmarc` / `_domainkey` owner name.
pub fn classify(response: &Response) -> Vec<Record> {
    classify_counted(response).records
}

/// Same as [`classify`], also reporting rejected TXT answers.
pub fn classify_counted(response: &Response) -> Classification {
    let domain = response.query.domain();
    let kind = response.query.kind();
    let null_row = || Record::new(domain, kind, response.rcode, None);

    if response.rcode != RCODE_NO_ERROR || response.answers.is_empty() {
        return Classification {
            records: vec![null_row()],
            rejected_txt: 0,
        };
    }

    let mut records = Vec::new();
    let mut rejected_txt = 0;
    for answer in &response.answers {
        match answer {
            Answer::Ds(ds) => {
                records.push(Record::new(
                    domain,
                    kind,
                    response.rcode,
                    Some(ds.to_string()),
                ));
            }
            Answer::Txt(strings) => match accept_txt(kind, strings) {
                TxtVerdict::Accepted(value) => {
                    records.push(Record::new(domain, kind, response.rcode, Some(value)));
                }
                TxtVerdict::Rejected => rejected_txt += 1,
                TxtVerdict::Ignored => {}
            },
        }
    }

    if records.is_empty() {
        records.push(null_row());
    }

    Classification {
        records,
        rejected_txt,
    }
}

enum TxtVerdict {
    Accepted(String),
    Rejected,
    /// DKIM presence is judged from the result code alone.
    Ignored,
}

fn accept_txt(kind: RecordKind, strings: &[String]) -> TxtVerdict {
    let prefix = match kind {
        RecordKind::Spf => SPF_PREFIX,
        RecordKind::Dmarc => DMARC_PREFIX,
        RecordKind::Dkim | RecordKind::Ds => return TxtVerdict::Ignored,
    };
    let value = Answer::txt_value(strings);
    if value.starts_with(prefix) {
        TxtVerdict::Accepted(value)
    } else {
        TxtVerdict::Rejected
    }
}
