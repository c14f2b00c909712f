//! Domain to query fan-out.

use log::debug;
use tokio::sync::mpsc;

use crate::dns::{expand, Query};

use super::SharedDomains;

/// Expands domains from the shared feed into `queries` until the feed closes.
///
/// The four queries of a domain are sent in order, before the next domain is
/// taken. Dropping `queries` on return closes the worker's input. Returns the
/// number of domains fully handed over.
pub async fn fan_out(domains: SharedDomains, queries: mpsc::Sender<Query>) -> usize {
    let mut count = 0;
    loop {
        // Lock only for the receive so other producers can take the next domain
        let next = domains.lock().await.recv().await;
        let Some(domain) = next else {
            break;
        };
        for query in expand(&domain) {
            if queries.send(query).await.is_err() {
                debug!("Worker input closed, dropping remaining queries for {domain}");
                return count;
            }
        }
        count += 1;
    }
    count
}
