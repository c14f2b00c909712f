//! Resolver address initialization.
//!
//! Turns the `--resolver` option into the socket address every worker's
//! transports talk to. Hostnames are looked up once, at startup.

use std::net::SocketAddr;

use crate::error_handling::InitializationError;

/// Resolves a `host:port` string to a socket address.
///
/// Literal addresses (`8.8.8.8:53`, `[2001:4860:4860::8888]:53`) are used as
/// is; hostnames go through the system resolver and the first result is kept.
///
/// # Errors
///
/// Returns `InitializationError::ResolverAddressError` if the string has no
/// port, cannot be looked up, or yields no address.
pub async fn resolve_server_address(address: &str) -> Result<SocketAddr, InitializationError> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let mut candidates = tokio::net::lookup_host(address).await.map_err(|e| {
        InitializationError::ResolverAddressError {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })?;

    let addr = candidates
        .next()
        .ok_or_else(|| InitializationError::ResolverAddressError {
            address: address.to_string(),
            reason: "no address found".to_string(),
        })?;

    log::debug!("Resolver {address} resolved to {addr}");
    Ok(addr)
}
