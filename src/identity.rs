//! Anonymous identity fingerprints
//!
//! Submitters are never identified by raw values. The client supplies its own
//! fingerprint hash; the server derives salted one-way hashes of the client
//! IP and user-agent for rate limiting and abuse correlation. Raw values are
//! not persisted anywhere.

use actix_web::HttpRequest;
use std::net::IpAddr;

use crate::app_config;

/// Salted one-way fingerprint of an arbitrary client signal.
///
/// blake3 of `salt || value`, hex-encoded. Irreversible by construction;
/// changing the salt invalidates all stored fingerprints, so the salt is
/// deployment-stable configuration.
pub fn fingerprint(value: &str, salt: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(value.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint using the configured deployment salt.
pub fn fingerprint_with_config(value: &str) -> String {
    let salt = app_config::get().identity.hash_salt.clone();
    fingerprint(value, &salt)
}

/// Extract the real client IP address from an HTTP request.
///
/// Checks headers in order of preference:
/// 1. X-Forwarded-For (first IP in the list)
/// 2. X-Real-IP
/// 3. Remote peer address
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(xff) = req.headers().get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                let trimmed = first_ip.trim();
                if trimmed.parse::<IpAddr>().is_ok() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Some(xri) = req.headers().get("x-real-ip") {
        if let Ok(xri_str) = xri.to_str() {
            let trimmed = xri_str.trim();
            if trimmed.parse::<IpAddr>().is_ok() {
                return Some(trimmed.to_string());
            }
        }
    }

    req.peer_addr().map(|peer| peer.ip().to_string())
}
