//! Visitor anonymisation
//!
//! Likes are deduplicated per visitor without ever storing a reversible client
//! address. The address is masked (last IPv4 octet or last IPv6 segment set to
//! `0`) and then hashed with SHA-256, so visitors on the same /24 (or sharing
//! the last IPv6 group) collapse into one token.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::IpAddr;

/// Hex-encoded SHA-256 of a masked client address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorHash(String);

impl VisitorHash {
    /// Hash a raw address value, which may be a comma-separated forwarded list
    pub fn from_address(raw: &str) -> Self {
        let masked = mask_address(first_entry(raw));
        Self(format!("{:x}", Sha256::digest(masked.as_bytes())))
    }

    /// Derive the visitor from the forwarded header, falling back to the peer address
    pub fn from_request(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Self {
        match forwarded_for.filter(|header| !first_entry(header).is_empty()) {
            Some(header) => Self::from_address(header),
            None => Self::from_address(&peer.map(|ip| ip.to_string()).unwrap_or_default()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters only, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for VisitorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn first_entry(header: &str) -> &str {
    header.split(',').next().unwrap_or("").trim()
}

/// Zero the last segment of an address.
///
/// Anything containing `:` is treated as IPv6 and always masked; otherwise the
/// value is split on `.` and masked only when it has exactly four parts.
pub fn mask_address(address: &str) -> String {
    let separator = if address.contains(':') { ":" } else { "." };
    let mut parts: Vec<&str> = address.split(separator).collect();

    let should_mask = match separator {
        ":" => parts.len() > 1,
        _ => parts.len() == 4,
    };

    if should_mask {
        if let Some(last) = parts.last_mut() {
            *last = "0";
        }
    }

    parts.join(separator)
}
