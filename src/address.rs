//! Socket addresses as advertised by cluster members and declared by clients.
//!
//! # Accepted forms
//! ```text
//! host:port        db.example.com:7687, 10.0.0.5:7687
//! host             db.example.com          (port defaults to 7687)
//! [ipv6]:port      [fe80::1]:7687
//! [ipv6] / ipv6    [fe80::1], fe80::1      (port defaults to 7687)
//! ```
//!
//! # Design Decisions
//! - Equality is structural: host text and port, no DNS resolution
//! - Hostnames are restricted to `[A-Za-z0-9._-]`
//! - `Display` is the canonical `host:port` form used for pattern matching

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Default Bolt port used when an address omits one.
pub const DEFAULT_BOLT_PORT: u16 = 7687;

/// Reasons an address string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,

    #[error("invalid hostname '{0}'")]
    InvalidHost(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("unterminated IPv6 literal in '{0}'")]
    UnterminatedBracket(String),
}

/// A host/port pair identifying a network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketAddress {
    host: String,
    port: u16,
}

impl SocketAddress {
    /// Create an address from already-validated parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `host[:port]` specification.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AddressParseError::Empty);
        }

        if let Some(rest) = raw.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| AddressParseError::UnterminatedBracket(raw.to_string()))?;
            if host.parse::<Ipv6Addr>().is_err() {
                return Err(AddressParseError::InvalidHost(host.to_string()));
            }
            let port = match tail {
                "" => DEFAULT_BOLT_PORT,
                _ => match tail.strip_prefix(':') {
                    Some(port) => parse_port(port)?,
                    None => return Err(AddressParseError::InvalidPort(tail.to_string())),
                },
            };
            return Ok(Self::new(host, port));
        }

        match raw.matches(':').count() {
            0 => {
                validate_hostname(raw)?;
                Ok(Self::new(raw, DEFAULT_BOLT_PORT))
            }
            1 => {
                let (host, port) = raw.split_once(':').unwrap_or((raw, ""));
                validate_hostname(host)?;
                Ok(Self::new(host, parse_port(port)?))
            }
            // Bare IPv6 literal, no room for a port.
            _ => raw
                .parse::<Ipv6Addr>()
                .map(|_| Self::new(raw, DEFAULT_BOLT_PORT))
                .map_err(|_| AddressParseError::InvalidHost(raw.to_string())),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn validate_hostname(host: &str) -> Result<(), AddressParseError> {
    let valid = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    if valid {
        Ok(())
    } else {
        Err(AddressParseError::InvalidHost(host.to_string()))
    }
}

fn parse_port(port: &str) -> Result<u16, AddressParseError> {
    port.parse::<u16>()
        .map_err(|_| AddressParseError::InvalidPort(port.to_string()))
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for SocketAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SocketAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SocketAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
