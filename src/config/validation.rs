//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that allow-list patterns compile
//! - Validate value ranges (ttl > 0) and member addresses
//! - Detect duplicate member ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::address::SocketAddress;
use crate::config::schema::ServerConfig;
use crate::routing::matcher::compile_pattern;

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routing.routing_ttl_secs must be greater than zero")]
    ZeroTtl,

    #[error("routing.plugin must not be empty")]
    EmptyPluginName,

    #[error("allow-list pattern #{index} is blank")]
    BlankPattern { index: usize },

    #[error("allow-list pattern '{pattern}' does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("member '{id}' has invalid bolt_address '{address}': {reason}")]
    InvalidMemberAddress {
        id: String,
        address: String,
        reason: String,
    },

    #[error("member id '{0}' is declared more than once")]
    DuplicateMember(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routing = &config.routing;

    if routing.routing_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl);
    }
    if routing.plugin.trim().is_empty() {
        errors.push(ValidationError::EmptyPluginName);
    }

    for (index, pattern) in routing.allow_client_side_routing_addresses.iter().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(ValidationError::BlankPattern { index });
            continue;
        }
        if let Err(e) = compile_pattern(pattern) {
            errors.push(ValidationError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    let members = config
        .topology
        .core
        .iter()
        .chain(config.topology.read_replicas.iter());
    for member in members {
        if !seen.insert(member.id.as_str()) {
            errors.push(ValidationError::DuplicateMember(member.id.clone()));
        }
        if let Err(e) = SocketAddress::parse(&member.bolt_address) {
            errors.push(ValidationError::InvalidMemberAddress {
                id: member.id.clone(),
                address: member.bolt_address.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::MemberConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.routing.routing_ttl_secs = 0;
        config.routing.plugin = " ".into();
        config.routing.allow_client_side_routing_addresses = vec!["10.0.0.*".into(), "".into()];
        config.topology.core.push(MemberConfig {
            id: "core-1".into(),
            bolt_address: "10.0.0.5:7687".into(),
        });
        config.topology.read_replicas.push(MemberConfig {
            id: "core-1".into(),
            bolt_address: "not an address".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTtl));
        assert!(errors.contains(&ValidationError::EmptyPluginName));
        assert!(errors.contains(&ValidationError::BlankPattern { index: 1 }));
        assert!(errors.contains(&ValidationError::DuplicateMember("core-1".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidMemberAddress { id, .. } if id == "core-1")));
    }

    #[test]
    fn test_regex_metacharacters_are_accepted_as_literals() {
        let mut config = ServerConfig::default();
        config.routing.allow_client_side_routing_addresses =
            vec!["(lb|proxy)[1-3]+.example.com".into(), "^$\\".into()];
        assert!(validate_config(&config).is_ok());
    }
}
