//! Known-address matching.
//!
//! # Responsibilities
//! - Match a client address against advertised member addresses (exact)
//! - Match a client address against allow-list wildcard patterns
//! - Compile an allow-list once per configuration generation
//!
//! # Design Decisions
//! - Member matching is structural equality on host and port
//! - Patterns only understand `?` (one character) and `*` (any run, lazy);
//!   every other character is escaped before regex compilation
//! - Patterns are anchored and tried against both the bare host and `host:port`
//! - A pattern that fails to compile never matches and never fails the request

use regex::Regex;

use crate::address::SocketAddress;
use crate::topology::TopologySnapshot;

/// Trait for matching addresses against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the address matches this condition.
    fn matches(&self, address: &SocketAddress) -> bool;
}

/// Matches the advertised Bolt address of any core or read-replica member.
#[derive(Debug)]
pub struct MemberMatcher<'a> {
    topology: &'a TopologySnapshot,
}

impl<'a> MemberMatcher<'a> {
    pub fn new(topology: &'a TopologySnapshot) -> Self {
        Self { topology }
    }
}

impl Matcher for MemberMatcher<'_> {
    fn matches(&self, address: &SocketAddress) -> bool {
        self.topology.bolt_addresses().any(|a| a == address)
    }
}

/// Matches a single allow-list pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rule: Regex,
}

impl PatternMatcher {
    /// Compile an allow-list pattern.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            rule: compile_pattern(pattern)?,
        })
    }
}

impl Matcher for PatternMatcher {
    fn matches(&self, address: &SocketAddress) -> bool {
        self.rule.is_match(address.host()) || self.rule.is_match(&address.to_string())
    }
}

/// Compiled allow-list; matches when any pattern does.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<PatternMatcher>,
}

impl AllowList {
    /// Compile every pattern, skipping (and warning about) ones that fail.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match PatternMatcher::compile(pattern) {
                Ok(m) => compiled.push(m),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Ignoring allow-list pattern that does not compile");
                }
            }
        }
        Self { patterns: compiled }
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Matcher for AllowList {
    fn matches(&self, address: &SocketAddress) -> bool {
        self.patterns.iter().any(|p| p.matches(address))
    }
}

/// Translate an allow-list pattern into an anchored regex.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push_str("^(?:");

    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '?' => translated.push('.'),
            '*' => translated.push_str(".*?"),
            c => translated.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }

    translated.push_str(")$");
    Regex::new(&translated)
}

/// Returns true if `candidate` is advertised by a member or allowed by a compiled allow-list.
pub fn is_known_with(
    candidate: &SocketAddress,
    topology: &TopologySnapshot,
    allow_list: &AllowList,
) -> bool {
    MemberMatcher::new(topology).matches(candidate) || allow_list.matches(candidate)
}

/// Returns true if `candidate` is advertised by a member or allowed by a pattern.
pub fn is_known<S: AsRef<str>>(
    candidate: &SocketAddress,
    topology: &TopologySnapshot,
    patterns: &[S],
) -> bool {
    is_known_with(candidate, topology, &AllowList::compile(patterns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{MemberId, MemberInfo, Members};

    const NO_PATTERNS: [&str; 0] = [];

    fn addr(raw: &str) -> SocketAddress {
        SocketAddress::parse(raw).unwrap()
    }

    fn topology(core: &[&str], replicas: &[&str]) -> TopologySnapshot {
        let members = |prefix: &str, addrs: &[&str]| -> Members {
            addrs
                .iter()
                .enumerate()
                .map(|(i, a)| (MemberId::new(format!("{prefix}-{i}")), MemberInfo::new(addr(a))))
                .collect()
        };
        TopologySnapshot::new(members("core", core), members("rr", replicas))
    }

    #[test]
    fn test_member_addresses_are_known() {
        let snapshot = topology(&["10.0.0.5:7687", "10.0.0.6:7687"], &["10.0.1.7:7687"]);

        for a in ["10.0.0.5:7687", "10.0.0.6:7687", "10.0.1.7:7687"] {
            assert!(is_known(&addr(a), &snapshot, &NO_PATTERNS), "{a}");
            assert!(is_known(&addr(a), &snapshot, &["unrelated.host"]), "{a}");
        }
        // Same host, different port.
        assert!(!is_known(&addr("10.0.0.5:7688"), &snapshot, &NO_PATTERNS));
    }

    #[test]
    fn test_empty_inputs_are_unknown() {
        let snapshot = TopologySnapshot::default();
        assert!(!is_known(&addr("10.0.0.5:7687"), &snapshot, &NO_PATTERNS));
    }

    #[test]
    fn test_literal_pattern_matches_host_or_full_address() {
        let snapshot = TopologySnapshot::default();
        assert!(is_known(&addr("lb.example.com:7687"), &snapshot, &["lb.example.com"]));
        assert!(is_known(&addr("lb.example.com:7687"), &snapshot, &["lb.example.com:7687"]));
        assert!(!is_known(&addr("lb.example.com:7688"), &snapshot, &["lb.example.com:7687"]));
        assert!(!is_known(&addr("lb.example.com.evil:7687"), &snapshot, &["lb.example.com"]));
    }

    #[test]
    fn test_multi_char_wildcard() {
        let snapshot = TopologySnapshot::default();
        let patterns = ["10.0.0.*"];
        assert!(is_known(&addr("10.0.0.5:7687"), &snapshot, &patterns));
        assert!(is_known(&addr("10.0.0.123:7687"), &snapshot, &patterns));
        assert!(!is_known(&addr("10.0.1.5:7687"), &snapshot, &patterns));
        // Empty run allowed.
        assert!(is_known(&addr("lb:7687"), &snapshot, &["lb*"]));
    }

    #[test]
    fn test_single_char_wildcard() {
        let snapshot = TopologySnapshot::default();
        let patterns = ["host?.local"];
        assert!(is_known(&addr("host1.local:7687"), &snapshot, &patterns));
        assert!(is_known(&addr("hostA.local:7687"), &snapshot, &patterns));
        assert!(!is_known(&addr("host12.local:7687"), &snapshot, &patterns));
        assert!(!is_known(&addr("host.local:7687"), &snapshot, &patterns));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let snapshot = TopologySnapshot::default();
        assert!(is_known(&addr("a.b.c:7687"), &snapshot, &["a.b.c"]));
        assert!(!is_known(&addr("axbxc:7687"), &snapshot, &["a.b.c"]));

        let rule = compile_pattern("(a|b)+[x]").unwrap();
        assert!(rule.is_match("(a|b)+[x]"));
        assert!(!rule.is_match("aab"));
    }

    #[test]
    fn test_any_pattern_is_enough() {
        let snapshot = TopologySnapshot::default();
        let patterns = ["nope.example.com", "*.lb.example.com"];
        assert!(is_known(&addr("eu1.lb.example.com:7687"), &snapshot, &patterns));

        let reversed = ["*.lb.example.com", "nope.example.com"];
        assert!(is_known(&addr("eu1.lb.example.com:7687"), &snapshot, &reversed));
    }

    #[test]
    fn test_uncompilable_pattern_never_matches() {
        let snapshot = TopologySnapshot::default();
        let oversized = "?".repeat(200_000);
        assert!(compile_pattern(&oversized).is_err());

        let candidate = addr("10.0.0.1:7687");
        assert!(!is_known(&candidate, &snapshot, &[oversized.as_str()]));
        assert!(is_known(&candidate, &snapshot, &[oversized.as_str(), "10.0.0.*"]));
        assert_eq!(AllowList::compile(&[oversized.as_str(), "10.0.0.*"]).len(), 1);
    }

    #[test]
    fn test_ipv6_full_form_uses_brackets() {
        let snapshot = TopologySnapshot::default();
        assert!(is_known(&addr("[fe80::1]:7687"), &snapshot, &["fe80::1"]));
        assert!(is_known(&addr("[fe80::1]:7687"), &snapshot, &["[fe80::*]:7687"]));
    }
}
