//! Identity: the declarative description of when an environment applies.

use crate::{Criterion, RuntimeContext};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Declarative matching criteria for one environment.
///
/// All fields are optional. Omitted fields match anything; present fields
/// must all hold (every criterion is `ANDed`). The empty identity is the
/// catch-all: it matches every context.
///
/// Unknown criterion names are rejected at deserialization time, so a
/// misspelled field cannot silently turn a rule into a catch-all.
///
/// # Example
///
/// ```
/// use milieu::{Identity, RuntimeContext};
///
/// let identity = Identity {
///     hostname: Some("prod-web-1".into()),
///     ..Default::default()
/// };
///
/// assert!(identity.matches(&RuntimeContext::server("prod-web-1")));
/// assert!(!identity.matches(&RuntimeContext::server("dev-box")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    /// Machine hostname (exact, case-sensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// HTTP `Host` header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_host: Option<String>,
    /// Directory of the executing script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_dir: Option<String>,
    /// Query parameters that must each be present with an equal value.
    ///
    /// Extra parameters in the context are ignored. An empty map imposes
    /// no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, String>>,
    /// Last command-line argument; only matches command-line invocations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_last_arg: Option<String>,
}

impl Identity {
    /// The catch-all identity: no criteria, matches every context.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether this identity imposes no criteria.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.to_criteria().is_empty()
    }

    /// Compile this identity into its criterion list.
    ///
    /// Criteria appear in declaration order, query pairs in sorted key
    /// order. The empty identity compiles to an empty list, which every
    /// context satisfies.
    #[must_use]
    pub fn to_criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::new();
        if let Some(value) = &self.hostname {
            criteria.push(Criterion::Hostname(value.clone()));
        }
        if let Some(value) = &self.http_host {
            criteria.push(Criterion::HttpHost(value.clone()));
        }
        if let Some(value) = &self.script_dir {
            criteria.push(Criterion::ScriptDir(value.clone()));
        }
        if let Some(query) = &self.query {
            for (name, value) in query {
                criteria.push(Criterion::QueryParam {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
        }
        if let Some(value) = &self.cli_last_arg {
            criteria.push(Criterion::CliLastArg(value.clone()));
        }
        criteria
    }

    /// Evaluate this identity against a context.
    ///
    /// True when every criterion holds; vacuously true for the catch-all.
    #[must_use]
    pub fn matches(&self, ctx: &RuntimeContext) -> bool {
        self.to_criteria()
            .iter()
            .all(|criterion| criterion.evaluate(ctx))
    }

    /// Stable identifier for this identity.
    ///
    /// SHA-256 over a canonical encoding of the compiled criteria
    /// (declaration-ordered facts, sorted query keys), truncated to 16
    /// bytes and hex encoded. Identities with the same criteria always
    /// digest identically, regardless of how their query maps were built
    /// or whether the catch-all was written as `any` or as an empty map.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for criterion in self.to_criteria() {
            // NUL-framed fact and value keep adjacent criteria from
            // running together.
            hasher.update(criterion.fact().as_bytes());
            hasher.update([0u8]);
            hasher.update(criterion.expected().as_bytes());
            hasher.update([0u8]);
        }
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_catch_all() {
        assert!(Identity::any().is_catch_all());
        assert!(Identity::default().is_catch_all());
        assert!(!Identity {
            hostname: Some("x".into()),
            ..Default::default()
        }
        .is_catch_all());
    }

    #[test]
    fn empty_query_map_is_catch_all() {
        let identity = Identity {
            query: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(identity.is_catch_all());
    }

    #[test]
    fn catch_all_matches_every_context() {
        let identity = Identity::any();

        assert!(identity.matches(&RuntimeContext::server("web-1")));
        assert!(identity.matches(&RuntimeContext::command_line("dev-box")));
        assert!(identity.matches(
            &RuntimeContext::server("web-1")
                .with_http_host("app.example.com")
                .with_query_param("env", "x")
        ));
    }

    #[test]
    fn to_criteria_declaration_order() {
        let mut query = BTreeMap::new();
        query.insert("z".to_string(), "26".to_string());
        query.insert("a".to_string(), "1".to_string());

        let identity = Identity {
            hostname: Some("h".into()),
            http_host: Some("hh".into()),
            script_dir: Some("/d".into()),
            query: Some(query),
            cli_last_arg: Some("arg".into()),
        };

        assert_eq!(
            identity.to_criteria(),
            vec![
                Criterion::Hostname("h".into()),
                Criterion::HttpHost("hh".into()),
                Criterion::ScriptDir("/d".into()),
                Criterion::QueryParam {
                    name: "a".into(),
                    value: "1".into()
                },
                Criterion::QueryParam {
                    name: "z".into(),
                    value: "26".into()
                },
                Criterion::CliLastArg("arg".into()),
            ]
        );
    }

    #[test]
    fn present_criteria_are_anded() {
        let identity = Identity {
            hostname: Some("web-1".into()),
            http_host: Some("app.example.com".into()),
            ..Default::default()
        };

        let ctx = RuntimeContext::server("web-1").with_http_host("app.example.com");
        assert!(identity.matches(&ctx));

        // One criterion fails: the identity fails
        let ctx = RuntimeContext::server("web-1").with_http_host("other.example.com");
        assert!(!identity.matches(&ctx));

        let ctx = RuntimeContext::server("web-2").with_http_host("app.example.com");
        assert!(!identity.matches(&ctx));
    }

    #[test]
    fn query_identity_requires_all_pairs() {
        let mut query = BTreeMap::new();
        query.insert("env".to_string(), "staging".to_string());
        query.insert("region".to_string(), "eu".to_string());
        let identity = Identity {
            query: Some(query),
            ..Default::default()
        };

        let ctx = RuntimeContext::server("web-1")
            .with_query_param("env", "staging")
            .with_query_param("region", "eu")
            .with_query_param("debug", "1");
        assert!(identity.matches(&ctx));

        let ctx = RuntimeContext::server("web-1").with_query_param("env", "staging");
        assert!(!identity.matches(&ctx));
    }

    #[test]
    fn digest_is_32_hex_chars() {
        let digest = Identity::any().digest();
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_is_deterministic() {
        let identity = Identity {
            hostname: Some("prod-web-1".into()),
            ..Default::default()
        };
        assert_eq!(identity.digest(), identity.digest());
        assert_eq!(identity.digest(), identity.clone().digest());
    }

    #[test]
    fn digest_differs_across_identities() {
        let a = Identity {
            hostname: Some("prod-web-1".into()),
            ..Default::default()
        };
        let b = Identity {
            hostname: Some("prod-web-2".into()),
            ..Default::default()
        };
        let c = Identity {
            http_host: Some("prod-web-1".into()),
            ..Default::default()
        };

        assert_ne!(a.digest(), b.digest());
        // Same value under a different fact must not collide
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn digest_independent_of_query_insertion_order() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), "1".to_string());
        forward.insert("b".to_string(), "2".to_string());

        let mut reverse = BTreeMap::new();
        reverse.insert("b".to_string(), "2".to_string());
        reverse.insert("a".to_string(), "1".to_string());

        let lhs = Identity {
            query: Some(forward),
            ..Default::default()
        };
        let rhs = Identity {
            query: Some(reverse),
            ..Default::default()
        };

        assert_eq!(lhs.digest(), rhs.digest());
    }

    #[test]
    fn digest_of_empty_query_equals_catch_all() {
        let empty_query = Identity {
            query: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert_eq!(empty_query.digest(), Identity::any().digest());
    }

    #[test]
    fn digest_distinguishes_query_pair_boundaries() {
        let mut joined = BTreeMap::new();
        joined.insert("ab".to_string(), "c".to_string());
        let mut split = BTreeMap::new();
        split.insert("a".to_string(), "bc".to_string());

        let lhs = Identity {
            query: Some(joined),
            ..Default::default()
        };
        let rhs = Identity {
            query: Some(split),
            ..Default::default()
        };

        assert_ne!(lhs.digest(), rhs.digest());
    }

    #[test]
    fn deserializes_from_json() {
        let identity: Identity = serde_json::from_value(serde_json::json!({
            "hostname": "prod-web-1",
            "query": {"env": "staging"}
        }))
        .unwrap();

        assert_eq!(identity.hostname.as_deref(), Some("prod-web-1"));
        assert_eq!(
            identity.query.as_ref().and_then(|q| q.get("env")).cloned(),
            Some("staging".to_string())
        );
        assert_eq!(identity.http_host, None);
    }

    #[test]
    fn rejects_unknown_criterion_names() {
        let result: Result<Identity, _> = serde_json::from_value(serde_json::json!({
            "hostnme": "typo"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_without_absent_fields() {
        let identity = Identity {
            hostname: Some("h".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json, serde_json::json!({"hostname": "h"}));
    }
}
