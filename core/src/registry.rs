//! The environment registry: rule registration and first-match resolution.
//!
//! [`Environments`] holds an ordered list of rules, each an
//! [`Identity`](crate::Identity) compiled to criteria plus the properties
//! merged at registration time. Resolution is a linear scan in
//! registration order.

use crate::properties::merge_over;
use crate::trace::RuleTrace;
use crate::{Criterion, Identity, Properties, ResolveError, RuntimeContext, ID_KEY};
use serde_json::Value;

/// One registered environment rule.
#[derive(Debug, Clone)]
struct Rule {
    /// The declared identity, kept for traces and introspection.
    identity: Identity,
    /// The identity compiled once at registration time.
    criteria: Vec<Criterion>,
    /// The identity digest, also stored under `"id"` in `properties`.
    id: String,
    /// Defaults merged with the rule's own properties, plus `"id"`.
    properties: Properties,
}

/// Prioritized registry of environments with first-match-wins resolution.
///
/// Register rules during setup, then resolve read-only. Rules are
/// consulted in registration order and the first matching identity ends
/// the scan, so registration order is precedence order.
///
/// # Strict and non-strict registries
///
/// A strict registry ([`Environments::new`]) fails resolution when no
/// rule matches. A non-strict one ([`Environments::with_fallback`])
/// returns the original defaults instead, unmodified and without an
/// `"id"` key.
///
/// # Concurrency
///
/// Registration takes `&mut self`; resolution takes `&self` and performs
/// no I/O and no interior mutation. Configure the registry first, then
/// share it freely across threads.
///
/// # Example
///
/// ```
/// use milieu::{Environments, Identity, RuntimeContext};
/// use serde_json::json;
///
/// let defaults = json!({"debug": false, "db": "sqlite://dev.db"});
/// let mut environments = Environments::new(defaults.as_object().unwrap().clone());
///
/// environments.register(
///     Identity { hostname: Some("prod-web-1".into()), ..Default::default() },
///     json!({"db": "postgres://prod"}).as_object().unwrap().clone(),
/// );
/// environments.register(
///     Identity::any(),
///     json!({"debug": true}).as_object().unwrap().clone(),
/// );
///
/// let props = environments.resolve(&RuntimeContext::server("prod-web-1")).unwrap();
/// assert_eq!(props["db"], json!("postgres://prod"));
/// assert_eq!(props["debug"], json!(false));
/// ```
#[derive(Debug, Clone)]
pub struct Environments {
    defaults: Properties,
    require_environment: bool,
    rules: Vec<Rule>,
}

impl Environments {
    /// Create a strict registry: resolution with no matching rule fails
    /// with [`ResolveError::NoMatchingEnvironment`].
    #[must_use]
    pub fn new(defaults: Properties) -> Self {
        Self {
            defaults,
            require_environment: true,
            rules: Vec::new(),
        }
    }

    /// Create a non-strict registry: resolution with no matching rule
    /// returns the defaults unmodified.
    #[must_use]
    pub fn with_fallback(defaults: Properties) -> Self {
        Self {
            defaults,
            require_environment: false,
            rules: Vec::new(),
        }
    }

    /// Register an environment rule.
    ///
    /// The stored properties are the registry defaults overridden key by
    /// key by `properties`, with the identity digest under `"id"`. The
    /// digest occupies `"id"` even when `properties` supplies its own
    /// value for that key.
    ///
    /// Rules accumulate in call order. Registering a second rule with an
    /// identical identity appends it; the earlier rule keeps winning by
    /// scan order.
    pub fn register(&mut self, identity: Identity, properties: Properties) {
        let id = identity.digest();
        let mut merged = merge_over(&self.defaults, &properties);
        merged.insert(ID_KEY.to_string(), Value::String(id.clone()));
        self.rules.push(Rule {
            criteria: identity.to_criteria(),
            identity,
            id,
            properties: merged,
        });
    }

    /// Resolve the environment for a context.
    ///
    /// Scans rules in registration order and returns the merged
    /// properties of the first rule whose criteria all hold. The
    /// catch-all identity holds vacuously, so a catch-all rule matches
    /// any context that reaches it.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NoMatchingEnvironment`] when no rule matches and
    /// the registry is strict.
    pub fn resolve(&self, ctx: &RuntimeContext) -> Result<&Properties, ResolveError> {
        for rule in &self.rules {
            if rule.criteria.iter().all(|criterion| criterion.evaluate(ctx)) {
                return Ok(&rule.properties);
            }
        }
        self.no_match()
    }

    /// Resolve with a per-rule trace of every consulted rule.
    ///
    /// The result is identical to [`resolve`](Self::resolve). The trace
    /// covers rules up to and including the first match, or every rule
    /// when nothing matched.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_with_trace(
        &self,
        ctx: &RuntimeContext,
    ) -> (Result<&Properties, ResolveError>, Vec<RuleTrace>) {
        let mut traces = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let trace = rule.identity.trace(ctx);
            let matched = trace.matched;
            traces.push(RuleTrace {
                index,
                id: rule.id.clone(),
                trace,
            });
            if matched {
                return (Ok(&rule.properties), traces);
            }
        }
        (self.no_match(), traces)
    }

    fn no_match(&self) -> Result<&Properties, ResolveError> {
        if self.require_environment {
            Err(ResolveError::NoMatchingEnvironment {
                rules: self.rules.len(),
            })
        } else {
            Ok(&self.defaults)
        }
    }

    /// Iterate over registered rules as `(digest, identity)` pairs, in
    /// precedence order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Identity)> {
        self.rules
            .iter()
            .map(|rule| (rule.id.as_str(), &rule.identity))
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether resolution fails when no rule matches.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.require_environment
    }

    /// The registry defaults.
    #[must_use]
    pub fn defaults(&self) -> &Properties {
        &self.defaults
    }
}
