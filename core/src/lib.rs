//! milieu - environment resolution by runtime identity
//!
//! A registry that answers one question: *which named environment does this
//! process belong to, and with what configuration?* Environments (local,
//! staging, production, a teammate's laptop) are registered with an identity
//! describing where they apply; resolution matches the current runtime
//! context against those identities and returns the first winner's merged
//! properties.
//!
//! # Architecture
//!
//! - [`RuntimeContext`] — facts about the current run (hostname, HTTP host,
//!   script directory, query parameters, last command-line argument)
//! - [`Identity`] — declarative description of where an environment applies
//! - [`Criterion`] — one compiled fact check (exact, case-sensitive equality)
//! - [`Environments`] — ordered rules over shared defaults, first-match-wins
//! - [`EnvironmentsConfig`] — serde mirror for JSON/YAML-driven construction
//! - [`IdentityTrace`] / [`RuleTrace`] — per-criterion evaluation traces
//!
//! # Key Design Insights
//!
//! 1. **First match wins**: rules are scanned in registration order, so
//!    registration order is precedence order. Specific identities go first,
//!    the catch-all goes last.
//!
//! 2. **Absent facts never match**: a criterion against a fact the context
//!    does not carry (no HTTP host, not a command-line run) evaluates to
//!    `false`. Resolution never errors on a missing fact.
//!
//! 3. **Empty identity matches everything**: [`Identity::any()`] has no
//!    criteria and its conjunction is vacuously true. It is the fallback
//!    rule, not an error.
//!
//! # Example
//!
//! ```
//! use milieu::prelude::*;
//! use serde_json::json;
//!
//! let defaults = json!({"debug": false});
//! let mut environments = Environments::new(defaults.as_object().unwrap().clone());
//!
//! // Specific identities first, catch-all last.
//! environments.register(
//!     Identity { hostname: Some("prod-web-1".into()), ..Default::default() },
//!     json!({"name": "production"}).as_object().unwrap().clone(),
//! );
//! environments.register(
//!     Identity::any(),
//!     json!({"name": "local", "debug": true}).as_object().unwrap().clone(),
//! );
//!
//! let ctx = RuntimeContext::server("laptop.lan");
//! let props = environments.resolve(&ctx).unwrap();
//! assert_eq!(props["name"], json!("local"));
//! assert_eq!(props["debug"], json!(true));
//!
//! // Every resolved environment carries its identity digest under "id".
//! assert!(props.contains_key("id"));
//! ```
//!
//! # Extensions
//!
//! Process integration lives outside the core crate:
//!
//! - [`milieu-process`](https://docs.rs/milieu-process) — captures a
//!   [`RuntimeContext`] from the live process (separate crate)
//! - `milieu-cli` — `milieu` command-line front end over a config file
//!   (separate crate)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod config;
mod context;
mod criterion;
mod identity;
mod properties;
mod registry;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use context::RuntimeContext;
pub use criterion::Criterion;
pub use identity::Identity;
pub use properties::{merge_over, Properties};
pub use registry::Environments;

// Config types
pub use config::{AnySentinel, EnvironmentConfig, EnvironmentsConfig, IdentityConfig};

// Trace types
pub use trace::{CriterionStep, IdentityTrace, RuleTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use milieu::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        Criterion,
        // Trace types
        CriterionStep,
        Environments,
        // Config types
        EnvironmentsConfig,
        Identity,
        IdentityTrace,
        Properties,
        // Errors
        ResolveError,
        RuleTrace,
        RuntimeContext,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Key under which an environment's identity digest appears in its resolved
/// properties.
///
/// The digest always occupies this key. A value supplied for `"id"` in an
/// environment's own properties is overwritten at registration time, so the
/// key is a stable, collision-free handle on the winning rule.
pub const ID_KEY: &str = "id";

/// Config sentinel for the catch-all identity.
///
/// Writing `identity: any` in a config document registers [`Identity::any()`].
/// Only this exact string is accepted; see [`IdentityConfig`].
pub const ANY_SENTINEL: &str = "any";

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from environment resolution.
///
/// Resolution is infallible in non-strict registries; only a strict registry
/// with no matching rule produces an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No registered rule matched the context and the registry is strict.
    NoMatchingEnvironment {
        /// How many rules were consulted.
        rules: usize,
    },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatchingEnvironment { rules } => {
                write!(
                    f,
                    "no environment matched the current context ({rules} rules consulted); \
                     register a catch-all identity or use a non-strict registry"
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}
