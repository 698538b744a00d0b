//! Criteria: compiled identity requirements evaluated against a context.
//!
//! Each [`Criterion`] pairs one context fact with the exact value it must
//! equal. An [`Identity`](crate::Identity) compiles to a list of criteria,
//! all of which must hold for the identity to match.

use crate::RuntimeContext;
use std::fmt;

/// One compiled identity requirement.
///
/// Comparison is exact and case-sensitive for every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Machine hostname equals the value.
    Hostname(String),
    /// HTTP `Host` header equals the value.
    HttpHost(String),
    /// Directory of the executing script equals the value.
    ScriptDir(String),
    /// Query parameter `name` is present with exactly `value`.
    QueryParam {
        /// The parameter name to look up.
        name: String,
        /// The value the parameter must equal.
        value: String,
    },
    /// Command-line invocation whose last argument equals the value.
    CliLastArg(String),
}

impl Criterion {
    /// Evaluate this criterion against a context.
    ///
    /// A fact the context does not carry never matches: a `HttpHost`
    /// criterion is false for a context without a `Host` header, and a
    /// `CliLastArg` criterion is false for any server context. Absence is
    /// a non-match, not an error.
    #[must_use]
    pub fn evaluate(&self, ctx: &RuntimeContext) -> bool {
        match self {
            Self::Hostname(expected) => ctx.hostname() == expected,
            Self::HttpHost(expected) => ctx.http_host().is_some_and(|host| host == expected),
            Self::ScriptDir(expected) => ctx.script_dir().is_some_and(|dir| dir == expected),
            Self::QueryParam { name, value } => {
                ctx.query_param(name).is_some_and(|actual| actual == value)
            }
            // last_arg() is None for server contexts, so this also
            // enforces the invocation-mode gate.
            Self::CliLastArg(expected) => ctx.last_arg().is_some_and(|arg| arg == expected),
        }
    }

    /// The context fact this criterion inspects, e.g. `hostname` or
    /// `query[env]`.
    #[must_use]
    pub fn fact(&self) -> String {
        match self {
            Self::Hostname(_) => "hostname".into(),
            Self::HttpHost(_) => "http_host".into(),
            Self::ScriptDir(_) => "script_dir".into(),
            Self::QueryParam { name, .. } => format!("query[{name}]"),
            Self::CliLastArg(_) => "cli_last_arg".into(),
        }
    }

    /// The exact value this criterion requires.
    #[must_use]
    pub fn expected(&self) -> &str {
        match self {
            Self::Hostname(value)
            | Self::HttpHost(value)
            | Self::ScriptDir(value)
            | Self::CliLastArg(value) => value,
            Self::QueryParam { value, .. } => value,
        }
    }

    /// The fact's current value in the context, if present.
    #[must_use]
    pub fn actual<'ctx>(&self, ctx: &'ctx RuntimeContext) -> Option<&'ctx str> {
        match self {
            Self::Hostname(_) => Some(ctx.hostname()),
            Self::HttpHost(_) => ctx.http_host(),
            Self::ScriptDir(_) => ctx.script_dir(),
            Self::QueryParam { name, .. } => ctx.query_param(name),
            Self::CliLastArg(_) => ctx.last_arg(),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == \"{}\"", self.fact(), self.expected())
    }
}
