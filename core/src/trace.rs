//! Evaluation traces: why a rule did or did not match.
//!
//! Trace types mirror the runtime evaluation but capture per-criterion
//! results instead of a bare boolean. Every criterion is evaluated (no
//! short-circuit) so a failed trace shows all failing criteria at once.
//!
//! # Example
//!
//! ```ignore
//! let (result, traces) = environments.resolve_with_trace(&ctx);
//! for rule in &traces {
//!     println!("rule[{}] {} matched={}", rule.index, rule.id, rule.trace.matched);
//! }
//! ```

use crate::{Criterion, Identity, RuntimeContext};

/// Placeholder rendered when the context lacks the inspected fact.
const MISSING: &str = "<missing>";

/// Placeholder rendered when a command-line criterion meets a server
/// context.
const NOT_CLI: &str = "<not cli>";

/// Result of tracing one identity against a context.
#[derive(Debug)]
pub struct IdentityTrace {
    /// Whether the identity matched (all steps matched).
    pub matched: bool,
    /// Per-criterion steps, in criterion order. Empty for the catch-all.
    pub steps: Vec<CriterionStep>,
}

/// One criterion's evaluation in a trace.
#[derive(Debug)]
pub struct CriterionStep {
    /// The inspected fact, e.g. `hostname` or `query[env]`.
    pub fact: String,
    /// The exact value the criterion requires.
    pub expected: String,
    /// The value found in the context, or a placeholder for absent facts.
    pub actual: String,
    /// Whether this criterion held.
    pub matched: bool,
}

/// One consulted rule in a resolution trace.
#[derive(Debug)]
pub struct RuleTrace {
    /// Position of the rule in registration order.
    pub index: usize,
    /// The rule's identity digest.
    pub id: String,
    /// Per-criterion trace for the rule's identity.
    pub trace: IdentityTrace,
}

impl Identity {
    /// Trace this identity against a context, reporting per-criterion
    /// results.
    ///
    /// Use this to answer "why did this environment win?" or "why didn't
    /// it match?".
    #[must_use]
    pub fn trace(&self, ctx: &RuntimeContext) -> IdentityTrace {
        let steps: Vec<CriterionStep> = self
            .to_criteria()
            .iter()
            .map(|criterion| trace_step(criterion, ctx))
            .collect();
        let matched = steps.iter().all(|step| step.matched);
        IdentityTrace { matched, steps }
    }
}

fn trace_step(criterion: &Criterion, ctx: &RuntimeContext) -> CriterionStep {
    let actual = match criterion {
        Criterion::CliLastArg(_) if !ctx.is_command_line() => NOT_CLI.to_string(),
        _ => criterion
            .actual(ctx)
            .map_or_else(|| MISSING.to_string(), str::to_string),
    };
    CriterionStep {
        fact: criterion.fact(),
        expected: criterion.expected().to_string(),
        actual,
        matched: criterion.evaluate(ctx),
    }
}
