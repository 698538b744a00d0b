//! Resolve benchmarks: the hot path.
//!
//! Measures: single-rule resolution, miss-to-catch-all, multi-criterion
//! identities, rule-count scaling, registration cost, and trace overhead.

use milieu::prelude::*;
use serde_json::json;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test fixtures
// ═══════════════════════════════════════════════════════════════════════════════

fn props(value: serde_json::Value) -> Properties {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("props() takes a JSON object"),
    }
}

fn hostname_identity(hostname: &str) -> Identity {
    Identity {
        hostname: Some(hostname.to_string()),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: single rule
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn single_rule_hit(bencher: divan::Bencher) {
    let mut environments = Environments::new(props(json!({"debug": false})));
    environments.register(hostname_identity("web-1"), props(json!({"name": "prod"})));
    let ctx = RuntimeContext::server("web-1");

    bencher.bench_local(|| environments.resolve(&ctx));
}

#[divan::bench]
fn miss_then_catch_all(bencher: divan::Bencher) {
    let mut environments = Environments::new(props(json!({"debug": false})));
    environments.register(hostname_identity("web-1"), props(json!({"name": "prod"})));
    environments.register(Identity::any(), props(json!({"name": "local"})));
    let ctx = RuntimeContext::server("laptop.lan");

    bencher.bench_local(|| environments.resolve(&ctx));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: multi-criterion identity
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn multi_criterion_hit(bencher: divan::Bencher) {
    let identity = Identity {
        hostname: Some("web-1".to_string()),
        http_host: Some("app.example.com".to_string()),
        query: Some(
            [("tenant", "acme"), ("feature", "beta")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    };
    let mut environments = Environments::new(Properties::new());
    environments.register(identity, props(json!({"name": "beta-tenant"})));

    let ctx = RuntimeContext::server("web-1")
        .with_http_host("app.example.com")
        .with_query_param("tenant", "acme")
        .with_query_param("feature", "beta")
        .with_query_param("utm_source", "promo");

    bencher.bench_local(|| environments.resolve(&ctx));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: rule count (first-match-wins scan cost)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 50, 100, 200])]
fn rule_count_last_match(bencher: divan::Bencher, n: usize) {
    let mut environments = Environments::new(Properties::new());
    for i in 0..n - 1 {
        environments.register(
            hostname_identity(&format!("rule-{i}")),
            props(json!({"name": format!("env_{i}")})),
        );
    }
    environments.register(hostname_identity("target"), props(json!({"name": "found"})));
    let ctx = RuntimeContext::server("target");

    // Worst case: the match sits at the end, so every rule is consulted.
    bencher.bench_local(|| environments.resolve(&ctx));
}

#[divan::bench(args = [1, 10, 50, 100, 200])]
fn rule_count_miss(bencher: divan::Bencher, n: usize) {
    let mut environments = Environments::with_fallback(Properties::new());
    for i in 0..n {
        environments.register(
            hostname_identity(&format!("rule-{i}")),
            props(json!({"name": format!("env_{i}")})),
        );
    }
    let ctx = RuntimeContext::server("no-such-host");

    // Full scan: nothing matches, the defaults come back.
    bencher.bench_local(|| environments.resolve(&ctx));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registration cost (digest + merge per rule)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn register_rule(bencher: divan::Bencher) {
    let defaults = props(json!({"log_level": "info", "debug": false}));
    let properties = props(json!({"name": "prod", "db": "postgres://prod"}));

    bencher.bench_local(|| {
        let mut environments = Environments::new(defaults.clone());
        environments.register(hostname_identity("web-1"), properties.clone());
        environments
    });
}

#[divan::bench]
fn identity_digest(bencher: divan::Bencher) {
    let identity = Identity {
        hostname: Some("web-1".to_string()),
        http_host: Some("app.example.com".to_string()),
        ..Default::default()
    };

    bencher.bench_local(|| identity.digest());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Trace overhead: resolve vs resolve_with_trace
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn trace_overhead_resolve(bencher: divan::Bencher) {
    let mut environments = Environments::new(Properties::new());
    environments.register(hostname_identity("miss-1"), props(json!({"name": "a"})));
    environments.register(hostname_identity("miss-2"), props(json!({"name": "b"})));
    environments.register(hostname_identity("hit"), props(json!({"name": "c"})));
    let ctx = RuntimeContext::server("hit");

    bencher.bench_local(|| environments.resolve(&ctx));
}

#[divan::bench]
fn trace_overhead_with_trace(bencher: divan::Bencher) {
    let mut environments = Environments::new(Properties::new());
    environments.register(hostname_identity("miss-1"), props(json!({"name": "a"})));
    environments.register(hostname_identity("miss-2"), props(json!({"name": "b"})));
    environments.register(hostname_identity("hit"), props(json!({"name": "c"})));
    let ctx = RuntimeContext::server("hit");

    bencher.bench_local(|| environments.resolve_with_trace(&ctx));
}
