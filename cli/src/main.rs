//! milieu CLI: driving adapter for the environment registry.
//!
//! Subcommands:
//! - `resolve <config> [--context key=value...]` prints the winning environment
//! - `check <config>` validates the config and lists its rules
//! - `explain <config> [--context key=value...]` traces every rule

use std::collections::HashMap;
use std::process;

use milieu::{EnvironmentsConfig, Identity, RuntimeContext};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "resolve" => cmd_resolve(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "explain" => cmd_explain(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("resolve requires a config file path".into());
    }

    let config_path = &args[0];
    let overrides = parse_context(&args[1..])?;

    let config = load_config(config_path)?;
    let environments = config.build();
    let ctx = build_context(&overrides)?;

    let properties = environments.resolve(&ctx).map_err(|e| e.to_string())?;
    let rendered = serde_json::to_string_pretty(properties)
        .map_err(|e| format!("failed to render properties: {e}"))?;
    println!("{rendered}");

    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a config file path".into());
    }

    let config_path = &args[0];
    let config = load_config(config_path)?;
    let environments = config.build();

    println!("Config valid");
    println!(
        "{} rules, {} mode",
        environments.len(),
        if environments.is_strict() {
            "strict"
        } else {
            "fallback"
        }
    );
    for (index, (id, identity)) in environments.rules().enumerate() {
        println!("  [{index}] {id} {}", describe_identity(identity));
    }

    Ok(())
}

fn cmd_explain(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("explain requires a config file path".into());
    }

    let config_path = &args[0];
    let overrides = parse_context(&args[1..])?;

    let config = load_config(config_path)?;
    let environments = config.build();
    let ctx = build_context(&overrides)?;

    let (result, traces) = environments.resolve_with_trace(&ctx);

    for rule in &traces {
        let verdict = if rule.trace.matched { "MATCH" } else { "miss" };
        println!("[{}] {} {}", rule.index, rule.id, verdict);
        if rule.trace.steps.is_empty() {
            println!("      catch-all");
        }
        for step in &rule.trace.steps {
            let mark = if step.matched { "ok" } else { "FAIL" };
            println!(
                "      {mark:4} {} expected {:?}, actual {:?}",
                step.fact, step.expected, step.actual
            );
        }
    }

    match result {
        Ok(properties) => {
            let rendered = serde_json::to_string_pretty(properties)
                .map_err(|e| format!("failed to render properties: {e}"))?;
            println!("{rendered}");
        }
        Err(e) => println!("{e}"),
    }

    Ok(())
}

fn describe_identity(identity: &Identity) -> String {
    if identity.is_catch_all() {
        return "any".to_string();
    }
    identity
        .to_criteria()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" && ")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<EnvironmentsConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Context assembly
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_context(args: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--context" {
            i += 1;
            while i < args.len() && !args[i].starts_with("--") {
                let pair = &args[i];
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    format!("invalid context pair \"{pair}\", expected key=value")
                })?;
                map.insert(key.to_owned(), value.to_owned());
                i += 1;
            }
        } else {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        }
    }

    Ok(map)
}

/// Build the resolution context: the live process by default, a synthetic
/// context when any override is given.
///
/// A synthetic context starts from nothing except the machine hostname, so
/// `--context` answers "what would resolve there" without mixing in facts
/// from this invocation. `last_arg` implies a command-line context unless
/// `cli=false` contradicts it.
fn build_context(overrides: &HashMap<String, String>) -> Result<RuntimeContext, String> {
    if overrides.is_empty() {
        return Ok(milieu_process::capture());
    }

    let hostname = overrides
        .get("hostname")
        .cloned()
        .unwrap_or_else(milieu_process::hostname);

    let cli = match overrides.get("cli").map(String::as_str) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(format!(
                "invalid cli value \"{other}\", expected true or false"
            ))
        }
        None => None,
    };
    let has_last_arg = overrides.contains_key("last_arg");
    if cli == Some(false) && has_last_arg {
        return Err("last_arg requires a command-line context".into());
    }

    let mut ctx = if cli.unwrap_or(has_last_arg) {
        RuntimeContext::command_line(hostname)
    } else {
        RuntimeContext::server(hostname)
    };

    for (key, value) in overrides {
        match key.as_str() {
            "hostname" | "cli" => {}
            "http_host" => ctx = ctx.with_http_host(value),
            "script_dir" => ctx = ctx.with_script_dir(value),
            "last_arg" => ctx = ctx.with_last_arg(value),
            other => {
                if let Some(name) = other.strip_prefix("query.") {
                    ctx = ctx.with_query_param(name, value);
                } else {
                    return Err(format!("unknown context key \"{other}\""));
                }
            }
        }
    }

    Ok(ctx)
}

fn print_usage() {
    eprintln!(
        "Usage: milieu <command> [options]

Commands:
  resolve <config> [--context key=value...]   Resolve and print the environment
  check <config>                              Validate config and list rules
  explain <config> [--context key=value...]   Trace every rule for the context
  help                                        Show this help

Context keys:
  hostname, http_host, script_dir, last_arg, cli (true/false), query.<name>
  Without --context, facts come from the current process."
    );
}
