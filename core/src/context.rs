//! Runtime context: the facts a resolution is evaluated against.

use std::collections::HashMap;

/// Command-line invocation facts.
#[derive(Debug, Clone, Default)]
struct CommandLine {
    last_arg: Option<String>,
}

/// Snapshot of the runtime surroundings at resolution time.
///
/// Carries everything identity criteria can inspect: the machine
/// hostname, HTTP request facts for server invocations, and the trailing
/// argument for command-line invocations. A context is built once per
/// resolution by a provider (or by hand in tests) and only borrowed by
/// the registry; it is never stored.
///
/// The invocation mode is part of the context: a context is either a
/// server request or a command-line run, and command-line criteria can
/// only match the latter.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    hostname: String,
    http_host: Option<String>,
    script_dir: Option<String>,
    query: HashMap<String, String>,
    cli: Option<CommandLine>,
}

impl RuntimeContext {
    /// Create a server-request context.
    #[must_use]
    pub fn server(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            http_host: None,
            script_dir: None,
            query: HashMap::new(),
            cli: None,
        }
    }

    /// Create a command-line invocation context.
    #[must_use]
    pub fn command_line(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            http_host: None,
            script_dir: None,
            query: HashMap::new(),
            cli: Some(CommandLine::default()),
        }
    }

    /// Set the HTTP `Host` header value (builder pattern).
    #[must_use]
    pub fn with_http_host(mut self, host: impl Into<String>) -> Self {
        self.http_host = Some(host.into());
        self
    }

    /// Set the directory of the executing script (builder pattern).
    #[must_use]
    pub fn with_script_dir(mut self, dir: impl Into<String>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    /// Add a query parameter (builder pattern).
    ///
    /// Repeated names keep the last value set.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set the last command-line argument (builder pattern).
    ///
    /// Marks the context as a command-line invocation if it was not one
    /// already.
    #[must_use]
    pub fn with_last_arg(mut self, arg: impl Into<String>) -> Self {
        self.cli.get_or_insert_with(CommandLine::default).last_arg = Some(arg.into());
        self
    }

    /// Get the machine hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Get the HTTP `Host` header value, if the request carried one.
    #[must_use]
    pub fn http_host(&self) -> Option<&str> {
        self.http_host.as_deref()
    }

    /// Get the directory of the executing script, if known.
    #[must_use]
    pub fn script_dir(&self) -> Option<&str> {
        self.script_dir.as_deref()
    }

    /// Get a query parameter by name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Whether this context is a command-line invocation.
    #[must_use]
    pub fn is_command_line(&self) -> bool {
        self.cli.is_some()
    }

    /// Get the last command-line argument.
    ///
    /// `None` for server contexts and for command-line invocations that
    /// received no arguments.
    #[must_use]
    pub fn last_arg(&self) -> Option<&str> {
        self.cli.as_ref().and_then(|cli| cli.last_arg.as_deref())
    }
}
