//! milieu-process: runtime context capture from the live process
//!
//! Builds a [`RuntimeContext`] out of what the current process can see: the
//! machine hostname, the CGI variables when running behind a web server, and
//! the argument tail when running from a shell.
//!
//! # Detection
//!
//! ```text
//! REQUEST_METHOD or GATEWAY_INTERFACE set?
//!   yes: server context (HTTP_HOST, dirname of SCRIPT_NAME, QUERY_STRING)
//!   no:  command-line context (final std::env::args() argument)
//! ```
//!
//! # Example
//!
//! ```
//! use milieu_process::capture;
//!
//! let ctx = capture();
//! assert!(!ctx.hostname().is_empty());
//! ```

use milieu::RuntimeContext;

mod cli;
mod hostname;
mod server;

pub use cli::last_arg;
pub use hostname::hostname;
pub use server::{dirname, is_server_invocation, parse_query_string};

/// Capture a [`RuntimeContext`] from the current process.
///
/// Server invocations (detected via [`is_server_invocation`]) carry the HTTP
/// host, script directory and query parameters from the CGI variables.
/// Anything else counts as a command-line run carrying the final argument of
/// `std::env::args()`.
///
/// Repeated query parameter names keep the last occurrence, matching how
/// web stacks flatten query strings into a map.
#[must_use]
pub fn capture() -> RuntimeContext {
    let host = hostname::hostname();
    if server::is_server_invocation() {
        let mut ctx = RuntimeContext::server(host);
        if let Some(http_host) = server::http_host() {
            ctx = ctx.with_http_host(http_host);
        }
        if let Some(dir) = server::script_dir() {
            ctx = ctx.with_script_dir(dir);
        }
        for (name, value) in server::query_params() {
            ctx = ctx.with_query_param(name, value);
        }
        ctx
    } else {
        let mut ctx = RuntimeContext::command_line(host);
        if let Some(arg) = cli::last_arg() {
            ctx = ctx.with_last_arg(arg);
        }
        ctx
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{capture, hostname, last_arg};
    pub use milieu::prelude::*;
}
