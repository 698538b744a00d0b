//! Server (CGI) invocation facts.
//!
//! A process counts as server-invoked when the web server has set the usual
//! CGI variables. The individual facts come straight from those variables:
//! `HTTP_HOST` as-is, the directory of `SCRIPT_NAME`, and `QUERY_STRING`
//! split into decoded pairs.

use std::env;

/// Whether the current process was invoked by a web server.
///
/// Checks for `REQUEST_METHOD` or `GATEWAY_INTERFACE`, the variables every
/// CGI-style server sets before handing off a request.
#[must_use]
pub fn is_server_invocation() -> bool {
    env::var_os("REQUEST_METHOD").is_some() || env::var_os("GATEWAY_INTERFACE").is_some()
}

/// The request's `Host` header as passed along by the server, if any.
pub(crate) fn http_host() -> Option<String> {
    env::var("HTTP_HOST").ok().filter(|host| !host.is_empty())
}

/// Directory of the served script, if the server reports one.
pub(crate) fn script_dir() -> Option<String> {
    env::var("SCRIPT_NAME")
        .ok()
        .filter(|name| !name.is_empty())
        .map(|name| dirname(&name))
}

/// Decoded query parameters in document order.
pub(crate) fn query_params() -> Vec<(String, String)> {
    env::var("QUERY_STRING")
        .map(|query| parse_query_string(&query))
        .unwrap_or_default()
}

/// Directory component of a path, POSIX `dirname` style.
///
/// Trailing slashes are ignored; a path with no slash has directory `"."`,
/// and the root's directory is `"/"`.
#[must_use]
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." }.to_string();
    }
    match trimmed.rfind('/') {
        None => ".".to_string(),
        Some(idx) => {
            let parent = trimmed[..idx].trim_end_matches('/');
            if parent.is_empty() {
                "/".to_string()
            } else {
                parent.to_string()
            }
        }
    }
}

/// Split a raw query string into decoded name/value pairs, in order.
///
/// Bare names get an empty value, empty segments and empty names are
/// dropped, and `+` decodes as a space.
#[must_use]
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            let name = percent_decode(name);
            if name.is_empty() {
                return None;
            }
            Some((name, percent_decode(value)))
        })
        .collect()
}

/// Decode percent escapes and `+`; malformed escapes pass through literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'+' {
            out.push(b' ');
            i += 1;
        } else if b == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            }
        } else {
            out.push(b);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
