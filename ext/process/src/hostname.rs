//! Machine hostname lookup.
//!
//! Asks the OS first, then falls back to the `HOSTNAME` and `HOST`
//! environment variables, then to `"localhost"`. Lookup never fails; an
//! unnamed machine simply will not match hostname criteria for real names.

use std::env;

/// Best-effort hostname of the current machine.
#[must_use]
pub fn hostname() -> String {
    os_hostname()
        .or_else(|| var_non_empty("HOSTNAME"))
        .or_else(|| var_non_empty("HOST"))
        .unwrap_or_else(|| String::from("localhost"))
}

fn var_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn os_hostname() -> Option<String> {
    #[cfg(unix)]
    {
        let mut buf = [0u8; 256];
        // SAFETY: gethostname() writes at most buf.len() bytes into the
        // buffer we hand it and reports failure through its return code.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
        if rc != 0 {
            return None;
        }
        let len = buf.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&buf[..len])
            .ok()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
    }

    #[cfg(not(unix))]
    {
        None
    }
}
