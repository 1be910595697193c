//! Client configuration and its resolution against the environment.
//!
//! Resolution precedence follows the conventions of the native clients:
//!
//! - Address: explicit option, then `PULSE_SERVER`, else the per-user
//!   runtime socket `/run/user/<uid>/pulse/native`. A `unix://` prefix
//!   forces the Unix scheme and is stripped; otherwise the configured
//!   scheme applies (TCP by default for explicit addresses).
//! - Cookie: explicit option, then `PULSE_COOKIE`, else
//!   `$HOME/.config/pulse/cookie`.
//!
//! The precedence logic is written over plain values so it can be tested
//! without mutating the process environment.

use std::{env, path::PathBuf, time::Duration};

use crate::transport::{Endpoint, Scheme};

/// Client configuration. Every field is optional; unset fields fall back
/// to the environment and then to platform defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Server address override (`host:port`, a socket path, or a
    /// `unix://`-prefixed path)
    pub addr: Option<String>,
    /// Transport scheme for addresses without a `unix://` prefix
    pub protocol: Option<Scheme>,
    /// Authentication cookie path override
    pub cookie: Option<PathBuf>,
    /// Bound on each dial attempt
    pub dial_timeout: Option<Duration>,
    /// Bound on each request/reply exchange
    pub request_timeout: Option<Duration>,
}

/// Configuration with every fallback applied.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub endpoint: Endpoint,
    pub cookie: PathBuf,
    pub dial_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub(crate) fn resolve(self) -> Resolved {
        let endpoint = resolve_endpoint(
            self.addr.or_else(|| env_nonempty("PULSE_SERVER")),
            self.protocol,
            current_uid(),
        );
        let cookie = resolve_cookie(self.cookie, env_nonempty("PULSE_COOKIE"), env_nonempty("HOME"));
        Resolved {
            endpoint,
            cookie,
            dial_timeout: self.dial_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Pick the endpoint from an already-merged address option.
fn resolve_endpoint(addr: Option<String>, scheme: Option<Scheme>, uid: u32) -> Endpoint {
    match addr {
        Some(addr) => match addr.strip_prefix("unix://") {
            Some(path) => Endpoint { scheme: Scheme::Unix, addr: path.to_owned() },
            None => Endpoint { scheme: scheme.unwrap_or(Scheme::Tcp), addr },
        },
        None => Endpoint { scheme: Scheme::Unix, addr: format!("/run/user/{uid}/pulse/native") },
    }
}

/// Pick the cookie path from already-merged option and environment values.
fn resolve_cookie(cookie: Option<PathBuf>, env_cookie: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = cookie {
        return path;
    }
    if let Some(path) = env_cookie {
        return PathBuf::from(path);
    }
    PathBuf::from(home.unwrap_or_default()).join(".config/pulse/cookie")
}

/// Current uid, for the default per-user socket path.
fn current_uid() -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Ok(metadata) = std::fs::metadata("/proc/self") {
            return metadata.uid();
        }
    }
    0
}
