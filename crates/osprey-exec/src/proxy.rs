//! Proxy URL sanitization shared by the native and container backends.
//!
//! A `proxy_url` from a run configuration ends up in the child environment
//! of an external process, so it is validated strictly: allowed scheme,
//! non-empty host, and nothing after the authority. An invalid value is
//! skipped with a warning — a bad proxy must never abort a tool run.

use std::collections::HashMap;

use tracing::warn;
use url::Url;

use crate::config::RunConfig;

/// Environment variables a valid proxy URL is exported under.
pub const PROXY_VARS: [&str; 3] = ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY"];

/// Schemes a proxy URL may use.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "socks4", "socks5", "socks4h", "socks5h"];

/// True when the URL is safe to hand to a child process as a proxy.
///
/// Accepted iff the scheme is one of [`ALLOWED_SCHEMES`], a non-empty host
/// is present, the path is empty or exactly `/`, and there is no query
/// string or fragment.
#[must_use]
pub fn is_valid_proxy_url(raw: &str) -> bool {
    let Ok(parsed) = Url::parse(raw) else {
        warn!(url = raw, "proxy URL does not parse");
        return false;
    };

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        warn!(url = raw, scheme = parsed.scheme(), "proxy scheme not allowed");
        return false;
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        warn!(url = raw, "proxy URL has no host");
        return false;
    }

    let path = parsed.path();
    if !(path.is_empty() || path == "/") || parsed.query().is_some() || parsed.fragment().is_some()
    {
        warn!(url = raw, "proxy URL carries path, query, or fragment");
        return false;
    }

    true
}

/// Environment additions for a child process under the given config.
///
/// A valid proxy URL sets all of [`PROXY_VARS`] to the original string; an
/// invalid one contributes nothing. `extra_env` is merged afterwards and
/// may override the proxy variables.
#[must_use]
pub fn child_env(config: &RunConfig) -> HashMap<String, String> {
    let mut env = HashMap::new();

    if let Some(proxy_url) = &config.proxy_url {
        if is_valid_proxy_url(proxy_url) {
            for var in PROXY_VARS {
                env.insert(var.to_string(), proxy_url.clone());
            }
        } else {
            warn!(url = %proxy_url, "invalid proxy URL, continuing without proxy");
        }
    }

    for (key, value) in &config.extra_env {
        env.insert(key.clone(), value.clone());
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_scheme() {
        for scheme in ALLOWED_SCHEMES {
            let url = format!("{scheme}://127.0.0.1:9050");
            assert!(is_valid_proxy_url(&url), "{url}");
        }
    }

    #[test]
    fn accepts_trailing_slash_only_path() {
        assert!(is_valid_proxy_url("http://proxy.example:8080/"));
    }

    #[test]
    fn rejects_disallowed_scheme() {
        assert!(!is_valid_proxy_url("ftp://bad"));
        assert!(!is_valid_proxy_url("file:///etc/passwd"));
    }

    #[test]
    fn rejects_missing_host() {
        assert!(!is_valid_proxy_url("http://"));
        assert!(!is_valid_proxy_url("not a url"));
    }

    #[test]
    fn rejects_path_query_and_fragment() {
        assert!(!is_valid_proxy_url("http://proxy.example/path"));
        assert!(!is_valid_proxy_url("http://proxy.example/?q=1"));
        assert!(!is_valid_proxy_url("http://proxy.example/#frag"));
    }

    #[test]
    fn valid_proxy_sets_all_three_vars() {
        let config = RunConfig::new().with_proxy_url("socks5h://127.0.0.1:9050");
        let env = child_env(&config);
        for var in PROXY_VARS {
            assert_eq!(env.get(var).map(String::as_str), Some("socks5h://127.0.0.1:9050"));
        }
    }

    #[test]
    fn invalid_proxy_contributes_nothing() {
        let config = RunConfig::new().with_proxy_url("ftp://bad");
        let env = child_env(&config);
        assert!(env.is_empty(), "invalid proxy must be skipped, not exported");
    }

    #[test]
    fn extra_env_merges_after_proxy() {
        let config = RunConfig::new()
            .with_proxy_url("http://proxy.example:3128")
            .with_env("ALL_PROXY", "direct://")
            .with_env("TOOL_FLAG", "1");
        let env = child_env(&config);
        assert_eq!(env.get("HTTP_PROXY").map(String::as_str), Some("http://proxy.example:3128"));
        assert_eq!(env.get("ALL_PROXY").map(String::as_str), Some("direct://"));
        assert_eq!(env.get("TOOL_FLAG").map(String::as_str), Some("1"));
    }
}
