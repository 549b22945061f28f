//! Raw request inputs the parsers read from.
//!
//! The dispatch core never touches the process or a server directly. An adapter
//! captures what it needs into one of these snapshots and hands it to the parsers:
//!
//! - [`HttpSource`]: method, headers and server information of a web request.
//! - [`CliArgs`]: named command line arguments of a CLI invocation.
//! - [`EnvSource`]: environment variables and the system hostname.

use {
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
    std::{collections::HashMap, env},
};

/// Server side facts about a web request that are not carried in headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    /// Address of the directly connected peer.
    pub remote_addr: Option<String>,
    /// Whether the request arrived over TLS.
    pub tls: bool,
    /// Configured server name.
    pub server_name: Option<String>,
    /// Port the request arrived on.
    pub server_port: Option<String>,
    /// Path of the entry point script, e.g. `/app/index.php`.
    pub script_name: Option<String>,
}

/// Snapshot of an incoming web request.
///
/// ```
/// use corona::HttpSource;
///
/// let source = HttpSource::new()
///     .with_method("POST")
///     .with_header("Api-Version", "2");
///
/// assert_eq!(source.method(), Some("POST"));
/// assert_eq!(source.header("api-version"), Some("2"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    method: Option<String>,
    headers: HeaderMap,
    server: ServerInfo,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures method and headers from the head of an `http` request.
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: Some(parts.method.as_str().to_string()),
            headers: parts.headers.clone(),
            server: ServerInfo::default(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a header. Names and values that are not valid HTTP are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid request header"),
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_server(mut self, server: ServerInfo) -> Self {
        self.server = server;
        self
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Value of the first header with this name, matched case-insensitively.
    /// Headers that are not valid UTF-8 count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }
}

/// Named command line arguments.
///
/// An argument may be given several times; parsers read the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    args: HashMap<String, Vec<String>>,
}

impl CliArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.entry(name.into()).or_default().push(value.into());
        self
    }

    /// First value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values given for `name`, in order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.args.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for CliArgs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CliArgs::new(), |args, (name, value)| args.with_arg(name, value))
    }
}

/// Snapshot of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    hostname: Option<String>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the environment of the current process.
    ///
    /// Variables that are not valid Unicode are skipped, as is a hostname that is
    /// empty or not valid Unicode.
    pub fn capture() -> Self {
        let hostname = gethostname::gethostname()
            .into_string()
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            vars: env::vars_os()
                .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
            hostname,
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Hostname as reported by the operating system.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_headers_are_case_insensitive() {
        let source = HttpSource::new().with_header("X-Trace-Id", "abc");
        assert_eq!(source.header("x-trace-id"), Some("abc"));
        assert_eq!(source.header("X-TRACE-ID"), Some("abc"));
        assert_eq!(source.header("X-Span-Id"), None);
    }

    #[test]
    fn test_http_source_skips_invalid_header() {
        let source = HttpSource::new().with_header("bad header", "x");
        assert!(source.headers().is_empty());
    }

    #[test]
    fn test_http_source_from_parts() {
        let (parts, _) = http::Request::builder()
            .method("DELETE")
            .header("Host", "example.com")
            .body(())
            .unwrap()
            .into_parts();

        let source = HttpSource::from_parts(&parts);
        assert_eq!(source.method(), Some("DELETE"));
        assert_eq!(source.header("host"), Some("example.com"));
        assert_eq!(source.server(), &ServerInfo::default());
    }

    #[test]
    fn test_cli_args_first_value_wins() {
        let args: CliArgs = [("action", "get"), ("action", "post")].into_iter().collect();
        assert_eq!(args.get("action"), Some("get"));
        assert_eq!(args.get_all("action"), ["get", "post"]);
        assert_eq!(args.get("missing"), None);
        assert!(args.get_all("missing").is_empty());
    }

    #[test]
    fn test_env_source_builders() {
        let env = EnvSource::new()
            .with_var("ENVIRONMENT", "staging")
            .with_hostname("web01");
        assert_eq!(env.var("ENVIRONMENT"), Some("staging"));
        assert_eq!(env.var("HOSTNAME"), None);
        assert_eq!(env.hostname(), Some("web01"));
    }

    #[test]
    fn test_env_source_capture_reads_process_env() {
        unsafe { std::env::set_var("CORONA_SOURCE_TEST_VAR", "1") };
        let env = EnvSource::capture();
        unsafe { std::env::remove_var("CORONA_SOURCE_TEST_VAR") };
        assert_eq!(env.var("CORONA_SOURCE_TEST_VAR"), Some("1"));
    }

    #[test]
    fn test_env_source_capture_reads_system_hostname() {
        let env = EnvSource::capture();
        let hostname = env.hostname().expect("system hostname");
        assert!(!hostname.is_empty());
        assert_eq!(hostname, hostname.trim());
    }
}
