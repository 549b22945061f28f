use {
    crate::{Error, HttpSource, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser},
    std::sync::Arc,
};

/// Resolves the components of the URL the request was served under.
///
/// | key | source |
/// |---|---|
/// | protocol | `X-Forwarded-Proto`, else `https` over TLS, else `http` |
/// | domain | `Host` header, else the server name |
/// | port | the server port |
/// | base path | the script name with the entry point removed |
/// | base URL | assembled from the four above |
///
/// Every component is resolved on first use and independently of the others.
///
/// ```
/// use std::sync::Arc;
/// use corona::{HttpSource, ServerInfo, UrlParser, Value, ValueKey, ValueParser};
///
/// let source = HttpSource::new()
///     .with_header("Host", "www.example.com")
///     .with_server(ServerInfo {
///         tls: true,
///         server_port: Some("443".into()),
///         script_name: Some("/app/index.php".into()),
///         ..ServerInfo::default()
///     });
///
/// let parser = UrlParser::new(Arc::new(source));
/// assert_eq!(
///     parser.get(ValueKey::BaseUrl).unwrap(),
///     Some(Value::from("https://www.example.com/app/"))
/// );
/// ```
#[derive(Debug)]
pub struct UrlParser {
    source: Arc<HttpSource>,
    entry_point: String,
    protocol: LazyValue<String>,
    domain: LazyValue<String>,
    port: LazyValue<String>,
    base_path: LazyValue<String>,
    base_url: LazyValue<String>,
}

impl UrlParser {
    pub const DEFAULT_ENTRY_POINT: &'static str = "index.php";

    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            entry_point: Self::DEFAULT_ENTRY_POINT.to_string(),
            protocol: LazyValue::new(),
            domain: LazyValue::new(),
            port: LazyValue::new(),
            base_path: LazyValue::new(),
            base_url: LazyValue::new(),
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    fn protocol(&self) -> Option<&String> {
        self.protocol.get_ref(|| {
            let protocol = match self.source.header("X-Forwarded-Proto") {
                Some(forwarded) => forwarded.to_string(),
                None if self.source.server().tls => "https".to_string(),
                None => "http".to_string(),
            };
            Some(protocol)
        })
    }

    fn domain_name(&self) -> Option<&String> {
        self.domain.get_ref(|| {
            self.source
                .header(http::header::HOST.as_str())
                .map(str::to_string)
                .or_else(|| self.source.server().server_name.clone())
        })
    }

    fn port(&self) -> Option<&String> {
        self.port
            .get_ref(|| self.source.server().server_port.clone())
    }

    fn base_path(&self) -> Option<&String> {
        self.base_path.get_ref(|| {
            let script = self.source.server().script_name.as_deref()?;
            if self.entry_point.is_empty() {
                return Some(script.to_string());
            }
            Some(script.replace(&self.entry_point, ""))
        })
    }

    fn base_url(&self) -> Option<&String> {
        self.base_url.get_ref(|| {
            let protocol = self.protocol().map(String::as_str);
            let port = self.port();

            let mut url = String::new();
            if let Some(domain) = self.domain_name() {
                if let Some(protocol) = protocol {
                    url.push_str(protocol);
                    url.push_str("://");
                }
                url.push_str(domain);

                if let Some(port) = port {
                    let number = port.trim().parse::<u16>().ok();
                    let keep = match protocol {
                        Some("http") => number != Some(80),
                        Some("https") => number != Some(443),
                        _ => false,
                    };
                    if keep {
                        url.push(':');
                        url.push_str(port);
                    }
                }
            }

            url.push_str(self.base_path().map_or("/", String::as_str));
            Some(url)
        })
    }
}

impl ValueParser for UrlParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Url
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        let value = match key {
            ValueKey::Protocol => self.protocol(),
            ValueKey::Domain => self.domain_name(),
            ValueKey::Port => self.port(),
            ValueKey::BasePath => self.base_path(),
            ValueKey::BaseUrl => self.base_url(),
            _ => return Err(Error::unsupported_value(key)),
        };
        Ok(value.map(|value| Value::String(value.clone())))
    }
}
