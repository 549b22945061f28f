//! Request value identifiers and results.

use {
    crate::{ApiVersion, Error, Result},
    serde::{Deserialize, Deserializer},
    std::{
        any::{Any, TypeId},
        borrow::Cow,
        fmt,
        str::FromStr,
        sync::Arc,
    },
};

/// A category of request data served by exactly one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDomain {
    Action,
    Analytics,
    ApiVersion,
    BearerToken,
    Client,
    ClientVersion,
    Environment,
    Host,
    RouteInfo,
    TracingInfo,
    Url,
    /// Application defined domain, identified by name.
    Custom(&'static str),
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueDomain::Action => "Action",
            ValueDomain::Analytics => "Analytics",
            ValueDomain::ApiVersion => "ApiVersion",
            ValueDomain::BearerToken => "BearerToken",
            ValueDomain::Client => "Client",
            ValueDomain::ClientVersion => "ClientVersion",
            ValueDomain::Environment => "Environment",
            ValueDomain::Host => "Host",
            ValueDomain::RouteInfo => "RouteInfo",
            ValueDomain::TracingInfo => "TracingInfo",
            ValueDomain::Url => "Url",
            ValueDomain::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// Key of an application defined request value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomKey {
    pub domain: &'static str,
    pub name: &'static str,
}

/// Identifier of a single request value.
///
/// Every key belongs to exactly one [`ValueDomain`]; the [`Request`](crate::Request)
/// uses the domain to pick the parser.
///
/// ```
/// use corona::{ValueDomain, ValueKey};
///
/// assert_eq!(ValueKey::BaseUrl.domain(), ValueDomain::Url);
/// assert_eq!(ValueKey::BaseUrl.to_string(), "Url::baseUrl");
/// assert_eq!("client".parse::<ValueKey>().unwrap(), ValueKey::Client);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Action,
    AnalyticsEnabled,
    ApiVersion,
    BearerToken,
    Client,
    ClientVersion,
    Environment,
    Host,
    RouteGroup,
    RouteName,
    TraceId,
    SpanId,
    ParentSpanId,
    Protocol,
    Domain,
    Port,
    BasePath,
    BaseUrl,
    Custom(CustomKey),
}

/// Keys that can be named in configuration.
const BUILTIN_KEYS: [ValueKey; 18] = [
    ValueKey::Action,
    ValueKey::AnalyticsEnabled,
    ValueKey::ApiVersion,
    ValueKey::BearerToken,
    ValueKey::Client,
    ValueKey::ClientVersion,
    ValueKey::Environment,
    ValueKey::Host,
    ValueKey::RouteGroup,
    ValueKey::RouteName,
    ValueKey::TraceId,
    ValueKey::SpanId,
    ValueKey::ParentSpanId,
    ValueKey::Protocol,
    ValueKey::Domain,
    ValueKey::Port,
    ValueKey::BasePath,
    ValueKey::BaseUrl,
];

impl ValueKey {
    /// Creates an application defined key.
    pub const fn custom(domain: &'static str, name: &'static str) -> Self {
        ValueKey::Custom(CustomKey { domain, name })
    }

    /// The domain this key belongs to.
    pub fn domain(&self) -> ValueDomain {
        match self {
            ValueKey::Action => ValueDomain::Action,
            ValueKey::AnalyticsEnabled => ValueDomain::Analytics,
            ValueKey::ApiVersion => ValueDomain::ApiVersion,
            ValueKey::BearerToken => ValueDomain::BearerToken,
            ValueKey::Client => ValueDomain::Client,
            ValueKey::ClientVersion => ValueDomain::ClientVersion,
            ValueKey::Environment => ValueDomain::Environment,
            ValueKey::Host => ValueDomain::Host,
            ValueKey::RouteGroup | ValueKey::RouteName => ValueDomain::RouteInfo,
            ValueKey::TraceId | ValueKey::SpanId | ValueKey::ParentSpanId => {
                ValueDomain::TracingInfo
            }
            ValueKey::Protocol
            | ValueKey::Domain
            | ValueKey::Port
            | ValueKey::BasePath
            | ValueKey::BaseUrl => ValueDomain::Url,
            ValueKey::Custom(key) => ValueDomain::Custom(key.domain),
        }
    }

    /// The name of the key within its domain.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKey::Action => "action",
            ValueKey::AnalyticsEnabled => "analyticsEnabled",
            ValueKey::ApiVersion => "apiVersion",
            ValueKey::BearerToken => "bearerToken",
            ValueKey::Client => "client",
            ValueKey::ClientVersion => "clientVersion",
            ValueKey::Environment => "environment",
            ValueKey::Host => "host",
            ValueKey::RouteGroup => "group",
            ValueKey::RouteName => "name",
            ValueKey::TraceId => "traceID",
            ValueKey::SpanId => "spanID",
            ValueKey::ParentSpanId => "parentSpanID",
            ValueKey::Protocol => "protocol",
            ValueKey::Domain => "domain",
            ValueKey::Port => "port",
            ValueKey::BasePath => "basePath",
            ValueKey::BaseUrl => "baseUrl",
            ValueKey::Custom(key) => key.name,
        }
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.domain(), self.name())
    }
}

impl FromStr for ValueKey {
    type Err = Error;

    /// Parses a built-in key from its name. Custom keys cannot be named this way.
    fn from_str(s: &str) -> Result<Self> {
        BUILTIN_KEYS
            .iter()
            .find(|key| key.name() == s)
            .copied()
            .ok_or_else(|| Error::config(format!("Unknown request value \"{s}\"")))
    }
}

impl<'de> Deserialize<'de> for ValueKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A scalar request value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(_) => None,
        }
    }

    /// Converts the value to a string; booleans become `"true"`/`"false"`.
    pub fn into_string(self) -> String {
        match self {
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

// ============================================================================
// Enumerated values
// ============================================================================

/// A closed set of values a request value can resolve to, such as the known clients
/// of an application or the supported HTTP methods.
pub trait RequestEnum: Any + fmt::Debug + Send + Sync {
    /// The scalar backing this case.
    fn value(&self) -> Cow<'_, str>;

    /// Whether this case passes every client whitelist.
    fn has_global_access(&self) -> bool {
        false
    }
}

/// A [`RequestEnum`] that can be built from a raw request value.
pub trait ParsedEnum: RequestEnum + Sized {
    /// Maps a raw value to a case, `None` when nothing matches.
    fn try_from_request_value(value: &str) -> Option<Self>;
}

/// An API version that knows its own ordering.
pub trait ApiVersioned: RequestEnum + Sized {
    fn is_at_least(&self, minimum: &Self) -> bool;
}

/// A shared handle to a [`RequestEnum`] case.
///
/// Two handles are equal when they hold the same enum type and the same backing value.
#[derive(Clone)]
pub struct EnumValue(Arc<dyn RequestEnum>);

impl EnumValue {
    pub fn new<E: RequestEnum>(value: E) -> Self {
        Self(Arc::new(value))
    }

    pub fn value(&self) -> Cow<'_, str> {
        self.0.value()
    }

    pub fn has_global_access(&self) -> bool {
        self.0.has_global_access()
    }

    /// Returns the case as its concrete enum type.
    pub fn downcast_ref<E: RequestEnum>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        &*self.0
    }

    fn enum_type(&self) -> TypeId {
        self.as_any().type_id()
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.enum_type() == other.enum_type() && self.value() == other.value()
    }
}

impl Eq for EnumValue {}

impl fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// HTTP request methods, the built-in action enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl RequestEnum for HttpMethod {
    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl ParsedEnum for HttpMethod {
    /// Case-insensitive.
    fn try_from_request_value(value: &str) -> Option<Self> {
        let method = match value.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "CONNECT" => HttpMethod::Connect,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "PATCH" => HttpMethod::Patch,
            _ => return None,
        };
        Some(method)
    }
}

impl RequestEnum for ApiVersion {
    fn value(&self) -> Cow<'_, str> {
        Cow::Owned(self.as_u32().to_string())
    }
}

impl ParsedEnum for ApiVersion {
    fn try_from_request_value(value: &str) -> Option<Self> {
        ApiVersion::from_header(value)
    }
}

impl ApiVersioned for ApiVersion {
    fn is_at_least(&self, minimum: &Self) -> bool {
        self >= minimum
    }
}
