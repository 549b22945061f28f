use {
    crate::{
        ActionCliParser, ActionHttpParser, AnalyticsCliParser, ApiVersionCliParser,
        ApiVersionHttpHeaderParser, BearerTokenCliParser, BearerTokenHttpParser, CliArgs,
        ClientApiKeyParser, ClientVersionCliParser, ClientVersionHttpHeaderParser, EnvSource,
        EnvironmentParser, Error, HostParser, HttpSource, ParsedEnum, Request, Result,
        RouteInfoParser, StaticBooleanValueParser, TracingInfoParser, UrlParser, ValueKey,
        utils::Sensitive,
    },
    serde::Deserialize,
    std::{collections::HashMap, sync::Arc},
};

///
/// Configuration of the request value parsers.
///
/// Names the headers, arguments and variables the parsers read, and the values they
/// fall back to.
///
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Entry point script removed from the script path to form the base path.
    /// By default `entry_point` is "index.php".
    #[serde(default = "RequestConfig::default_entry_point")]
    pub entry_point: String,

    /// Header carrying the client version. By default "Client-Version".
    #[serde(default = "RequestConfig::default_client_version_header")]
    pub client_version_header: String,

    /// Header carrying the API version. By default "Api-Version".
    #[serde(default = "RequestConfig::default_api_version_header")]
    pub api_version_header: String,

    /// Header carrying the API key of the client. By default "Api-Key".
    #[serde(default = "RequestConfig::default_api_key_header")]
    pub api_key_header: String,

    /// Environment variable naming the deployment environment.
    /// By default "ENVIRONMENT".
    #[serde(default = "RequestConfig::default_environment_variable")]
    pub environment_variable: String,

    /// Environment assumed when the variable is unset. By default "production".
    #[serde(default = "RequestConfig::default_environment")]
    pub default_environment: String,

    /// Route group reported before routing. By default "general".
    #[serde(default = "RequestConfig::default_route_group")]
    pub route_group: String,

    /// Route name reported before routing. By default "/general/pre-routing".
    #[serde(default = "RequestConfig::default_route_name")]
    pub route_name: String,

    /// Header carrying the incoming trace id. By default "X-Trace-Id".
    #[serde(default = "RequestConfig::default_trace_id_header")]
    pub trace_id_header: String,

    /// Header carrying the span id of the caller. By default "X-Span-Id".
    #[serde(default = "RequestConfig::default_span_id_header")]
    pub span_id_header: String,

    /// Whether analytics are enabled when a CLI call does not say.
    /// By default `analytics_default` is false.
    #[serde(default)]
    pub analytics_default: bool,

    /// Known API keys and the client each one identifies.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyConfig>,
}

/// An API key and the client value it maps to.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiKeyConfig {
    pub key: Sensitive<String>,
    pub client: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            entry_point: Self::default_entry_point(),
            client_version_header: Self::default_client_version_header(),
            api_version_header: Self::default_api_version_header(),
            api_key_header: Self::default_api_key_header(),
            environment_variable: Self::default_environment_variable(),
            default_environment: Self::default_environment(),
            route_group: Self::default_route_group(),
            route_name: Self::default_route_name(),
            trace_id_header: Self::default_trace_id_header(),
            span_id_header: Self::default_span_id_header(),
            analytics_default: false,
            api_keys: Vec::new(),
        }
    }
}

impl RequestConfig {
    fn default_entry_point() -> String {
        UrlParser::DEFAULT_ENTRY_POINT.into()
    }

    fn default_client_version_header() -> String {
        ClientVersionHttpHeaderParser::DEFAULT_HEADER.into()
    }

    fn default_api_version_header() -> String {
        "Api-Version".into()
    }

    fn default_api_key_header() -> String {
        "Api-Key".into()
    }

    fn default_environment_variable() -> String {
        "ENVIRONMENT".into()
    }

    fn default_environment() -> String {
        "production".into()
    }

    fn default_route_group() -> String {
        RouteInfoParser::DEFAULT_GROUP.into()
    }

    fn default_route_name() -> String {
        RouteInfoParser::DEFAULT_NAME.into()
    }

    fn default_trace_id_header() -> String {
        TracingInfoParser::DEFAULT_TRACE_HEADER.into()
    }

    fn default_span_id_header() -> String {
        TracingInfoParser::DEFAULT_SPAN_HEADER.into()
    }

    pub fn validate(&self) -> Result<()> {
        let headers = [
            ("client_version_header", &self.client_version_header),
            ("api_version_header", &self.api_version_header),
            ("api_key_header", &self.api_key_header),
            ("trace_id_header", &self.trace_id_header),
            ("span_id_header", &self.span_id_header),
        ];
        for (name, header) in headers {
            if http::HeaderName::from_bytes(header.as_bytes()).is_err() {
                return Err(Error::config(format!(
                    "[request] {name} must be a valid HTTP header name, got \"{header}\""
                )));
            }
        }

        if self.environment_variable.trim().is_empty() {
            return Err(Error::config(
                "[request] environment_variable must not be empty",
            ));
        }

        if self.api_keys.iter().any(|api_key| api_key.key.0.is_empty()) {
            return Err(Error::config("[request] api_keys entries need a non-empty key"));
        }

        Ok(())
    }

    /// The API key map for [`ClientApiKeyParser`].
    pub fn api_key_map(&self) -> HashMap<String, String> {
        self.api_keys
            .iter()
            .map(|api_key| (api_key.key.0.clone(), api_key.client.clone()))
            .collect()
    }

    /// Registers the parsers of a web request.
    ///
    /// Covers action, API version, bearer token, client version, host, route info,
    /// tracing info and URL. Client and environment parsers depend on application
    /// enums, see [`client_parser`](Self::client_parser) and
    /// [`environment_parser`](Self::environment_parser).
    pub fn register_http_parsers(
        &self,
        request: &mut Request,
        source: &Arc<HttpSource>,
        env: &Arc<EnvSource>,
    ) {
        request.register_parser(ActionHttpParser::<crate::HttpMethod>::new(source.clone()));
        request.register_parser(
            ApiVersionHttpHeaderParser::<crate::ApiVersion>::new(source.clone())
                .with_header(&self.api_version_header),
        );
        request.register_parser(BearerTokenHttpParser::new(source.clone()));
        request.register_parser(
            ClientVersionHttpHeaderParser::new(source.clone())
                .with_header(&self.client_version_header),
        );
        request.register_parser(HostParser::new(env.clone()));
        request.register_parser(self.route_info_parser());
        request.register_parser(
            TracingInfoParser::new(source.clone())
                .with_trace_header(&self.trace_id_header)
                .with_span_header(&self.span_id_header),
        );
        request.register_parser(
            UrlParser::new(source.clone()).with_entry_point(&self.entry_point),
        );
        request.register_parser(StaticBooleanValueParser::new(
            ValueKey::AnalyticsEnabled,
            Some(self.analytics_default),
        ));
    }

    /// Registers the parsers of a command line call.
    ///
    /// Covers action, analytics, API version, bearer token, client version, host and
    /// route info. Tracing ids are generated since a CLI call has no caller to
    /// continue a trace from.
    pub fn register_cli_parsers(
        &self,
        request: &mut Request,
        args: &Arc<CliArgs>,
        env: &Arc<EnvSource>,
    ) {
        request.register_parser(ActionCliParser::<crate::HttpMethod>::new(args.clone()));
        request.register_parser(AnalyticsCliParser::new(args.clone(), self.analytics_default));
        request.register_parser(ApiVersionCliParser::<crate::ApiVersion>::new(args.clone()));
        request.register_parser(BearerTokenCliParser::new(args.clone()));
        request.register_parser(ClientVersionCliParser::new(args.clone()));
        request.register_parser(HostParser::new(env.clone()));
        request.register_parser(self.route_info_parser());
        request.register_parser(TracingInfoParser::new(Arc::new(HttpSource::new())));
    }

    pub fn route_info_parser(&self) -> RouteInfoParser {
        RouteInfoParser::new(&self.route_group, &self.route_name)
    }

    pub fn client_parser<E: ParsedEnum + Clone>(
        &self,
        source: &Arc<HttpSource>,
    ) -> ClientApiKeyParser<E> {
        ClientApiKeyParser::new(source.clone(), self.api_key_map())
            .with_header(&self.api_key_header)
    }

    pub fn environment_parser<E: ParsedEnum + Clone>(
        &self,
        env: &Arc<EnvSource>,
    ) -> EnvironmentParser<E> {
        EnvironmentParser::new(env.clone())
            .with_variable(&self.environment_variable)
            .with_default(&self.default_environment)
    }
}
