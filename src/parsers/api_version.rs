use {
    crate::{
        ApiVersion, CliArgs, EnumValue, Error, HttpSource, LazyValue, ParsedEnum, Result, Value,
        ValueDomain, ValueKey, ValueParser,
    },
    std::sync::Arc,
};

/// Raw API version plus its enum form, each parsed once.
#[derive(Debug)]
struct VersionCache<E> {
    raw: LazyValue<String>,
    parsed: LazyValue<E>,
}

impl<E: ParsedEnum + Clone> VersionCache<E> {
    fn new() -> Self {
        Self {
            raw: LazyValue::new(),
            parsed: LazyValue::new(),
        }
    }

    fn get(&self, key: ValueKey, read: impl FnOnce() -> Option<String>) -> Result<Option<Value>> {
        match key {
            ValueKey::ApiVersion => Ok(self.raw.get_or_parse(read).map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }

    fn get_as_enum(
        &self,
        key: ValueKey,
        read: impl FnOnce() -> Option<String>,
    ) -> Result<Option<EnumValue>> {
        if key != ValueKey::ApiVersion {
            return Err(Error::unsupported_value(key));
        }
        let version = self.parsed.get_or_parse(|| {
            self.raw
                .get_ref(read)
                .and_then(|raw| E::try_from_request_value(raw))
        });
        Ok(version.map(EnumValue::new))
    }
}

/// Resolves the API version from a request header (`Api-Version` by default).
#[derive(Debug)]
pub struct ApiVersionHttpHeaderParser<E: ParsedEnum + Clone = ApiVersion> {
    source: Arc<HttpSource>,
    header: String,
    cache: VersionCache<E>,
}

impl<E: ParsedEnum + Clone> ApiVersionHttpHeaderParser<E> {
    pub const DEFAULT_HEADER: &'static str = "Api-Version";

    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            header: Self::DEFAULT_HEADER.to_string(),
            cache: VersionCache::new(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    fn read(&self) -> Option<String> {
        self.source.header(&self.header).map(str::to_string)
    }
}

impl<E: ParsedEnum + Clone> ValueParser for ApiVersionHttpHeaderParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::ApiVersion
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        self.cache.get(key, || self.read())
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        self.cache.get_as_enum(key, || self.read())
    }
}

/// Resolves the API version from the `api-version` command line argument.
#[derive(Debug)]
pub struct ApiVersionCliParser<E: ParsedEnum + Clone = ApiVersion> {
    args: Arc<CliArgs>,
    cache: VersionCache<E>,
}

impl<E: ParsedEnum + Clone> ApiVersionCliParser<E> {
    pub const ARGUMENT: &'static str = "api-version";

    pub fn new(args: Arc<CliArgs>) -> Self {
        Self {
            args,
            cache: VersionCache::new(),
        }
    }

    fn read(&self) -> Option<String> {
        self.args.get(Self::ARGUMENT).map(str::to_string)
    }
}

impl<E: ParsedEnum + Clone> ValueParser for ApiVersionCliParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::ApiVersion
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        self.cache.get(key, || self.read())
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        self.cache.get_as_enum(key, || self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_version() {
        let source = Arc::new(HttpSource::new().with_header("Api-Version", "v3"));
        let parser: ApiVersionHttpHeaderParser = ApiVersionHttpHeaderParser::new(source);

        assert_eq!(parser.get(ValueKey::ApiVersion).unwrap(), Some(Value::from("v3")));
        let version = parser.get_as_enum(ValueKey::ApiVersion).unwrap().unwrap();
        assert_eq!(version.downcast_ref::<ApiVersion>(), Some(&ApiVersion::new(3)));
    }

    #[test]
    fn test_custom_header_name() {
        let source = Arc::new(HttpSource::new().with_header("X-Version", "5"));
        let parser: ApiVersionHttpHeaderParser =
            ApiVersionHttpHeaderParser::new(source).with_header("X-Version");
        assert_eq!(parser.get(ValueKey::ApiVersion).unwrap(), Some(Value::from("5")));
    }

    #[test]
    fn test_missing_header_is_none() {
        let parser: ApiVersionHttpHeaderParser =
            ApiVersionHttpHeaderParser::new(Arc::new(HttpSource::new()));
        assert_eq!(parser.get(ValueKey::ApiVersion).unwrap(), None);
        assert_eq!(parser.get_as_enum(ValueKey::ApiVersion).unwrap(), None);
    }

    #[test]
    fn test_unparseable_version_has_no_enum() {
        let source = Arc::new(HttpSource::new().with_header("Api-Version", "latest"));
        let parser: ApiVersionHttpHeaderParser = ApiVersionHttpHeaderParser::new(source);
        assert_eq!(parser.get(ValueKey::ApiVersion).unwrap(), Some(Value::from("latest")));
        assert_eq!(parser.get_as_enum(ValueKey::ApiVersion).unwrap(), None);
    }

    #[test]
    fn test_cli_version() {
        let args = Arc::new(CliArgs::new().with_arg("api-version", "2"));
        let parser: ApiVersionCliParser = ApiVersionCliParser::new(args);
        assert_eq!(
            parser.get_as_enum(ValueKey::ApiVersion).unwrap(),
            Some(EnumValue::new(ApiVersion::new(2)))
        );
    }

    #[test]
    fn test_rejects_other_keys() {
        let parser: ApiVersionCliParser = ApiVersionCliParser::new(Arc::new(CliArgs::new()));
        assert!(parser.get(ValueKey::ClientVersion).is_err());
        assert!(parser.get_as_enum(ValueKey::ClientVersion).is_err());
    }
}
