use {
    crate::{CliArgs, Error, HttpSource, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser},
    std::sync::Arc,
};

/// Resolves the client version from a request header (`Client-Version` by default).
#[derive(Debug)]
pub struct ClientVersionHttpHeaderParser {
    source: Arc<HttpSource>,
    header: String,
    version: LazyValue<String>,
}

impl ClientVersionHttpHeaderParser {
    pub const DEFAULT_HEADER: &'static str = "Client-Version";

    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            header: Self::DEFAULT_HEADER.to_string(),
            version: LazyValue::new(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

impl ValueParser for ClientVersionHttpHeaderParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::ClientVersion
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::ClientVersion => Ok(self
                .version
                .get_or_parse(|| self.source.header(&self.header).map(str::to_string))
                .map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

/// Resolves the client version from the `client-version` command line argument.
#[derive(Debug)]
pub struct ClientVersionCliParser {
    args: Arc<CliArgs>,
    version: LazyValue<String>,
}

impl ClientVersionCliParser {
    pub const ARGUMENT: &'static str = "client-version";

    pub fn new(args: Arc<CliArgs>) -> Self {
        Self {
            args,
            version: LazyValue::new(),
        }
    }
}

impl ValueParser for ClientVersionCliParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::ClientVersion
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::ClientVersion => Ok(self
                .version
                .get_or_parse(|| self.args.get(Self::ARGUMENT).map(str::to_string))
                .map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_version() {
        let source = Arc::new(HttpSource::new().with_header("Client-Version", "1.2.3"));
        let parser = ClientVersionHttpHeaderParser::new(source);
        assert_eq!(parser.get(ValueKey::ClientVersion).unwrap(), Some(Value::from("1.2.3")));
    }

    #[test]
    fn test_header_missing() {
        let parser = ClientVersionHttpHeaderParser::new(Arc::new(HttpSource::new()));
        assert_eq!(parser.get(ValueKey::ClientVersion).unwrap(), None);
    }

    #[test]
    fn test_cli_version() {
        let args = Arc::new(CliArgs::new().with_arg("client-version", "4.0"));
        let parser = ClientVersionCliParser::new(args);
        assert_eq!(parser.get(ValueKey::ClientVersion).unwrap(), Some(Value::from("4.0")));
    }

    #[test]
    fn test_cli_missing() {
        let parser = ClientVersionCliParser::new(Arc::new(CliArgs::new()));
        assert_eq!(parser.get(ValueKey::ClientVersion).unwrap(), None);
        assert!(parser.get(ValueKey::ApiVersion).is_err());
    }
}
