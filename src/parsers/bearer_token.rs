use {
    crate::{CliArgs, Error, HttpSource, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser},
    regex::Regex,
    std::sync::{Arc, LazyLock},
};

static BEARER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Bearer\s(\S+)$").unwrap());

/// Resolves the bearer token from the `Authorization` header.
///
/// Only the `Bearer <token>` form is accepted. Other schemes and malformed values
/// resolve to `None`.
#[derive(Debug)]
pub struct BearerTokenHttpParser {
    source: Arc<HttpSource>,
    token: LazyValue<String>,
}

impl BearerTokenHttpParser {
    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            token: LazyValue::new(),
        }
    }

    fn token(&self) -> Option<String> {
        self.token.get_or_parse(|| {
            let header = self.source.header(http::header::AUTHORIZATION.as_str())?;
            BEARER_REGEX
                .captures(header)
                .and_then(|caps| caps.get(1))
                .map(|token| token.as_str().to_string())
        })
    }
}

impl ValueParser for BearerTokenHttpParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::BearerToken
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::BearerToken => Ok(self.token().map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

/// Resolves the bearer token from the `bearer-token` command line argument.
#[derive(Debug)]
pub struct BearerTokenCliParser {
    args: Arc<CliArgs>,
    token: LazyValue<String>,
}

impl BearerTokenCliParser {
    pub const ARGUMENT: &'static str = "bearer-token";

    pub fn new(args: Arc<CliArgs>) -> Self {
        Self {
            args,
            token: LazyValue::new(),
        }
    }
}

impl ValueParser for BearerTokenCliParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::BearerToken
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::BearerToken => Ok(self
                .token
                .get_or_parse(|| self.args.get(Self::ARGUMENT).map(str::to_string))
                .map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}
