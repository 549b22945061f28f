use {
    crate::{
        CliArgs, EnumValue, Error, HttpMethod, HttpSource, LazyValue, ParsedEnum, Result, Value,
        ValueDomain, ValueKey, ValueParser,
    },
    std::sync::Arc,
};

/// Resolves the action from the HTTP method of the request.
///
/// Methods unknown to `E` resolve to `None`.
#[derive(Debug)]
pub struct ActionHttpParser<E: ParsedEnum + Clone = HttpMethod> {
    source: Arc<HttpSource>,
    action: LazyValue<E>,
}

impl<E: ParsedEnum + Clone> ActionHttpParser<E> {
    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            action: LazyValue::new(),
        }
    }

    fn action(&self) -> Option<E> {
        self.action.get_or_parse(|| {
            self.source
                .method()
                .and_then(E::try_from_request_value)
        })
    }
}

impl<E: ParsedEnum + Clone> ValueParser for ActionHttpParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Action
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::Action => Ok(self.action().map(|action| action.value().into_owned().into())),
            _ => Err(Error::unsupported_value(key)),
        }
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        match key {
            ValueKey::Action => Ok(self.action().map(EnumValue::new)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

/// Resolves the action from the `action` command line argument.
#[derive(Debug)]
pub struct ActionCliParser<E: ParsedEnum + Clone = HttpMethod> {
    args: Arc<CliArgs>,
    action: LazyValue<E>,
}

impl<E: ParsedEnum + Clone> ActionCliParser<E> {
    pub const ARGUMENT: &'static str = "action";

    pub fn new(args: Arc<CliArgs>) -> Self {
        Self {
            args,
            action: LazyValue::new(),
        }
    }

    fn action(&self) -> Option<E> {
        self.action.get_or_parse(|| {
            self.args
                .get(Self::ARGUMENT)
                .and_then(E::try_from_request_value)
        })
    }
}

impl<E: ParsedEnum + Clone> ValueParser for ActionCliParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Action
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::Action => Ok(self.action().map(|action| action.value().into_owned().into())),
            _ => Err(Error::unsupported_value(key)),
        }
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        match key {
            ValueKey::Action => Ok(self.action().map(EnumValue::new)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_http_action_maps_method_case_insensitively() {
        let source = Arc::new(HttpSource::new().with_method("post"));
        let parser: ActionHttpParser = ActionHttpParser::new(source);

        assert_eq!(parser.get(ValueKey::Action).unwrap(), Some(Value::from("POST")));
        assert_eq!(
            parser.get_as_enum(ValueKey::Action).unwrap(),
            Some(EnumValue::new(HttpMethod::Post))
        );
    }

    #[test]
    fn test_http_action_unknown_method_is_none() {
        let source = Arc::new(HttpSource::new().with_method("BREW"));
        let parser: ActionHttpParser = ActionHttpParser::new(source);
        assert_eq!(parser.get(ValueKey::Action).unwrap(), None);
        assert_eq!(parser.get_as_enum(ValueKey::Action).unwrap(), None);
    }

    #[test]
    fn test_http_action_without_method_is_none() {
        let parser: ActionHttpParser = ActionHttpParser::new(Arc::new(HttpSource::new()));
        assert_eq!(parser.get(ValueKey::Action).unwrap(), None);
    }

    #[test]
    fn test_cli_action_reads_argument() {
        let args = Arc::new(CliArgs::new().with_arg("action", "delete"));
        let parser: ActionCliParser = ActionCliParser::new(args);
        assert_eq!(parser.get(ValueKey::Action).unwrap(), Some(Value::from("DELETE")));
    }

    #[test]
    fn test_cli_action_missing_argument_is_none() {
        let parser: ActionCliParser = ActionCliParser::new(Arc::new(CliArgs::new()));
        assert_eq!(parser.get_as_enum(ValueKey::Action).unwrap(), None);
    }

    #[test]
    fn test_action_rejects_other_keys() {
        let parser: ActionCliParser = ActionCliParser::new(Arc::new(CliArgs::new()));
        let err = parser.get(ValueKey::Host).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
        let err = parser.get_as_enum(ValueKey::Host).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
    }
}
