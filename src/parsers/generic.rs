//! Parsers serving a single value fixed at bootstrap.

use crate::{EnumValue, Error, RequestEnum, Result, Value, ValueDomain, ValueKey, ValueParser};

/// Serves one fixed boolean.
#[derive(Debug, Clone)]
pub struct StaticBooleanValueParser {
    key: ValueKey,
    value: Option<bool>,
}

impl StaticBooleanValueParser {
    pub fn new(key: ValueKey, value: Option<bool>) -> Self {
        Self { key, value }
    }
}

impl ValueParser for StaticBooleanValueParser {
    fn domain(&self) -> ValueDomain {
        self.key.domain()
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        if key != self.key {
            return Err(Error::unsupported_value(key));
        }
        Ok(self.value.map(Value::Bool))
    }
}

/// Serves one fixed string.
#[derive(Debug, Clone)]
pub struct StaticStringValueParser {
    key: ValueKey,
    value: Option<String>,
}

impl StaticStringValueParser {
    pub fn new(key: ValueKey, value: Option<impl Into<String>>) -> Self {
        Self {
            key,
            value: value.map(Into::into),
        }
    }
}

impl ValueParser for StaticStringValueParser {
    fn domain(&self) -> ValueDomain {
        self.key.domain()
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        if key != self.key {
            return Err(Error::unsupported_value(key));
        }
        Ok(self.value.clone().map(Value::String))
    }
}

/// Serves one fixed enum case, as a string through `get` and as the case itself
/// through `get_as_enum`.
#[derive(Debug, Clone)]
pub struct StaticEnumValueParser {
    key: ValueKey,
    value: Option<EnumValue>,
}

impl StaticEnumValueParser {
    pub fn new<E: RequestEnum>(key: ValueKey, value: Option<E>) -> Self {
        Self {
            key,
            value: value.map(EnumValue::new),
        }
    }
}

impl ValueParser for StaticEnumValueParser {
    fn domain(&self) -> ValueDomain {
        self.key.domain()
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        if key != self.key {
            return Err(Error::unsupported_value(key));
        }
        Ok(self
            .value
            .as_ref()
            .map(|value| Value::String(value.value().into_owned())))
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        if key != self.key {
            return Err(Error::unsupported_value(key));
        }
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, HttpMethod};

    const BETA: ValueKey = ValueKey::custom("Feature", "beta");

    #[test]
    fn test_static_boolean() {
        let parser = StaticBooleanValueParser::new(BETA, Some(true));
        assert_eq!(parser.domain(), ValueDomain::Custom("Feature"));
        assert_eq!(parser.get(BETA).unwrap(), Some(Value::Bool(true)));
        assert_eq!(parser.get(ValueKey::custom("Feature", "alpha")).unwrap_err().kind(), ErrorKind::UnsupportedValue);
    }

    #[test]
    fn test_static_string() {
        let parser = StaticStringValueParser::new(ValueKey::Environment, Some("staging"));
        assert_eq!(parser.domain(), ValueDomain::Environment);
        assert_eq!(parser.get(ValueKey::Environment).unwrap(), Some(Value::from("staging")));
        assert!(parser.get_as_enum(ValueKey::Environment).is_err());

        let empty = StaticStringValueParser::new(ValueKey::Host, None::<String>);
        assert_eq!(empty.get(ValueKey::Host).unwrap(), None);
    }

    #[test]
    fn test_static_enum() {
        let parser = StaticEnumValueParser::new(ValueKey::Action, Some(HttpMethod::Put));
        assert_eq!(parser.get(ValueKey::Action).unwrap(), Some(Value::from("PUT")));
        assert_eq!(
            parser.get_as_enum(ValueKey::Action).unwrap(),
            Some(EnumValue::new(HttpMethod::Put))
        );
        assert!(parser.get_as_enum(ValueKey::Client).is_err());

        let empty = StaticEnumValueParser::new::<HttpMethod>(ValueKey::Action, None);
        assert_eq!(empty.get_as_enum(ValueKey::Action).unwrap(), None);
    }
}
