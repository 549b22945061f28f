use {
    crate::{
        EnumValue, EnvSource, Error, LazyValue, ParsedEnum, Result, Value, ValueDomain, ValueKey,
        ValueParser,
    },
    std::{marker::PhantomData, sync::Arc},
};

/// Resolves the deployment environment from an environment variable.
///
/// Reads `ENVIRONMENT` by default and falls back to `production` when it is unset.
/// `E` is the application's environment enum.
#[derive(Debug)]
pub struct EnvironmentParser<E: ParsedEnum + Clone> {
    env: Arc<EnvSource>,
    variable: String,
    default: String,
    environment: LazyValue<String>,
    marker: PhantomData<fn() -> E>,
}

impl<E: ParsedEnum + Clone> EnvironmentParser<E> {
    pub const DEFAULT_VARIABLE: &'static str = "ENVIRONMENT";
    pub const DEFAULT_ENVIRONMENT: &'static str = "production";

    pub fn new(env: Arc<EnvSource>) -> Self {
        Self {
            env,
            variable: Self::DEFAULT_VARIABLE.to_string(),
            default: Self::DEFAULT_ENVIRONMENT.to_string(),
            environment: LazyValue::new(),
            marker: PhantomData,
        }
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    fn environment(&self) -> Option<&String> {
        self.environment.get_ref(|| {
            Some(
                self.env
                    .var(&self.variable)
                    .unwrap_or(self.default.as_str())
                    .to_string(),
            )
        })
    }
}

impl<E: ParsedEnum + Clone> ValueParser for EnvironmentParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Environment
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::Environment => Ok(self.environment().cloned().map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        match key {
            ValueKey::Environment => Ok(self
                .environment()
                .and_then(|environment| E::try_from_request_value(environment))
                .map(EnumValue::new)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestEnum;
    use std::borrow::Cow;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Environment {
        Production,
        Staging,
    }

    impl RequestEnum for Environment {
        fn value(&self) -> Cow<'_, str> {
            match self {
                Environment::Production => "production".into(),
                Environment::Staging => "staging".into(),
            }
        }
    }

    impl ParsedEnum for Environment {
        fn try_from_request_value(value: &str) -> Option<Self> {
            match value {
                "production" => Some(Environment::Production),
                "staging" => Some(Environment::Staging),
                _ => None,
            }
        }
    }

    #[test]
    fn test_reads_variable() {
        let env = Arc::new(EnvSource::new().with_var("ENVIRONMENT", "staging"));
        let parser = EnvironmentParser::<Environment>::new(env);
        assert_eq!(parser.get(ValueKey::Environment).unwrap(), Some(Value::from("staging")));
        assert_eq!(
            parser.get_as_enum(ValueKey::Environment).unwrap(),
            Some(EnumValue::new(Environment::Staging))
        );
    }

    #[test]
    fn test_defaults_to_production() {
        let parser = EnvironmentParser::<Environment>::new(Arc::new(EnvSource::new()));
        assert_eq!(
            parser.get_as_enum(ValueKey::Environment).unwrap(),
            Some(EnumValue::new(Environment::Production))
        );
    }

    #[test]
    fn test_custom_variable_and_default() {
        let env = Arc::new(EnvSource::new().with_var("APP_ENV", "qa"));
        let parser = EnvironmentParser::<Environment>::new(env)
            .with_variable("APP_ENV")
            .with_default("staging");
        assert_eq!(parser.get(ValueKey::Environment).unwrap(), Some(Value::from("qa")));
        assert_eq!(parser.get_as_enum(ValueKey::Environment).unwrap(), None);

        let parser = EnvironmentParser::<Environment>::new(Arc::new(EnvSource::new()))
            .with_variable("APP_ENV")
            .with_default("staging");
        assert_eq!(parser.get(ValueKey::Environment).unwrap(), Some(Value::from("staging")));
    }

    #[test]
    fn test_rejects_other_keys() {
        let parser = EnvironmentParser::<Environment>::new(Arc::new(EnvSource::new()));
        assert!(parser.get(ValueKey::Host).is_err());
    }
}
