use {
    crate::{EnvSource, Error, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser},
    std::sync::Arc,
};

/// Resolves the name of the serving host.
///
/// Prefers the `HOSTNAME` environment variable and falls back to the system hostname.
#[derive(Debug)]
pub struct HostParser {
    env: Arc<EnvSource>,
    host: LazyValue<String>,
}

impl HostParser {
    pub fn new(env: Arc<EnvSource>) -> Self {
        Self {
            env,
            host: LazyValue::new(),
        }
    }
}

impl ValueParser for HostParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Host
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::Host => Ok(self
                .host
                .get_or_parse(|| {
                    self.env
                        .var("HOSTNAME")
                        .or_else(|| self.env.hostname())
                        .map(str::to_string)
                })
                .map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(env: EnvSource) -> Option<Value> {
        HostParser::new(Arc::new(env)).get(ValueKey::Host).unwrap()
    }

    #[test]
    fn test_prefers_variable() {
        let env = EnvSource::new().with_var("HOSTNAME", "web01").with_hostname("system");
        assert_eq!(host(env), Some(Value::from("web01")));
    }

    #[test]
    fn test_falls_back_to_system_hostname() {
        assert_eq!(host(EnvSource::new().with_hostname("system")), Some(Value::from("system")));
    }

    #[test]
    fn test_none_when_both_absent() {
        assert_eq!(host(EnvSource::new()), None);
    }
}
