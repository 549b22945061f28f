use {
    crate::{CliArgs, Error, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser},
    std::sync::Arc,
};

/// Resolves whether analytics are enabled from the `analytics` command line argument.
///
/// `on`, `yes` and `enabled` (any case) enable analytics. Any other value, or no value
/// at all, yields the configured default.
#[derive(Debug)]
pub struct AnalyticsCliParser {
    args: Arc<CliArgs>,
    default: bool,
    enabled: LazyValue<bool>,
}

impl AnalyticsCliParser {
    pub const ARGUMENT: &'static str = "analytics";

    pub fn new(args: Arc<CliArgs>, default: bool) -> Self {
        Self {
            args,
            default,
            enabled: LazyValue::new(),
        }
    }

    fn enabled(&self) -> Option<bool> {
        self.enabled.get_or_parse(|| {
            let enabled = match self.args.get(Self::ARGUMENT) {
                Some(flag) => ["on", "yes", "enabled"]
                    .iter()
                    .any(|word| flag.eq_ignore_ascii_case(word))
                    || self.default,
                None => self.default,
            };
            Some(enabled)
        })
    }
}

impl ValueParser for AnalyticsCliParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Analytics
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::AnalyticsEnabled => Ok(self.enabled().map(Value::Bool)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}
