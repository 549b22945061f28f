use {
    crate::{
        EnumValue, Error, HttpSource, LazyValue, ParsedEnum, Result, Value, ValueDomain, ValueKey,
        ValueParser,
    },
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Resolves the calling client from an API key header (`Api-Key` by default).
///
/// The key is looked up in a map of known API keys; the mapped client value is then
/// turned into a case of the client enum `E`. Unknown keys resolve to `None`.
pub struct ClientApiKeyParser<E: ParsedEnum + Clone> {
    source: Arc<HttpSource>,
    header: String,
    keys: HashMap<String, String>,
    client: LazyValue<String>,
    client_enum: LazyValue<E>,
}

impl<E: ParsedEnum + Clone> ClientApiKeyParser<E> {
    pub const DEFAULT_HEADER: &'static str = "Api-Key";

    /// `keys` maps API keys to client values.
    pub fn new(source: Arc<HttpSource>, keys: HashMap<String, String>) -> Self {
        Self {
            source,
            header: Self::DEFAULT_HEADER.to_string(),
            keys,
            client: LazyValue::new(),
            client_enum: LazyValue::new(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    fn client(&self) -> Option<&String> {
        self.client.get_ref(|| {
            let key = self.source.header(&self.header)?;
            let client = self.keys.get(key).cloned();
            if client.is_none() {
                tracing::debug!(header = %self.header, "Unknown API key");
            }
            client
        })
    }
}

impl<E: ParsedEnum + Clone> ValueParser for ClientApiKeyParser<E> {
    fn domain(&self) -> ValueDomain {
        ValueDomain::Client
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::Client => Ok(self.client().cloned().map(Value::String)),
            _ => Err(Error::unsupported_value(key)),
        }
    }

    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        match key {
            ValueKey::Client => Ok(self
                .client_enum
                .get_or_parse(|| self.client().and_then(|client| E::try_from_request_value(client)))
                .map(EnumValue::new)),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}

impl<E: ParsedEnum + Clone> fmt::Debug for ClientApiKeyParser<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientApiKeyParser")
            .field("header", &self.header)
            .field("keys", &format_args!("{} keys", self.keys.len()))
            .field("client", &self.client)
            .finish()
    }
}
