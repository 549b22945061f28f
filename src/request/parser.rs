use {
    super::{EnumValue, Value, ValueDomain, ValueKey},
    crate::{Error, Result},
    std::sync::OnceLock,
};

/// Resolves the request values of one [`ValueDomain`].
///
/// Implementations serve a fixed set of keys and answer [`Error::unsupported_value`]
/// for any other key. Parsing is lazy: nothing is read from the raw source until a
/// value is first asked for, and the outcome (including absence) is kept for the rest
/// of the request, see [`LazyValue`].
pub trait ValueParser: Send + Sync {
    /// The domain this parser serves.
    fn domain(&self) -> ValueDomain;

    /// Returns the scalar value for `key`, `None` when the request does not carry it.
    fn get(&self, key: ValueKey) -> Result<Option<Value>>;

    /// Returns the value for `key` as a case of the parser's enum.
    ///
    /// Parsers without an enum representation reject every key.
    fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        Err(Error::unsupported_value(key))
    }
}

/// A value parsed at most once.
///
/// Remembers absence as well as presence, so a missing header is looked up a single
/// time per request.
///
/// ```
/// use corona::LazyValue;
///
/// let value: LazyValue<String> = LazyValue::new();
/// assert_eq!(value.get_or_parse(|| Some("first".into())), Some("first".into()));
/// assert_eq!(value.get_or_parse(|| Some("second".into())), Some("first".into()));
/// ```
#[derive(Debug)]
pub struct LazyValue<T>(OnceLock<Option<T>>);

impl<T> LazyValue<T> {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// A value that is already resolved and never parsed.
    pub fn resolved(value: Option<T>) -> Self {
        Self(OnceLock::from(value))
    }

    pub fn is_resolved(&self) -> bool {
        self.0.get().is_some()
    }

    /// Returns the stored value, running `parse` if this is the first access.
    pub fn get_ref(&self, parse: impl FnOnce() -> Option<T>) -> Option<&T> {
        self.0.get_or_init(parse).as_ref()
    }
}

impl<T: Clone> LazyValue<T> {
    pub fn get_or_parse(&self, parse: impl FnOnce() -> Option<T>) -> Option<T> {
        self.get_ref(parse).cloned()
    }
}

impl<T> Default for LazyValue<T> {
    fn default() -> Self {
        Self::new()
    }
}
