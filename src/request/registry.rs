use {
    super::{EnumValue, Value, ValueDomain, ValueKey, ValueParser},
    crate::{Error, Result, generate_id},
    parking_lot::RwLock,
    std::collections::{BTreeMap, HashMap},
};

/// The controller call a request was routed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTarget {
    pub controller: String,
    pub method: String,
    pub params: Vec<String>,
}

impl RouteTarget {
    pub fn new(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            method: method.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// The `controller/method` identifier of the call.
    pub fn call(&self) -> String {
        format!("{}/{}", self.controller, self.method)
    }
}

type Overlay = HashMap<ValueKey, Option<Value>>;

/// The per-request value registry.
///
/// Holds the route target and one [`ValueParser`] per [`ValueDomain`]. Every lookup is
/// delegated to the parser registered for the key's domain.
///
/// Child spans are modelled as overlays: [`start_child_span`](Self::start_child_span)
/// pushes a layer that overrides the span and parent span ids, and
/// [`stop_child_span`](Self::stop_child_span) pops it again.
///
/// ```
/// use corona::{Request, RouteTarget, StaticStringValueParser, Value, ValueKey};
///
/// let mut request = Request::new(RouteTarget::new("user", "get"));
/// request.register_parser(StaticStringValueParser::new(ValueKey::Host, Some("web01")));
///
/// assert_eq!(request.call(), "user/get");
/// assert_eq!(request.get(ValueKey::Host).unwrap(), Some(Value::from("web01")));
/// assert!(request.get(ValueKey::Client).is_err());
/// ```
pub struct Request {
    target: RouteTarget,
    parsers: HashMap<ValueDomain, Box<dyn ValueParser>>,
    overlays: RwLock<Vec<Overlay>>,
}

impl Request {
    pub fn new(target: RouteTarget) -> Self {
        Self {
            target,
            parsers: HashMap::new(),
            overlays: RwLock::new(Vec::new()),
        }
    }

    /// Registers a parser for its domain, replacing any parser registered before.
    pub fn register_parser(&mut self, parser: impl ValueParser + 'static) {
        let domain = parser.domain();
        if self.parsers.insert(domain, Box::new(parser)).is_some() {
            tracing::debug!(%domain, "Replaced request value parser");
        }
    }

    pub fn with_parser(mut self, parser: impl ValueParser + 'static) -> Self {
        self.register_parser(parser);
        self
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn controller(&self) -> &str {
        &self.target.controller
    }

    pub fn method(&self) -> &str {
        &self.target.method
    }

    pub fn params(&self) -> &[String] {
        &self.target.params
    }

    pub fn call(&self) -> String {
        self.target.call()
    }

    fn parser(&self, domain: ValueDomain) -> Result<&dyn ValueParser> {
        self.parsers
            .get(&domain)
            .map(|parser| parser.as_ref())
            .ok_or_else(|| Error::unregistered_parser(domain))
    }

    /// Returns a request value.
    ///
    /// Values overridden by the innermost child span take precedence over the parser.
    pub fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        if let Some(value) = self.overlays.read().last().and_then(|top| top.get(&key)) {
            return Ok(value.clone());
        }
        self.parser(key.domain())?.get(key)
    }

    /// Returns a request value as a case of the parser's enum.
    pub fn get_as_enum(&self, key: ValueKey) -> Result<Option<EnumValue>> {
        self.parser(key.domain())?.get_as_enum(key)
    }

    /// Returns a request value rendered as a string.
    pub fn get_string(&self, key: ValueKey) -> Result<Option<String>> {
        Ok(self.get(key)?.map(Value::into_string))
    }

    pub fn trace_id(&self) -> Result<Option<String>> {
        self.get_string(ValueKey::TraceId)
    }

    pub fn span_id(&self) -> Result<Option<String>> {
        self.get_string(ValueKey::SpanId)
    }

    pub fn parent_span_id(&self) -> Result<Option<String>> {
        self.get_string(ValueKey::ParentSpanId)
    }

    /// Tags identifying the current span in analytics events.
    pub fn span_specific_tags(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([("call".to_string(), Value::String(self.call()))])
    }

    /// Enters a child span.
    ///
    /// The current span id becomes the parent span id and a fresh span id is
    /// generated. Other overridden values are carried into the child.
    pub fn start_child_span(&self) -> Result<()> {
        let parent = self.span_id()?;
        let mut overlays = self.overlays.write();
        let mut overlay = overlays.last().cloned().unwrap_or_default();
        overlay.insert(ValueKey::ParentSpanId, parent.map(Value::String));
        overlay.insert(ValueKey::SpanId, Some(Value::String(generate_id())));
        overlays.push(overlay);
        Ok(())
    }

    /// Leaves the innermost child span. Does nothing outside of a child span.
    pub fn stop_child_span(&self) {
        self.overlays.write().pop();
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("target", &self.target)
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .field("child_spans", &self.overlays.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, StaticStringValueParser};

    struct FixedTracing;

    impl ValueParser for FixedTracing {
        fn domain(&self) -> ValueDomain {
            ValueDomain::TracingInfo
        }

        fn get(&self, key: ValueKey) -> Result<Option<Value>> {
            match key {
                ValueKey::TraceId => Ok(Some("trace".into())),
                ValueKey::SpanId => Ok(Some("span".into())),
                ValueKey::ParentSpanId => Ok(None),
                _ => Err(Error::unsupported_value(key)),
            }
        }
    }

    fn request() -> Request {
        Request::new(RouteTarget::new("controller", "method").with_params(["a", "b"]))
            .with_parser(FixedTracing)
    }

    #[test]
    fn test_route_target_accessors() {
        let request = request();
        assert_eq!(request.controller(), "controller");
        assert_eq!(request.method(), "method");
        assert_eq!(request.params(), ["a", "b"]);
        assert_eq!(request.call(), "controller/method");
    }

    #[test]
    fn test_get_without_parser_fails() {
        let err = request().get(ValueKey::BaseUrl).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnregisteredParser);
        assert_eq!(err.to_string(), "No parser registered for request value type \"Url\"!");
    }

    #[test]
    fn test_get_as_enum_without_parser_fails() {
        let err = request().get_as_enum(ValueKey::Client).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnregisteredParser);
    }

    #[test]
    fn test_register_parser_replaces_previous() {
        let mut request = request();
        request.register_parser(StaticStringValueParser::new(ValueKey::Host, Some("one")));
        request.register_parser(StaticStringValueParser::new(ValueKey::Host, Some("two")));
        assert_eq!(request.get_string(ValueKey::Host).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_span_specific_tags() {
        let tags = request().span_specific_tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["call"], Value::from("controller/method"));
    }

    #[test]
    fn test_child_span_overrides_ids() {
        let request = request();
        request.start_child_span().unwrap();

        assert_eq!(request.trace_id().unwrap().as_deref(), Some("trace"));
        assert_eq!(request.parent_span_id().unwrap().as_deref(), Some("span"));
        let child = request.span_id().unwrap().unwrap();
        assert_ne!(child, "span");
        assert_eq!(child.len(), 32);

        request.start_child_span().unwrap();
        assert_eq!(request.parent_span_id().unwrap(), Some(child.clone()));

        request.stop_child_span();
        assert_eq!(request.span_id().unwrap(), Some(child));

        request.stop_child_span();
        assert_eq!(request.span_id().unwrap().as_deref(), Some("span"));
        assert_eq!(request.parent_span_id().unwrap(), None);
    }

    #[test]
    fn test_stop_child_span_without_child_is_noop() {
        let request = request();
        request.stop_child_span();
        assert_eq!(request.span_id().unwrap().as_deref(), Some("span"));
    }
}
