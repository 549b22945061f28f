use {
    crate::{
        Error, HttpSource, LazyValue, Result, Value, ValueDomain, ValueKey, ValueParser,
        generate_id,
    },
    std::sync::Arc,
};

/// Resolves trace correlation ids.
///
/// - trace id: the `X-Trace-Id` header, or a freshly generated id when absent.
/// - span id: always freshly generated for this request.
/// - parent span id: the `X-Span-Id` header of the calling service, if any.
#[derive(Debug)]
pub struct TracingInfoParser {
    source: Arc<HttpSource>,
    trace_header: String,
    span_header: String,
    trace_id: LazyValue<String>,
    span_id: LazyValue<String>,
    parent_span_id: LazyValue<String>,
}

impl TracingInfoParser {
    pub const DEFAULT_TRACE_HEADER: &'static str = "X-Trace-Id";
    pub const DEFAULT_SPAN_HEADER: &'static str = "X-Span-Id";

    pub fn new(source: Arc<HttpSource>) -> Self {
        Self {
            source,
            trace_header: Self::DEFAULT_TRACE_HEADER.to_string(),
            span_header: Self::DEFAULT_SPAN_HEADER.to_string(),
            trace_id: LazyValue::new(),
            span_id: LazyValue::new(),
            parent_span_id: LazyValue::new(),
        }
    }

    pub fn with_trace_header(mut self, header: impl Into<String>) -> Self {
        self.trace_header = header.into();
        self
    }

    pub fn with_span_header(mut self, header: impl Into<String>) -> Self {
        self.span_header = header.into();
        self
    }
}

impl ValueParser for TracingInfoParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::TracingInfo
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        let value = match key {
            ValueKey::TraceId => self.trace_id.get_or_parse(|| {
                let trace_id = self
                    .source
                    .header(&self.trace_header)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
                Some(trace_id.unwrap_or_else(|| {
                    tracing::debug!("No incoming trace id, starting a new trace");
                    generate_id()
                }))
            }),
            ValueKey::SpanId => self.span_id.get_or_parse(|| Some(generate_id())),
            ValueKey::ParentSpanId => self.parent_span_id.get_or_parse(|| {
                self.source
                    .header(&self.span_header)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            }),
            _ => return Err(Error::unsupported_value(key)),
        };
        Ok(value.map(Value::String))
    }
}
