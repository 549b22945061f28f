//! Analytics events recorded for selected request results.
//!
//! The [`RequestResultHandler`](crate::RequestResultHandler) builds an
//! [`AnalyticsEvent`] for every error whose result code is mapped to an event name and
//! hands it to an [`EventLogger`].

use {
    parking_lot::Mutex,
    serde::Serialize,
    serde_json::Value as JsonValue,
    std::{
        collections::BTreeMap,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// A single analytics data point, correlated to a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    name: String,
    /// Microseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_span_id: Option<String>,
    tags: BTreeMap<String, JsonValue>,
    fields: BTreeMap<String, JsonValue>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            trace_id: None,
            span_id: None,
            parent_span_id: None,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Stamps the event with the current time.
    pub fn record_timestamp(&mut self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or_default();
        self.timestamp = Some(now);
    }

    pub fn set_trace_id(&mut self, trace_id: impl Into<String>) {
        self.trace_id = Some(trace_id.into());
    }

    pub fn set_span_id(&mut self, span_id: impl Into<String>) {
        self.span_id = Some(span_id.into());
    }

    pub fn set_parent_span_id(&mut self, parent_span_id: impl Into<String>) {
        self.parent_span_id = Some(parent_span_id.into());
    }

    /// Adds tags, overwriting tags of the same name.
    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = (String, JsonValue)>) {
        self.tags.extend(tags);
    }

    /// Adds fields, overwriting fields of the same name.
    pub fn add_fields(&mut self, fields: impl IntoIterator<Item = (String, JsonValue)>) {
        self.fields.extend(fields);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, JsonValue> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, JsonValue> {
        &self.fields
    }
}

/// Sink for analytics events.
pub trait EventLogger: Send + Sync {
    /// Starts a new event.
    fn new_event(&self, name: &str) -> AnalyticsEvent {
        AnalyticsEvent::new(name)
    }

    /// Stores a finished event.
    fn record(&self, event: AnalyticsEvent);
}

/// Emits events as structured `tracing` events under the `corona::analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn record(&self, event: AnalyticsEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(
                target: "corona::analytics",
                name = %event.name,
                trace_id = event.trace_id.as_deref().unwrap_or_default(),
                event = %json,
                "Analytics event"
            ),
            Err(err) => tracing::warn!(
                target: "corona::analytics",
                name = %event.name,
                error = %err,
                "Failed to serialize analytics event"
            ),
        }
    }
}

/// Keeps recorded events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventLogger {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemoryEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }
}

impl EventLogger for MemoryEventLogger {
    fn record(&self, event: AnalyticsEvent) {
        self.events.lock().push(event);
    }
}
