//! Runs controller actions and turns their failures into response outcomes.

use {
    crate::{
        ActionError, ActionResult, EventLogger, HttpError, Request, Response, Result, Value,
        ValueKey,
    },
    serde_json::{Value as JsonValue, json},
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Invokes controller actions on behalf of the front controller.
///
/// | action outcome | response outcome |
/// |---|---|
/// | [`ActionError::Http`] | the error's code, message and app code; an analytics event when the code is mapped |
/// | [`ActionError::Internal`] | `500` with the error message, logged at error level |
/// | [`ActionError::Fatal`] | none, the error is returned to the caller |
/// | success without an outcome of its own | `200` |
pub struct RequestResultHandler {
    request: Arc<Request>,
    response: Arc<Response>,
    event_logger: Option<Arc<dyn EventLogger>>,
    code_map: HashMap<u16, String>,
    tag_map: Vec<(String, ValueKey)>,
}

impl RequestResultHandler {
    pub fn new(request: Arc<Request>, response: Arc<Response>) -> Self {
        Self {
            request,
            response,
            event_logger: None,
            code_map: HashMap::new(),
            tag_map: Vec::new(),
        }
    }

    /// Records an analytics event for every HTTP error whose code is in `code_map`.
    ///
    /// `code_map` maps result codes to event names. `tag_map` names the request values
    /// attached to each event as tags.
    pub fn enable_analytics(
        &mut self,
        event_logger: Arc<dyn EventLogger>,
        code_map: HashMap<u16, String>,
        tag_map: Vec<(String, ValueKey)>,
    ) {
        self.event_logger = Some(event_logger);
        self.code_map = code_map;
        self.tag_map = tag_map;
    }

    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    pub fn response(&self) -> &Arc<Response> {
        &self.response
    }

    /// Runs `action` with `params` and records its outcome for the current call.
    ///
    /// Only fatal errors are returned, either raised by the action itself or while
    /// recording an analytics event.
    pub fn handle_request<F>(&self, action: F, params: &[String]) -> Result<()>
    where
        F: FnOnce(&[String]) -> ActionResult,
    {
        match action(params) {
            Ok(()) => {}
            Err(ActionError::Http(err)) => {
                self.log_request_result(&err)?;
                self.set_result(err.code(), Some(err.message()), err.app_code());
            }
            Err(ActionError::Internal(err)) => {
                tracing::error!(call = %self.request.call(), error = %err, "Request failed");
                self.set_result(500, Some(&err.to_string()), None);
            }
            Err(ActionError::Fatal(err)) => return Err(err),
        }

        if !self.response.has_custom_result_set() {
            self.set_result(200, None, None);
        }
        Ok(())
    }

    fn set_result(&self, code: u16, message: Option<&str>, info_code: Option<i32>) {
        self.response
            .set_result(&self.request.call(), code, message, info_code);
    }

    /// Records an analytics event for `error` if its code is mapped to an event name.
    ///
    /// Fails when the request carries no trace id or span id.
    pub fn log_request_result(&self, error: &HttpError) -> Result<()> {
        let (Some(logger), Some(name)) = (&self.event_logger, self.code_map.get(&error.code()))
        else {
            return Ok(());
        };

        let mut fields = vec![("message".to_string(), json!(error.message()))];
        let mut tags = Vec::with_capacity(self.tag_map.len() + 1);
        for (tag, key) in &self.tag_map {
            let value = match self.request.get(*key)? {
                Some(Value::Bool(b)) => JsonValue::Bool(b),
                Some(Value::String(s)) => JsonValue::String(s),
                None => JsonValue::String(String::new()),
            };
            tags.push((tag.clone(), value));
        }

        if let Some(data) = error.data() {
            tags.push(("inputKey".to_string(), json!(data.key)));
            fields.push(("inputValue".to_string(), json!(data.value)));
        }
        if let Some(report) = error.report() {
            fields.push(("report".to_string(), json!(report)));
        }

        let mut event = logger.new_event(name);
        event.record_timestamp();
        event.set_trace_id(
            self.request
                .trace_id()?
                .ok_or_else(|| crate::Error::tracing("Trace ID not available!"))?,
        );
        event.set_span_id(
            self.request
                .span_id()?
                .ok_or_else(|| crate::Error::tracing("Span ID not available!"))?,
        );
        if let Some(parent) = self.request.parent_span_id()? {
            event.set_parent_span_id(parent);
        }

        let span_tags = self
            .request
            .span_specific_tags()
            .into_iter()
            .map(|(tag, value)| (tag, json!(value.into_string())));
        event.add_tags(span_tags.chain(tags));
        event.add_fields(fields);

        tracing::debug!(event = %name, code = error.code(), "Recording analytics event");
        logger.record(event);
        Ok(())
    }
}

impl fmt::Debug for RequestResultHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestResultHandler")
            .field("request", &self.request)
            .field("analytics", &self.event_logger.is_some())
            .field("code_map", &self.code_map)
            .field("tag_map", &self.tag_map)
            .finish()
    }
}
