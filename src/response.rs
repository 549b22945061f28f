//! Outcomes and data of a dispatched request.

use {
    parking_lot::RwLock,
    serde_json::{Map, Value as JsonValue},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Outcome {
    code: Option<u16>,
    message: Option<String>,
    info_code: Option<i32>,
}

#[derive(Debug, Default)]
struct State {
    data: Map<String, JsonValue>,
    /// Per-call outcomes in the order the calls first reported.
    outcomes: Vec<(String, Outcome)>,
    default_code: Option<u16>,
    default_message: Option<String>,
    view: String,
}

impl State {
    fn outcome(&self, identifier: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, outcome)| outcome)
    }

    fn outcome_mut(&mut self, identifier: &str) -> &mut Outcome {
        let index = match self.outcomes.iter().position(|(id, _)| id == identifier) {
            Some(index) => index,
            None => {
                self.outcomes.push((identifier.to_string(), Outcome::default()));
                self.outcomes.len() - 1
            }
        };
        &mut self.outcomes[index].1
    }

    /// The first call with the highest result code.
    fn max_coded(&self) -> Option<(&str, u16)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.code.map(|code| (id.as_str(), code)))
            .fold(None, |max, (id, code)| match max {
                Some((_, max_code)) if max_code >= code => max,
                _ => Some((id, code)),
            })
    }
}

/// Collects what a request produced: result outcomes per call, response data for the
/// view and the view name.
///
/// Outcomes are keyed by call identifier (`controller/method`). A default outcome can
/// be set up front; it is reported under [`Response::DEFAULT_IDENTIFIER`] while no
/// call has reported a code of its own.
///
/// All methods take `&self` so one response can be shared between the result handler
/// and the controller.
///
/// ```
/// use corona::Response;
///
/// let response = Response::new();
/// response.set_default_result(501, Some("Not implemented!"));
/// assert_eq!(response.result_code(None), Some(501));
/// assert!(!response.has_custom_result_set());
///
/// response.set_result("user/get", 200, None, None);
/// assert_eq!(response.result_code(None), Some(200));
/// assert!(response.has_custom_result_set());
/// ```
#[derive(Debug, Default)]
pub struct Response {
    state: RwLock<State>,
}

impl Response {
    /// Identifier the default outcome is reported under.
    pub const DEFAULT_IDENTIFIER: &'static str = "_corona_response_default";

    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Response data
    // ========================================================================

    pub fn add_response_data(&self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.state.write().data.insert(key.into(), value.into());
    }

    pub fn response_data(&self, key: &str) -> Option<JsonValue> {
        self.state.read().data.get(key).cloned()
    }

    pub fn all_response_data(&self) -> Map<String, JsonValue> {
        self.state.read().data.clone()
    }

    pub fn set_view(&self, view: impl Into<String>) {
        self.state.write().view = view.into();
    }

    pub fn view(&self) -> String {
        self.state.read().view.clone()
    }

    // ========================================================================
    // Outcomes
    // ========================================================================

    pub fn set_result_code(&self, identifier: &str, code: u16) {
        self.state.write().outcome_mut(identifier).code = Some(code);
    }

    pub fn set_result_message(&self, identifier: &str, message: impl Into<String>) {
        self.state.write().outcome_mut(identifier).message = Some(message.into());
    }

    pub fn set_result_info_code(&self, identifier: &str, info_code: i32) {
        self.state.write().outcome_mut(identifier).info_code = Some(info_code);
    }

    /// Records a complete outcome for `identifier`.
    ///
    /// The message and info code are only written when given, so earlier values
    /// survive a later code-only update.
    pub fn set_result(
        &self,
        identifier: &str,
        code: u16,
        message: Option<&str>,
        info_code: Option<i32>,
    ) {
        let mut state = self.state.write();
        let outcome = state.outcome_mut(identifier);
        outcome.code = Some(code);
        if let Some(message) = message {
            outcome.message = Some(message.to_string());
        }
        if let Some(info_code) = info_code {
            outcome.info_code = Some(info_code);
        }
    }

    /// Sets the outcome reported while no call has reported one.
    pub fn set_default_result(&self, code: u16, message: Option<&str>) {
        let mut state = self.state.write();
        state.default_code = Some(code);
        state.default_message = message.map(str::to_string);
    }

    /// Whether any call reported a result code. The default outcome does not count.
    pub fn has_custom_result_set(&self) -> bool {
        self.state.read().max_coded().is_some()
    }

    /// The result code of `identifier`, or the most severe code when `None`.
    ///
    /// Falls back to the default code when no call reported a code.
    pub fn result_code(&self, identifier: Option<&str>) -> Option<u16> {
        let state = self.state.read();
        match identifier {
            Some(Self::DEFAULT_IDENTIFIER) => state.default_code,
            Some(identifier) => state.outcome(identifier).and_then(|o| o.code),
            None => state
                .max_coded()
                .map(|(_, code)| code)
                .or(state.default_code),
        }
    }

    pub fn result_message(&self, identifier: &str) -> Option<String> {
        let state = self.state.read();
        match identifier {
            Self::DEFAULT_IDENTIFIER => state.default_message.clone(),
            _ => state.outcome(identifier).and_then(|o| o.message.clone()),
        }
    }

    pub fn result_info_code(&self, identifier: &str) -> Option<i32> {
        self.state
            .read()
            .outcome(identifier)
            .and_then(|o| o.info_code)
    }

    /// Identifiers of all calls that reported a result code, in reporting order.
    ///
    /// Yields only [`Response::DEFAULT_IDENTIFIER`] while no call reported a code.
    pub fn result_code_identifiers(&self) -> Vec<String> {
        let state = self.state.read();
        let identifiers: Vec<String> = state
            .outcomes
            .iter()
            .filter(|(_, outcome)| outcome.code.is_some())
            .map(|(id, _)| id.clone())
            .collect();

        if identifiers.is_empty() {
            return vec![Self::DEFAULT_IDENTIFIER.to_string()];
        }
        identifiers
    }

    /// Identifier of the call with the most severe result code.
    pub fn max_result_code_identifier(&self) -> String {
        self.state
            .read()
            .max_coded()
            .map_or(Self::DEFAULT_IDENTIFIER, |(id, _)| id)
            .to_string()
    }
}
