use {
    crate::{Error, EventLogger, RequestResultHandler, Result, ValueKey},
    serde::Deserialize,
    std::{collections::HashSet, sync::Arc},
};

///
/// Configuration of analytics events for request results.
///
/// ```toml
/// [analytics]
/// enabled = true
///
/// [[analytics.codes]]
/// code = 400
/// event = "bad_request"
///
/// [[analytics.tags]]
/// name = "client"
/// value = "client"
/// ```
///
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AnalyticsConfig {
    /// By default analytics are disabled.
    #[serde(default)]
    pub enabled: bool,

    /// Result codes that produce an event, and the event name for each.
    #[serde(default)]
    pub codes: Vec<AnalyticsCodeConfig>,

    /// Request values attached to every event as tags, in order.
    #[serde(default)]
    pub tags: Vec<AnalyticsTagConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyticsCodeConfig {
    pub code: u16,
    pub event: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyticsTagConfig {
    /// Tag name on the event.
    pub name: String,
    /// Request value of the tag, by its name (`client`, `apiVersion`, ...).
    pub value: ValueKey,
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<()> {
        let mut codes = HashSet::new();
        for entry in &self.codes {
            if !(100..=599).contains(&entry.code) {
                return Err(Error::config(format!(
                    "[analytics] code {} is not a valid HTTP status code",
                    entry.code
                )));
            }
            if entry.event.trim().is_empty() {
                return Err(Error::config(format!(
                    "[analytics] code {} needs a non-empty event name",
                    entry.code
                )));
            }
            if !codes.insert(entry.code) {
                return Err(Error::config(format!(
                    "[analytics] code {} is mapped more than once",
                    entry.code
                )));
            }
        }

        if self.tags.iter().any(|tag| tag.name.trim().is_empty()) {
            return Err(Error::config("[analytics] tags entries need a non-empty name"));
        }

        Ok(())
    }

    /// Enables analytics on `handler` when `enabled` is set.
    ///
    /// Returns whether analytics were enabled.
    pub fn enable(&self, handler: &mut RequestResultHandler, logger: Arc<dyn EventLogger>) -> bool {
        if !self.enabled {
            tracing::debug!("Analytics disabled");
            return false;
        }

        let code_map = self
            .codes
            .iter()
            .map(|entry| (entry.code, entry.event.clone()))
            .collect();
        let tag_map = self
            .tags
            .iter()
            .map(|tag| (tag.name.clone(), tag.value))
            .collect();
        handler.enable_analytics(logger, code_map, tag_map);
        tracing::debug!(codes = self.codes.len(), tags = self.tags.len(), "Analytics enabled");
        true
    }
}
