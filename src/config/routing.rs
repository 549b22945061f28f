use {
    crate::{Error, FrontController, Result},
    serde::Deserialize,
    std::{collections::HashSet, path::PathBuf},
};

///
/// Configuration of controller lookup and routing rules.
///
/// ```toml
/// [routing]
/// source_extension = "rs"
///
/// [[routing.lookup_paths]]
/// id = "v1"
/// path = "src/controllers/v1"
///
/// [[routing.rules]]
/// call = "user/delete"
/// deny = true
///
/// [[routing.rules]]
/// call = "user"
/// paths = ["v1"]
/// ```
///
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// File extension of controller source files, without the leading dot.
    /// By default `source_extension` is "rs".
    #[serde(default = "RoutingConfig::default_source_extension")]
    pub source_extension: String,

    /// Directories searched for controllers, in search order.
    #[serde(default)]
    pub lookup_paths: Vec<LookupPathConfig>,

    /// Routing rules keyed by call or controller name.
    #[serde(default)]
    pub rules: Vec<RoutingRuleConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LookupPathConfig {
    pub id: String,
    pub path: PathBuf,
}

/// A rule either denies a call or restricts the lookup paths searched for it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RoutingRuleConfig {
    /// A call (`controller/method`) or a bare controller name.
    pub call: String,

    /// Lookup path ids to search, in order. Empty means all of them.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Denies the call. `paths` is ignored when set.
    #[serde(default)]
    pub deny: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            source_extension: Self::default_source_extension(),
            lookup_paths: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl RoutingConfig {
    fn default_source_extension() -> String {
        FrontController::DEFAULT_SOURCE_EXTENSION.into()
    }

    pub fn validate(&self) -> Result<()> {
        let extension = self.source_extension.trim();
        if extension.is_empty() || extension.starts_with('.') {
            return Err(Error::config(
                "[routing] source_extension must be non-empty and must not start with '.'",
            ));
        }

        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for lookup in &self.lookup_paths {
            if lookup.id.trim().is_empty() {
                return Err(Error::config("[routing] lookup_paths entries need a non-empty id"));
            }
            if lookup.path.as_os_str().is_empty() {
                return Err(Error::config(format!(
                    "[routing] lookup path '{}' needs a non-empty path",
                    lookup.id
                )));
            }
            if !ids.insert(lookup.id.as_str()) {
                return Err(Error::config(format!(
                    "[routing] lookup path id '{}' is defined more than once",
                    lookup.id
                )));
            }
            if !paths.insert(&lookup.path) {
                return Err(Error::config(format!(
                    "[routing] directory '{}' is registered more than once",
                    lookup.path.display()
                )));
            }
        }

        let mut calls = HashSet::new();
        for rule in &self.rules {
            if rule.call.trim().is_empty() {
                return Err(Error::config("[routing] rules entries need a non-empty call"));
            }
            if !calls.insert(rule.call.as_str()) {
                return Err(Error::config(format!(
                    "[routing] rule for '{}' is defined more than once",
                    rule.call
                )));
            }
            if let Some(unknown) = rule.paths.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(Error::config(format!(
                    "[routing] rule for '{}' names unknown lookup path '{unknown}'",
                    rule.call
                )));
            }
        }

        Ok(())
    }

    /// Registers the lookup paths and routing rules with `front_controller`.
    pub fn apply(&self, front_controller: &mut FrontController) {
        front_controller.set_source_extension(self.source_extension.trim());
        for lookup in &self.lookup_paths {
            front_controller.register_lookup_path(&lookup.id, &lookup.path);
        }
        for rule in &self.rules {
            let route = (!rule.deny).then(|| rule.paths.clone());
            front_controller.add_routing_rule(&rule.call, route);
        }
        tracing::debug!(
            lookup_paths = self.lookup_paths.len(),
            rules = self.rules.len(),
            "Routing configured"
        );
    }
}
