//! Controller resolution and dispatch.
//!
//! The [`FrontController`] turns the controller name of a request into the fully
//! qualified name of a controller source file. Routing rules keyed by call
//! (`controller/method`) or controller name either deny a request outright or restrict
//! which lookup paths are searched. Without a rule, every lookup path is searched in
//! registration order and the first match wins.

use {
    crate::{ActionResult, Error, Request, RequestResultHandler, Result},
    regex::Regex,
    std::{
        collections::HashMap,
        fmt,
        path::{Component, Path, PathBuf},
        sync::{Arc, LazyLock},
    },
    walkdir::WalkDir,
};

static CONTROLLER_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]*$").unwrap());

/// A controller action. Receives the request parameters.
pub type Action<C> = fn(&C, &[String]) -> ActionResult;

/// A controller exposes its actions by name.
///
/// ```
/// use corona::{Action, ActionResult, Controller};
///
/// struct UserController;
///
/// impl UserController {
///     fn get(&self, params: &[String]) -> ActionResult {
///         assert!(params.len() <= 1);
///         Ok(())
///     }
/// }
///
/// impl Controller for UserController {
///     fn action(&self, name: &str) -> Option<Action<Self>> {
///         match name {
///             "get" => Some(Self::get),
///             _ => None,
///         }
///     }
/// }
///
/// assert!(UserController.action("get").is_some());
/// assert!(UserController.action("delete").is_none());
/// ```
pub trait Controller: Sized {
    fn action(&self, name: &str) -> Option<Action<Self>>;
}

/// Resolves and dispatches the controller of a request.
pub struct FrontController {
    request: Arc<Request>,
    handler: RequestResultHandler,
    source_extension: String,
    paths: Vec<(String, PathBuf)>,
    routes: HashMap<String, Option<Vec<String>>>,
}

impl FrontController {
    pub const DEFAULT_SOURCE_EXTENSION: &'static str = "rs";

    pub fn new(request: Arc<Request>, handler: RequestResultHandler) -> Self {
        Self {
            request,
            handler,
            source_extension: Self::DEFAULT_SOURCE_EXTENSION.to_string(),
            paths: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// Sets the file extension of controller source files, without the leading dot.
    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.set_source_extension(extension);
        self
    }

    pub fn set_source_extension(&mut self, extension: impl Into<String>) {
        self.source_extension = extension.into();
    }

    pub fn handler(&self) -> &RequestResultHandler {
        &self.handler
    }

    /// Registers a directory to search for controllers.
    ///
    /// Re-registering an identifier replaces its directory but keeps its position.
    pub fn register_lookup_path(&mut self, identifier: impl Into<String>, path: impl Into<PathBuf>) {
        let identifier = identifier.into();
        let path = path.into();
        match self.paths.iter_mut().find(|(id, _)| *id == identifier) {
            Some((_, existing)) => *existing = path,
            None => self.paths.push((identifier, path)),
        }
    }

    /// Adds a routing rule for a call (`controller/method`) or a controller name.
    ///
    /// `None` denies the request. `Some(ids)` restricts the search to the given lookup
    /// paths, in order; an empty list searches all of them.
    pub fn add_routing_rule(&mut self, call: impl Into<String>, route: Option<Vec<String>>) {
        self.routes.insert(call.into(), route);
    }

    /// Searches `directory` for the controller of the current request.
    ///
    /// `list` is a blacklist of controller names when `is_blacklist` is set, and a
    /// whitelist otherwise. Returns the fully qualified name of the single matching
    /// source file, and fails when more than one file matches.
    pub fn get_controller(
        &self,
        directory: &Path,
        list: &[String],
        is_blacklist: bool,
    ) -> Result<Option<String>> {
        let controller = self.request.controller();
        if controller.is_empty() {
            return Ok(None);
        }

        let listed = list.iter().any(|entry| entry == controller);
        if listed == is_blacklist {
            tracing::debug!(controller, is_blacklist, "Controller filtered by list");
            return Ok(None);
        }

        let name = format!("{controller}Controller");
        if !CONTROLLER_NAME_REGEX.is_match(&name) {
            tracing::debug!(controller, "Invalid controller name");
            return Ok(None);
        }

        let file_name = format!("{}.{}", name.replace('-', ""), self.source_extension);

        let mut matches = Vec::new();
        for entry in WalkDir::new(directory) {
            let entry = entry?;
            let matched = entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|found| found.eq_ignore_ascii_case(&file_name));
            if matched {
                matches.push(entry.into_path());
            }
        }

        match matches.as_slice() {
            [] => Ok(None),
            [path] => qualified_name(directory, path).map(Some),
            _ => Err(Error::ambiguous_controller()),
        }
    }

    /// Searches the given lookup paths, in order, for the controller of the current
    /// request. An empty list searches all registered paths; unknown identifiers are
    /// skipped.
    pub fn lookup(&self, identifiers: &[String]) -> Result<Option<String>> {
        if self.paths.is_empty() {
            return Ok(None);
        }

        let directories: Vec<&PathBuf> = if identifiers.is_empty() {
            self.paths.iter().map(|(_, path)| path).collect()
        } else {
            identifiers
                .iter()
                .filter_map(|id| self.paths.iter().find(|(known, _)| known == id))
                .map(|(_, path)| path)
                .collect()
        };

        for directory in directories {
            if let Some(controller) = self.get_controller(directory, &[], true)? {
                return Ok(Some(controller));
            }
        }
        Ok(None)
    }

    /// Resolves the controller of the current request.
    ///
    /// A rule for the call takes precedence over a rule for the controller name.
    pub fn route(&self) -> Result<Option<String>> {
        let call = self.request.call();
        let keys = [call.as_str(), self.request.controller()];

        match keys.iter().find_map(|key| self.routes.get(*key)) {
            Some(None) => {
                tracing::debug!(%call, "Call denied by routing rule");
                Ok(None)
            }
            Some(Some(identifiers)) => self.lookup(identifiers),
            None => self.lookup(&[]),
        }
    }

    /// Runs the requested action of `controller` through the result handler.
    ///
    /// Does nothing when the controller has no such action.
    pub fn dispatch<C: Controller>(&self, controller: &C) -> Result<()> {
        let Some(action) = controller.action(self.request.method()) else {
            tracing::debug!(call = %self.request.call(), "No matching action");
            return Ok(());
        };

        self.handler
            .handle_request(|params| action(controller, params), self.request.params())
    }
}

/// Derives `Some::Module::NameController` from the path of a controller file
/// relative to the searched directory.
fn qualified_name(directory: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(directory)
        .map_err(|err| Error::io(err.to_string()))?
        .with_extension("");

    let segments: Vec<&str> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect();
    Ok(segments.join("::"))
}

impl fmt::Debug for FrontController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontController")
            .field("request", &self.request)
            .field("source_extension", &self.source_extension)
            .field("paths", &self.paths)
            .field("routes", &self.routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, HttpError, Response, RouteTarget};
    use std::fs;
    use tempfile::TempDir;

    fn front(controller: &str) -> FrontController {
        front_for(RouteTarget::new(controller, "method"))
    }

    fn front_for(target: RouteTarget) -> FrontController {
        let request = Arc::new(Request::new(target));
        let handler = RequestResultHandler::new(request.clone(), Arc::new(Response::new()));
        FrontController::new(request, handler)
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    /// Two lookup paths: `project` with a nested function controller and `other` with
    /// a second default controller.
    fn tree() -> TempDir {
        let root = TempDir::new().unwrap();
        touch(root.path(), "project/Project/Package1/FunctionController.rs");
        touch(root.path(), "project/Project/DefaultController.rs");
        touch(root.path(), "project/Project/Notes.txt");
        touch(root.path(), "other/Other/DefaultController.rs");
        touch(root.path(), "other/Other/ReportController.rs");
        root
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    // ========================================================================
    // get_controller
    // ========================================================================

    #[test]
    fn test_get_controller_nested() {
        let root = tree();
        let front = front("function");
        let found = front.get_controller(&root.path().join("project"), &[], true).unwrap();
        assert_eq!(found.as_deref(), Some("Project::Package1::FunctionController"));
    }

    #[test]
    fn test_get_controller_strips_dashes() {
        let root = tree();
        let front = front("func-tion");
        let found = front.get_controller(&root.path().join("project"), &[], true).unwrap();
        assert_eq!(found.as_deref(), Some("Project::Package1::FunctionController"));
    }

    #[test]
    fn test_get_controller_empty_name() {
        let root = tree();
        assert_eq!(front("").get_controller(root.path(), &[], true).unwrap(), None);
    }

    #[test]
    fn test_get_controller_invalid_name() {
        let root = tree();
        assert_eq!(front("../function").get_controller(root.path(), &[], true).unwrap(), None);
        assert_eq!(front("func tion").get_controller(root.path(), &[], true).unwrap(), None);
    }

    #[test]
    fn test_get_controller_blacklist() {
        let root = tree();
        let project = root.path().join("project");
        let front = front("function");
        assert_eq!(front.get_controller(&project, &ids(&["function"]), true).unwrap(), None);
        assert!(front.get_controller(&project, &ids(&["other"]), true).unwrap().is_some());
    }

    #[test]
    fn test_get_controller_whitelist() {
        let root = tree();
        let project = root.path().join("project");
        let front = front("function");
        assert_eq!(front.get_controller(&project, &ids(&["other"]), false).unwrap(), None);
        assert!(front.get_controller(&project, &ids(&["function"]), false).unwrap().is_some());
    }

    #[test]
    fn test_get_controller_not_found() {
        let root = tree();
        assert_eq!(front("missing").get_controller(root.path(), &[], true).unwrap(), None);
    }

    #[test]
    fn test_get_controller_other_extension() {
        let root = tree();
        let front = front("function").with_source_extension("php");
        assert_eq!(front.get_controller(root.path(), &[], true).unwrap(), None);
    }

    #[test]
    fn test_get_controller_ambiguous() {
        let root = tree();
        let err = front("default").get_controller(root.path(), &[], true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousController);
        assert_eq!(err.to_string(), "Found multiple matching controllers!");
    }

    #[test]
    fn test_get_controller_missing_directory() {
        let root = tree();
        let err = front("function")
            .get_controller(&root.path().join("nope"), &[], true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn test_get_controller_ignores_symlink_loop() {
        let root = tree();
        let project = root.path().join("project");
        std::os::unix::fs::symlink(&project, project.join("Project/loop")).unwrap();
        let found = front("function").get_controller(&project, &[], true).unwrap();
        assert_eq!(found.as_deref(), Some("Project::Package1::FunctionController"));
    }

    // ========================================================================
    // lookup and route
    // ========================================================================

    fn registered(target: RouteTarget, root: &TempDir) -> FrontController {
        let mut front = front_for(target);
        front.register_lookup_path("project", root.path().join("project"));
        front.register_lookup_path("other", root.path().join("other"));
        front
    }

    #[test]
    fn test_lookup_without_paths() {
        assert_eq!(front("default").lookup(&[]).unwrap(), None);
    }

    #[test]
    fn test_lookup_first_path_wins() {
        let root = tree();
        let front = registered(RouteTarget::new("default", "method"), &root);
        assert_eq!(front.lookup(&[]).unwrap().as_deref(), Some("Project::DefaultController"));
        assert_eq!(
            front.lookup(&ids(&["other", "project"])).unwrap().as_deref(),
            Some("Other::DefaultController")
        );
    }

    #[test]
    fn test_lookup_skips_unknown_ids() {
        let root = tree();
        let front = registered(RouteTarget::new("report", "method"), &root);
        assert_eq!(
            front.lookup(&ids(&["unknown", "other"])).unwrap().as_deref(),
            Some("Other::ReportController")
        );
        assert_eq!(front.lookup(&ids(&["project"])).unwrap(), None);
    }

    #[test]
    fn test_register_lookup_path_overwrites_in_place() {
        let root = tree();
        let mut front = registered(RouteTarget::new("default", "method"), &root);
        front.register_lookup_path("project", root.path().join("other"));
        assert_eq!(front.lookup(&[]).unwrap().as_deref(), Some("Other::DefaultController"));
    }

    #[test]
    fn test_route_without_rules_searches_all() {
        let root = tree();
        let front = registered(RouteTarget::new("report", "method"), &root);
        assert_eq!(front.route().unwrap().as_deref(), Some("Other::ReportController"));
    }

    #[test]
    fn test_route_blacklisted_call_skips_filesystem() {
        let mut front = front_for(RouteTarget::new("default", "method"));
        // Lookup would fail with an I/O error if it were searched.
        front.register_lookup_path("missing", "/nonexistent/corona/controllers");
        front.add_routing_rule("default/method", None);
        assert_eq!(front.route().unwrap(), None);
    }

    #[test]
    fn test_route_blacklisted_controller() {
        let root = tree();
        let mut front = registered(RouteTarget::new("report", "method"), &root);
        front.add_routing_rule("report", None);
        assert_eq!(front.route().unwrap(), None);
    }

    #[test]
    fn test_route_call_rule_beats_controller_rule() {
        let root = tree();
        let mut front = registered(RouteTarget::new("default", "method"), &root);
        front.add_routing_rule("default", None);
        front.add_routing_rule("default/method", Some(ids(&["other"])));
        assert_eq!(front.route().unwrap().as_deref(), Some("Other::DefaultController"));
    }

    #[test]
    fn test_route_empty_rule_searches_all() {
        let root = tree();
        let mut front = registered(RouteTarget::new("default", "method"), &root);
        front.add_routing_rule("default", Some(Vec::new()));
        assert_eq!(front.route().unwrap().as_deref(), Some("Project::DefaultController"));
    }

    // ========================================================================
    // dispatch
    // ========================================================================

    struct TestController;

    impl TestController {
        fn echo(&self, params: &[String]) -> ActionResult {
            match params {
                [] => Err(HttpError::bad_request("Missing parameter!").into()),
                _ => Ok(()),
            }
        }
    }

    impl Controller for TestController {
        fn action(&self, name: &str) -> Option<Action<Self>> {
            match name {
                "echo" => Some(Self::echo),
                _ => None,
            }
        }
    }

    #[test]
    fn test_dispatch_runs_action() {
        let front = front_for(RouteTarget::new("test", "echo").with_params(["x"]));
        front.dispatch(&TestController).unwrap();
        assert_eq!(front.handler().response().result_code(Some("test/echo")), Some(200));
    }

    #[test]
    fn test_dispatch_records_action_error() {
        let front = front_for(RouteTarget::new("test", "echo"));
        front.dispatch(&TestController).unwrap();
        let response = front.handler().response();
        assert_eq!(response.result_code(Some("test/echo")), Some(400));
        assert_eq!(response.result_message("test/echo").as_deref(), Some("Missing parameter!"));
    }

    #[test]
    fn test_dispatch_unknown_action_is_noop() {
        let front = front_for(RouteTarget::new("test", "missing"));
        front.dispatch(&TestController).unwrap();
        assert!(!front.handler().response().has_custom_result_set());
    }
}
