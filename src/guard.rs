//! Request preconditions: authorization and API version checks.

use {
    crate::{
        ActionError, Allowed, ApiVersioned, AuthorizationType, Authorizer, Error, HttpError,
        Request, ValueKey,
    },
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Gatekeeper for controller actions.
///
/// Holds one [`Authorizer`] per [`AuthorizationType`]; registering a second authorizer
/// for the same type replaces the first.
///
/// ```
/// use std::sync::Arc;
/// use corona::{
///     ActionError, Allowed, AuthorizationType, HttpSource, IpAuthorizer, Request,
///     RequestGuard, RouteTarget, ServerInfo,
/// };
///
/// let source = Arc::new(HttpSource::new().with_server(ServerInfo {
///     remote_addr: Some("10.0.0.1".into()),
///     ..ServerInfo::default()
/// }));
/// let request = Arc::new(Request::new(RouteTarget::new("status", "get")));
///
/// let mut guard = RequestGuard::new(request);
/// guard.register_authorizer(IpAuthorizer::new(source));
///
/// assert!(guard.authorize(AuthorizationType::Ip, &[Allowed::from("10.0.0.1")]).is_ok());
/// assert!(matches!(
///     guard.authorize(AuthorizationType::Client, &[]),
///     Err(ActionError::Fatal(_))
/// ));
/// ```
pub struct RequestGuard {
    request: Arc<Request>,
    authorizers: HashMap<AuthorizationType, Box<dyn Authorizer>>,
}

impl RequestGuard {
    pub fn new(request: Arc<Request>) -> Self {
        Self {
            request,
            authorizers: HashMap::new(),
        }
    }

    /// Registers an authorizer under its own authorization type.
    pub fn register_authorizer(&mut self, authorizer: impl Authorizer + 'static) {
        let kind = authorizer.authorization_type();
        if self.authorizers.insert(kind, Box::new(authorizer)).is_some() {
            tracing::debug!(authorization_type = %kind, "Replaced authorizer");
        }
    }

    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.register_authorizer(authorizer);
        self
    }

    /// Checks the current actor against `allowed` using the authorizer for `kind`.
    ///
    /// Fails with [`ActionError::Fatal`] when no authorizer is registered for `kind`.
    pub fn authorize(&self, kind: AuthorizationType, allowed: &[Allowed]) -> Result<(), ActionError> {
        let authorizer = self
            .authorizers
            .get(&kind)
            .ok_or_else(|| Error::unregistered_authorizer(kind))?;
        authorizer.authorize(allowed)
    }

    /// Requires the request to target at least API version `minimum`.
    ///
    /// A missing version is a `400 Bad Request`; an older one is a
    /// `412 Precondition Failed`. A version parsed into a type other than `V` is a
    /// configuration error.
    pub fn validate_api_version<V: ApiVersioned>(&self, minimum: &V) -> Result<(), ActionError> {
        let Some(parsed) = self.request.get_as_enum(ValueKey::ApiVersion)? else {
            return Err(HttpError::bad_request("No API version specified!")
                .with_data("apiVersion", None::<String>)
                .into());
        };

        let Some(version) = parsed.downcast_ref::<V>() else {
            return Err(Error::config(format!(
                "API version \"{}\" is not a {}",
                parsed.value(),
                std::any::type_name::<V>()
            ))
            .into());
        };

        if !version.is_at_least(minimum) {
            return Err(
                HttpError::precondition_failed("API version is no longer supported!").into(),
            );
        }

        Ok(())
    }
}

impl fmt::Debug for RequestGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGuard")
            .field("request", &self.request)
            .field("authorizers", &self.authorizers.keys().collect::<Vec<_>>())
            .finish()
    }
}
