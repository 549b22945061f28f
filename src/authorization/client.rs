use {
    super::{Allowed, AuthorizationType, Authorizer},
    crate::{ActionError, HttpError, Request, ValueKey},
    std::sync::Arc,
};

/// Authorizes the calling client.
///
/// The client is resolved as an enum case through the request. Whitelist entries
/// match either the case itself or its raw value. A client with global access passes
/// every non-empty whitelist; an empty whitelist denies everyone.
#[derive(Debug)]
pub struct ClientAuthorizer {
    request: Arc<Request>,
}

impl ClientAuthorizer {
    pub fn new(request: Arc<Request>) -> Self {
        Self { request }
    }
}

fn forbidden(client: Option<String>) -> HttpError {
    HttpError::forbidden("Insufficient privileges to access resource!")
        .with_app_code(4030)
        .with_data("Client", client)
}

impl Authorizer for ClientAuthorizer {
    fn authorization_type(&self) -> AuthorizationType {
        AuthorizationType::Client
    }

    fn authorize(&self, allowed: &[Allowed]) -> Result<(), ActionError> {
        let client = self.request.get_as_enum(ValueKey::Client)?;

        if allowed.is_empty() {
            tracing::warn!(client = ?client, "Client denied by empty whitelist");
            return Err(forbidden(client.map(|c| c.value().into_owned())).into());
        }

        let Some(client) = client else {
            tracing::warn!("Unidentified client denied");
            return Err(HttpError::unauthorized("Unauthorized access!")
                .with_app_code(4010)
                .into());
        };

        if client.has_global_access() {
            return Ok(());
        }

        let matches = allowed.iter().any(|entry| match entry {
            Allowed::Tagged(tagged) => *tagged == client,
            Allowed::Raw(raw) => *raw == client.value(),
        });
        if matches {
            return Ok(());
        }

        tracing::warn!(client = %client.value(), "Client not whitelisted");
        Err(forbidden(Some(client.value().into_owned())).into())
    }
}
