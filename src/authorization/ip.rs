use {
    super::{Allowed, AuthorizationType, Authorizer},
    crate::{ActionError, HttpError, HttpSource},
    std::sync::Arc,
};

/// Authorizes the caller by IP address.
///
/// The address is taken from `X-Forwarded-For`, falling back to the remote address of
/// the connection. A forwarded list passes when any of its entries is whitelisted.
#[derive(Debug)]
pub struct IpAuthorizer {
    source: Arc<HttpSource>,
}

impl IpAuthorizer {
    pub fn new(source: Arc<HttpSource>) -> Self {
        Self { source }
    }

    fn ip(&self) -> Option<&str> {
        self.source
            .header("X-Forwarded-For")
            .or(self.source.server().remote_addr.as_deref())
    }
}

fn forbidden(ip: Option<&str>) -> HttpError {
    HttpError::forbidden("IP not whitelisted to access resource!")
        .with_app_code(4031)
        .with_data("IP", ip)
}

impl Authorizer for IpAuthorizer {
    fn authorization_type(&self) -> AuthorizationType {
        AuthorizationType::Ip
    }

    fn authorize(&self, allowed: &[Allowed]) -> Result<(), ActionError> {
        let ip = self.ip();

        if allowed.is_empty() {
            tracing::warn!(ip = ?ip, "IP denied by empty whitelist");
            return Err(forbidden(ip).into());
        }

        let whitelisted = ip.unwrap_or_default().split(',').map(str::trim).any(|candidate| {
            allowed.iter().any(|entry| entry.as_str() == candidate)
        });
        if whitelisted {
            return Ok(());
        }

        tracing::warn!(ip = ?ip, "IP not whitelisted");
        Err(forbidden(ip).into())
    }
}
