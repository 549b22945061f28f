//! Access checks keyed by authorization type.
//!
//! An [`Authorizer`] decides, given a whitelist, whether the current actor may
//! proceed. The [`RequestGuard`](crate::RequestGuard) holds one authorizer per
//! [`AuthorizationType`] and routes `authorize` calls to it.

mod client;
mod ip;

pub use client::*;
pub use ip::*;

use {
    crate::{ActionError, EnumValue, RequestEnum},
    std::{borrow::Cow, fmt},
};

/// The strategies an actor can be authorized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationType {
    /// The calling client, as resolved by the client parser.
    Client,
    /// The address of the caller.
    Ip,
}

impl fmt::Display for AuthorizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationType::Client => f.write_str("Client"),
            AuthorizationType::Ip => f.write_str("IP"),
        }
    }
}

/// A whitelist entry: either a raw value or an enum case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allowed {
    Raw(String),
    Tagged(EnumValue),
}

impl Allowed {
    pub fn tagged<E: RequestEnum>(value: E) -> Self {
        Allowed::Tagged(EnumValue::new(value))
    }

    /// The raw form of the entry; enum cases yield their backing value.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Allowed::Raw(raw) => Cow::Borrowed(raw),
            Allowed::Tagged(value) => value.value(),
        }
    }
}

impl From<&str> for Allowed {
    fn from(value: &str) -> Self {
        Allowed::Raw(value.to_string())
    }
}

impl From<String> for Allowed {
    fn from(value: String) -> Self {
        Allowed::Raw(value)
    }
}

impl From<EnumValue> for Allowed {
    fn from(value: EnumValue) -> Self {
        Allowed::Tagged(value)
    }
}

/// Decides access for one [`AuthorizationType`].
///
/// Denials are [`ActionError::Http`] errors; failures to resolve the actor are
/// propagated as [`ActionError::Fatal`].
pub trait Authorizer: Send + Sync {
    fn authorization_type(&self) -> AuthorizationType;

    /// Succeeds when the current actor is covered by `allowed`.
    fn authorize(&self, allowed: &[Allowed]) -> Result<(), ActionError>;
}
