use crate::{Error, Result, Value, ValueDomain, ValueKey, ValueParser};

/// Serves the route group and route name.
///
/// Both are fixed at construction; applications that route before dispatching
/// replace the defaults with the matched route.
#[derive(Debug, Clone)]
pub struct RouteInfoParser {
    group: String,
    name: String,
}

impl RouteInfoParser {
    pub const DEFAULT_GROUP: &'static str = "general";
    pub const DEFAULT_NAME: &'static str = "/general/pre-routing";

    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl Default for RouteInfoParser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GROUP, Self::DEFAULT_NAME)
    }
}

impl ValueParser for RouteInfoParser {
    fn domain(&self) -> ValueDomain {
        ValueDomain::RouteInfo
    }

    fn get(&self, key: ValueKey) -> Result<Option<Value>> {
        match key {
            ValueKey::RouteGroup => Ok(Some(self.group.as_str().into())),
            ValueKey::RouteName => Ok(Some(self.name.as_str().into())),
            _ => Err(Error::unsupported_value(key)),
        }
    }
}
