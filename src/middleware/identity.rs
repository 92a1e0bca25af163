use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

pub const ROLE_HEADER: &str = "x-user-role";
pub const TENANT_HEADER: &str = "x-user-tenant";

/// Role and tenant of the caller, as asserted by the upstream identity
/// component. Both are opaque strings; a missing header reads as "".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserIdentity {
    pub role: String,
    pub tenant: String,
}

impl UserIdentity {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            role: header_value(parts, ROLE_HEADER),
            tenant: header_value(parts, TENANT_HEADER),
        }
    }
}

fn header_value(parts: &Parts, name: &str) -> String {
    match parts.headers.get(name).and_then(|v| v.to_str().ok()) {
        Some(value) => value.trim().to_string(),
        None => {
            tracing::debug!("Header '{}' not found, using empty string", name);
            String::new()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(UserIdentity::from_parts(parts))
    }
}
