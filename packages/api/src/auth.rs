// ABOUTME: Session identity for API requests
// ABOUTME: Reads the user id and email vouched for by the upstream identity provider

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use storefront_core::CustomerIdentity;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity of the caller; anonymous when the provider sent no headers
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity(pub CustomerIdentity);

impl SessionIdentity {
    pub fn from_parts(parts: &Parts) -> Self {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        SessionIdentity(CustomerIdentity {
            user_id: header(USER_ID_HEADER),
            email: header(USER_EMAIL_HEADER),
        })
    }
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
