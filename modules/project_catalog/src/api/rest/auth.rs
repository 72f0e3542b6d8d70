//! Bearer token authentication
//!
//! No `Authorization` header means an anonymous caller. A header that is
//! present but malformed or carries an invalid token is rejected with 401,
//! also on read-only routes.

use super::error::{map_domain_error, Problem};
use crate::contract::{CatalogError, Principal};
use crate::domain::Service;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue, StatusCode};
use std::sync::Arc;

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Principal::Anonymous);
        };
        let token = token_from_header(header)
            .ok_or_else(|| map_domain_error(CatalogError::Unauthenticated))?;

        let service = parts.extensions.get::<Arc<Service>>().cloned().ok_or_else(|| {
            tracing::error!("catalog service missing from request extensions");
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?;

        service.authenticate(token).await.map_err(map_domain_error)
    }
}

/// Token from `Bearer <token>` or `Token <token>`
fn token_from_header(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token");
    (known && !token.is_empty()).then_some(token)
}
