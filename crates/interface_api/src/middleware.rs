//! API middleware

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use core_kernel::OwnerId;
use domain_claims::owner_folder;

use crate::auth::{has_role, permissions, AuthClaims};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores its claims in the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("missing or invalid Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match crate::auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(error = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Audit logging middleware
///
/// One line per API request, naming the caller. Server errors log at warn.
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let user = request
        .extensions()
        .get::<AuthClaims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| OwnerId::ANONYMOUS.to_string());

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(%method, %path, %user, status, elapsed_ms, "claims API request failed");
    } else {
        info!(%method, %path, %user, status, elapsed_ms, "claims API request");
    }

    response
}

/// Document access middleware
///
/// Runs after [`auth_middleware`]. Uploaded documents live under
/// `/files/claims/<owner>/`; only that owner and reviewers may read them.
/// Anyone else gets the same 404 as a missing file.
pub async fn document_access_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let user = request
        .extensions()
        .get::<AuthClaims>()
        .ok_or(ApiError::Unauthorized)?;

    let folder = path
        .strip_prefix("/files/claims/")
        .and_then(|rest| rest.split('/').next());
    let allowed = has_role(user, permissions::CLAIM_REVIEW)
        || (has_role(user, permissions::CLAIM_READ)
            && folder == Some(owner_folder(&user.owner_id()).as_str()));

    if !allowed {
        warn!(user = %user.sub, %path, "document access refused");
        return Err(ApiError::NotFound("Document".to_string()));
    }

    Ok(next.run(request).await)
}
