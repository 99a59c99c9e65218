use axum::{
    Json,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::observability::AuthOutcome;
use super::validation::validate_provider;
use super::{ApiError, ApiResponse, AppState, TokenExchangeRequest, UserDto};
use crate::models::user::User;

/// Caller resolved by [`auth_middleware`], available to protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// ============================================================================
// Middleware
// ============================================================================

/// Verifies the `Authorization: Bearer <id token>` header, provisions the
/// caller on first sight, and blocks unverified password accounts.
///
/// Every response is tagged with an [`AuthOutcome`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(err) => {
            let outcome = if matches!(err, ApiError::VerificationRequired) {
                AuthOutcome::VerificationRequired
            } else {
                AuthOutcome::Rejected
            };
            let mut response = err.into_response();
            outcome.attach(&mut response);
            return response;
        }
    };

    let outcome = AuthOutcome::Authenticated(user.id);
    request.extensions_mut().insert(CurrentUser(user));

    let mut response = next.run(request).await;
    outcome.attach(&mut response);
    response
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let identity = state.identity().verify(token).await?;
    let user = state.user_service().resolve_or_provision(&identity).await?;

    if user.requires_verification() {
        return Err(ApiError::VerificationRequired);
    }

    Ok(user)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/{provider}
/// Exchange an identity provider token for the local profile
pub async fn exchange_token(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    payload: Result<Json<TokenExchangeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    validate_provider(&provider)?;
    let Json(payload) = payload?;

    let token = payload.id_token.trim();
    if token.is_empty() {
        return Err(ApiError::validation("ID token is required"));
    }

    let identity = state.identity().verify(token).await?;
    let user = state.user_service().resolve_or_provision(&identity).await?;

    if user.requires_verification() {
        return Err(ApiError::VerificationRequired);
    }

    let outcome = AuthOutcome::Authenticated(user.id);
    let mut response = Json(ApiResponse::success(
        "Authentication successful",
        UserDto::from(user),
    ))
    .into_response();
    outcome.attach(&mut response);

    Ok(response)
}

pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

pub fn require_employee(user: &User) -> Result<(), ApiError> {
    if user.has_employee_access() {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Employee access required. Set a company on your profile first.",
        ))
    }
}
