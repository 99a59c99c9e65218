use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::sync::Arc;
use tracing::info;

use super::auth::{CurrentUser, require_admin};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::UserId;
use crate::models::user::User;
use crate::services::{DeletionReport, ProfileUpdate};

fn require_self_or_admin(caller: &User, target: UserId) -> Result<(), ApiError> {
    if caller.id == target || caller.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("You can only access your own profile"))
    }
}

/// GET /users/me
pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success("User fetched", UserDto::from(user)))
}

/// DELETE /users/me
/// Best-effort removal at the identity provider and locally.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<DeletionReport>>, ApiError> {
    let report = state
        .user_service()
        .delete_by_subject_id(&user.external_subject_id)
        .await?;

    if !report.succeeded() {
        return Err(ApiError::internal(format!(
            "Local account for user {} still present after deletion",
            user.id
        )));
    }

    info!(user_id = %user.id, "Account deleted by owner");
    Ok(Json(ApiResponse::success("User deleted", report)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Path(id) = path?;
    let id = UserId::new(validate_id("user", id)?);
    require_self_or_admin(&caller, id)?;

    let user = state.user_service().get_by_id(id).await?;
    if user.requires_verification() {
        return Err(ApiError::forbidden("User email is not verified"));
    }

    Ok(Json(ApiResponse::success("User fetched", UserDto::from(user))))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Path(id) = path?;
    let id = UserId::new(validate_id("user", id)?);
    require_self_or_admin(&caller, id)?;
    let Json(update) = payload?;

    let user = state.user_service().update_profile(id, update).await?;

    Ok(Json(ApiResponse::success("User updated", UserDto::from(user))))
}

/// GET /users/employees
/// Admin only
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    require_admin(&caller)?;

    let users = state.user_service().list_employees().await?;

    Ok(Json(ApiResponse::success(
        "Employees fetched",
        users.into_iter().map(UserDto::from).collect(),
    )))
}
