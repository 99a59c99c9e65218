use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin, require_employee};
use super::validation::{parse_status, validate_company_name, validate_id};
use super::{
    ApiError, ApiResponse, AppState, RatingRequest, ReferralDto, StatusFilterQuery,
    StatusUpdateRequest, referral_dtos,
};
use crate::domain::{ReferralId, ReferralStatus};
use crate::services::CreateReferral;

type ReferralResponse = Result<Json<ApiResponse<ReferralDto>>, ApiError>;
type ReferralListResponse = Result<Json<ApiResponse<Vec<ReferralDto>>>, ApiError>;

fn referral_id(path: Result<Path<i32>, PathRejection>) -> Result<ReferralId, ApiError> {
    let Path(id) = path?;
    Ok(ReferralId::new(validate_id("referral", id)?))
}

/// POST /referrals
pub async fn create_referral(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<CreateReferral>, JsonRejection>,
) -> ReferralResponse {
    let Json(input) = payload?;

    let request = state.referral_service().create(user.id, input).await?;

    Ok(Json(ApiResponse::success(
        "Referral request created successfully",
        ReferralDto::from(request),
    )))
}

/// GET /referrals/{id}
/// Admin, or the job seeker or employee on the request
pub async fn get_referral(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ReferralResponse {
    let id = referral_id(path)?;
    let service = state.referral_service();

    let request = service.get(id).await?;
    if !user.is_admin() && !service.is_user_involved(id, user.id).await? {
        return Err(ApiError::forbidden("Not involved in this referral request"));
    }

    Ok(Json(ApiResponse::success(
        "Referral request fetched",
        ReferralDto::from(request),
    )))
}

/// GET /referrals/me
pub async fn my_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ReferralListResponse {
    let requests = state.referral_service().list_by_job_seeker(user.id).await?;

    Ok(Json(ApiResponse::success(
        "My referral requests fetched",
        referral_dtos(requests),
    )))
}

/// GET /referrals/received
/// Unclaimed pending requests for the caller's company
pub async fn received_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ReferralListResponse {
    require_employee(&user)?;

    let requests = state
        .referral_service()
        .list_unclaimed_for_employee(&user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Received referral requests fetched",
        referral_dtos(requests),
    )))
}

/// GET /referrals/claimed
pub async fn claimed_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ReferralListResponse {
    let requests = state.referral_service().list_by_employee(user.id).await?;

    Ok(Json(ApiResponse::success(
        "Claimed referral requests fetched",
        referral_dtos(requests),
    )))
}

/// POST /referrals/{id}/claim
pub async fn claim_referral(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ReferralResponse {
    let id = referral_id(path)?;
    require_employee(&user)?;

    let request = state.referral_service().claim(id, &user).await?;

    Ok(Json(ApiResponse::success(
        "Referral request accepted",
        ReferralDto::from(request),
    )))
}

/// PUT /referrals/{id}/status
///
/// `ACCEPTED` claims the request. Other statuses are for the claiming
/// employee, or any employee of the company while the request is unclaimed;
/// the service checks that in the same write as the transition.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ReferralResponse {
    let id = referral_id(path)?;
    let Json(body) = payload?;
    let status = parse_status(body.status())?;
    require_employee(&user)?;

    let service = state.referral_service();

    if status == ReferralStatus::Accepted {
        let request = service.claim(id, &user).await?;
        return Ok(Json(ApiResponse::success(
            "Referral request accepted",
            ReferralDto::from(request),
        )));
    }

    let request = service.set_status(id, status, &user).await?;

    Ok(Json(ApiResponse::success(
        "Referral request status updated",
        ReferralDto::from(request),
    )))
}

/// PUT /referrals/{id}/rating
/// Job seeker only, after hire
pub async fn rate_referral(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> ReferralResponse {
    let id = referral_id(path)?;
    let Json(body) = payload?;
    let service = state.referral_service();

    service.get(id).await?;
    if !service.is_job_seeker_on_request(id, user.id).await? {
        return Err(ApiError::forbidden(
            "Only the job seeker can rate this referral request",
        ));
    }

    let request = service.rate(id, body.rating()).await?;

    Ok(Json(ApiResponse::success(
        "Referral request rated",
        ReferralDto::from(request),
    )))
}

/// GET /referrals/pending
pub async fn pending_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ReferralListResponse {
    require_employee(&user)?;

    let requests = state
        .referral_service()
        .list_by_status(ReferralStatus::Pending)
        .await?;

    Ok(Json(ApiResponse::success(
        "Pending referral requests fetched",
        referral_dtos(requests),
    )))
}

/// GET /referrals/hired
pub async fn hired_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ReferralListResponse {
    let requests = state
        .referral_service()
        .filter_by_status_for_user(user.id, ReferralStatus::Hired)
        .await?;

    Ok(Json(ApiResponse::success(
        "Hired referral requests fetched",
        referral_dtos(requests),
    )))
}

/// GET /referrals/filter?status=
pub async fn filter_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<StatusFilterQuery>,
) -> ReferralListResponse {
    let raw = query
        .status
        .ok_or_else(|| ApiError::validation("status query parameter is required"))?;
    let status = parse_status(&raw)?;

    let requests = state
        .referral_service()
        .filter_by_status_for_user(user.id, status)
        .await?;

    Ok(Json(ApiResponse::success(
        "Filtered referral requests fetched",
        referral_dtos(requests),
    )))
}

/// GET /referrals/company/{name}
/// Admin only
pub async fn company_referrals(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> ReferralListResponse {
    require_admin(&user)?;
    let company = validate_company_name(&name)?;

    let requests = state.referral_service().list_by_company(company).await?;

    Ok(Json(ApiResponse::success(
        "Company referral requests fetched",
        referral_dtos(requests),
    )))
}
