use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{IdentityProvider, ReferralService, UserService};
use crate::state::SharedState;

pub mod auth;
mod error;
mod observability;
mod referrals;
mod types;
mod users;
mod validation;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use observability::AuthOutcome;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.shared.identity
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn referral_service(&self) -> &Arc<dyn ReferralService> {
        &self.shared.referral_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(health))
        .route("/metrics", get(observability::get_metrics))
        .route("/auth/{provider}", post(auth::exchange_token))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::request_observer))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(users::get_me).delete(users::delete_me))
        .route("/users/employees", get(users::list_employees))
        .route("/users/{id}", get(users::get_user).put(users::update_user))
        .route("/referrals", post(referrals::create_referral))
        .route("/referrals/me", get(referrals::my_referrals))
        .route("/referrals/received", get(referrals::received_referrals))
        .route("/referrals/claimed", get(referrals::claimed_referrals))
        .route("/referrals/pending", get(referrals::pending_referrals))
        .route("/referrals/hired", get(referrals::hired_referrals))
        .route("/referrals/filter", get(referrals::filter_referrals))
        .route(
            "/referrals/company/{name}",
            get(referrals::company_referrals),
        )
        .route("/referrals/{id}", get(referrals::get_referral))
        .route("/referrals/{id}/claim", post(referrals::claim_referral))
        .route("/referrals/{id}/status", put(referrals::update_status))
        .route("/referrals/{id}/rating", put(referrals::rate_referral))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let status = if state.store().ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::success(
        "Service is running",
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        },
    ))
}
