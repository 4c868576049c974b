use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{SurveyService, SurveyStore};
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{dashboard, health, public, surveys};

#[derive(Clone)]
pub struct AppState {
    pub service: SurveyService,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Builds the application around a storage backend.
pub fn create_app(config: Config, store: Arc<dyn SurveyStore>) -> Result<Router, JwtError> {
    let service = SurveyService::new(store, config.limits.schema_limits());
    create_app_with_service(config, service)
}

/// Builds the application around a preconfigured survey service.
pub fn create_app_with_service(config: Config, service: SurveyService) -> Result<Router, JwtError> {
    let config = Arc::new(config);

    let jwt = JwtConfig::from_secret(
        &config.auth.jwt_secret,
        config.auth.audience.clone(),
        config.auth.leeway_secs,
    )?;

    let rate_limiter =
        RateLimiterState::new(config.security.public_rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        service,
        config: config.clone(),
        jwt: Arc::new(jwt),
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Owner routes authenticate per handler through the OwnerAuth extractor
    let owner_routes = Router::new()
        .route(
            "/api/v1/surveys",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/api/v1/surveys/:survey_id",
            get(surveys::get_survey)
                .patch(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route(
            "/api/v1/surveys/:survey_id/publish",
            post(surveys::publish_survey),
        )
        .route(
            "/api/v1/surveys/:survey_id/unpublish",
            post(surveys::unpublish_survey),
        )
        .route(
            "/api/v1/surveys/:survey_id/analytics",
            get(surveys::get_analytics),
        )
        .route(
            "/api/v1/surveys/:survey_id/responses",
            get(surveys::list_responses),
        )
        .route(
            "/api/v1/surveys/:survey_id/responses/export",
            get(surveys::export_responses),
        )
        .route("/api/v1/dashboard", get(dashboard::get_dashboard));

    // Respondent routes (share token only), rate limited per client IP
    let respondent_routes = Router::new()
        .route("/api/v1/s/:token", get(public::get_shared_survey))
        .route("/api/v1/responses", post(public::submit_response))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let ops_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let router = Router::new()
        .merge(ops_routes)
        .merge(respondent_routes)
        .merge(owner_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(router)
}
