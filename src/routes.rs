use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::config;
use crate::database::manager;
use crate::handlers::{protected, public};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/signup", post(public::auth::signup))
        .route("/api/login", post(public::auth::login))
        .route("/api/logout", get(public::auth::logout))
        .route("/api/me", get(public::auth::me))
        .route("/api/users", get(public::users::list))
        .route("/api/properties", get(public::properties::list));

    let protected_routes = Router::new()
        .route("/api/properties/add", post(protected::properties::add))
        .route(
            "/api/properties/:id",
            put(protected::properties::update).delete(protected::properties::remove),
        )
        .route("/api/property/:id/contact", get(protected::properties::contact))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::require_session,
        ));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(
            config().uploads.public_prefix.as_str(),
            ServeDir::new(&config().uploads.dir),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config().server.max_request_size_bytes));

    if config().server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Estate API",
        "version": version,
        "description": "Real-estate listing portal backend (Axum)",
        "endpoints": {
            "auth": "/api/signup, /api/login, /api/logout, /api/me (public)",
            "users": "/api/users (public)",
            "properties": "/api/properties (public), /api/properties/add, /api/properties/:id (session required)",
            "contact": "/api/property/:id/contact (session required)",
            "uploads": "/uploads/* (static)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "ok": false,
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
