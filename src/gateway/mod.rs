pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::{Next, from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth::{handlers as auth_handlers, jwt_auth_middleware};
use state::AppState;

/// Log client IP, method and path of every request.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    tracing::info!(
        ip = %ip,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "request"
    );
    response
}

/// Build the full router with state applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Public user routes
    // ==========================================================================
    let public_users = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/check", post(auth_handlers::check_credentials))
        .route("/login", post(auth_handlers::login));

    // ==========================================================================
    // Bearer-protected routes
    // ==========================================================================
    let protected_users = Router::new()
        .route("/renew", post(auth_handlers::renew_token))
        .route("/change-password", post(auth_handlers::change_password))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let actions = Router::new()
        .route("/", get(auth_handlers::list_actions))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/users", public_users.merge(protected_users))
        .nest("/api/v1/actions", actions)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(from_fn(request_log_middleware))
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        );
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
