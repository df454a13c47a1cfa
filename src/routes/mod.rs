use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod health;
pub mod middleware_auth;
pub mod tasks;
pub mod users;

pub use auth::{login, me, register};
pub use health::health;

use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .nest(
            "/api",
            Router::new()
                .route("/me", get(me))
                .route("/tasks", post(tasks::routes::create).get(tasks::routes::list))
                .route("/tasks/update", post(tasks::routes::update))
                .route("/tasks/{id}", delete(tasks::routes::delete))
                .layer(middleware::from_fn_with_state(state, middleware_auth::identify)),
        )
}

/// Full application: routes, state, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    routes(state.clone())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

async fn root() -> &'static str {
    "Daily to-do list API"
}
