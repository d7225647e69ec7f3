//! In-memory stand-in for the ERP backend.
//!
//! Serves the same wire envelope (`{success, result, message}`) and path
//! conventions as the real API under `/api`, so the request layer can be
//! exercised end to end over real HTTP.

mod handlers;
mod store;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub use handlers::reply;
pub use store::{Record, Store};

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub db: Db,
    /// When set, every route except `login` requires `Bearer <token>`.
    pub token: Option<String>,
}

/// Router without authentication.
pub fn app() -> Router {
    router(AppState::default())
}

/// Router that rejects requests lacking `Authorization: Bearer <token>`.
pub fn app_with_token(token: impl Into<String>) -> Router {
    router(AppState {
        db: Db::default(),
        token: Some(token.into()),
    })
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/settings",
            get(handlers::get_settings)
                .post(handlers::replace_settings)
                .patch(handlers::update_settings),
        )
        .route("/{entity}/create", post(handlers::create))
        .route("/{entity}/read/{id}", get(handlers::read))
        .route("/{entity}/update/{id}", patch(handlers::update))
        .route("/{entity}/delete/{id}", delete(handlers::remove))
        .route("/{entity}/list", get(handlers::list))
        .route("/{entity}/listAll", get(handlers::list_all))
        .route("/{entity}/filter", get(handlers::filter))
        .route("/{entity}/search", get(handlers::search))
        .route("/{entity}/summary", get(handlers::summary))
        .route("/{entity}/upload/{id}", patch(handlers::upload))
        .route("/{entity}/mail/", post(handlers::mail))
        .route("/{entity}/convert/{id}", get(handlers::convert))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .route("/login", post(handlers::login));

    Router::new()
        .nest("/api", api)
        .route("/public/{name}", get(handlers::public_image))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = &state.token else {
        return next.run(request).await;
    };
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(expected.as_str()) {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "rejected request without valid bearer token");
        reply(
            StatusCode::UNAUTHORIZED,
            false,
            serde_json::Value::Null,
            "Authentication credentials were not provided.",
        )
    }
}
