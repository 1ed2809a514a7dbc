pub mod admin;
pub mod appresult;
pub mod auth;
pub mod chats;
pub mod config;
pub mod db;
pub mod error;
pub mod relay;

use axum::{extract::FromRef, http::{HeaderValue, Method}, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};
pub use error::{RelayError, RelayResult};

use db::Store;
use relay::Relay;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub relay: Relay,
}

impl AppState {
    pub fn new(store: Store) -> AppState {
        AppState {
            relay: Relay::new(store.clone()),
            store,
        }
    }
}

pub fn app(app_state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .merge(auth::router())
        .merge(relay::router())
        .route("/chats/{phone}", get(chats::chats))
        .nest("/admin", admin::router())

        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
