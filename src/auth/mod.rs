mod login;
mod register;

use axum::{routing::post, Router};
use serde::Deserialize;

use crate::AppState;

pub use login::login;
pub use register::register;

/// Body shared by `/register` and `/login`.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub phone: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register_handler))
        .route("/login", post(login::login_handler))
}
