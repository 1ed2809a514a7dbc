mod messages;
mod users;

use axum::{routing::{delete, get}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{phone}", delete(users::delete_user).put(users::update_user))
        .route("/messages", get(messages::list_messages))
        .route("/messages/{id}", delete(messages::delete_message))
}
