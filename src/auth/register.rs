use axum::{debug_handler, extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::{appresult::success, db::{Account, Role, Store}, AppResult, RelayResult};

use super::Credentials;

/// Creates a `user` account; `Conflict` when the phone number is taken.
pub async fn register(store: &Store, Credentials { phone, name, password }: Credentials) -> RelayResult<()> {
    store.insert_account(&Account {
        phone,
        name,
        password,
        role: Role::User,
    }).await?;
    Ok(())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register_handler(
    State(store): State<Store>,
    Json(credentials): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    let phone = credentials.phone.clone();
    register(&store, credentials).await?;
    info!("registered {phone}");
    Ok(success())
}
