use std::collections::BTreeMap;

use axum::{debug_handler, extract::{Path, State}, response::IntoResponse, Json};
use tracing::info;

use crate::{appresult::success, db::{Account, AccountUpdate, Identity, Store}, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_users(
    State(store): State<Store>,
) -> AppResult<Json<BTreeMap<Identity, Account>>> {
    let users = store.list_accounts().await?
        .into_iter()
        .map(|account| (account.phone.clone(), account))
        .collect();
    Ok(Json(users))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_user(
    Path(phone): Path<Identity>,
    State(store): State<Store>,
    Json(update): Json<AccountUpdate>,
) -> AppResult<impl IntoResponse> {
    store.update_account(&phone, update).await?;
    info!("admin updated {phone}");
    Ok(success())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_user(
    Path(phone): Path<Identity>,
    State(store): State<Store>,
) -> AppResult<impl IntoResponse> {
    store.delete_account(&phone).await?;
    info!("admin deleted {phone}");
    Ok(success())
}
