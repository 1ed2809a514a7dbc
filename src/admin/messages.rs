use std::collections::BTreeMap;

use axum::{debug_handler, extract::{Path, State}, response::IntoResponse, Json};

use crate::{appresult::success, db::{Message, Store}, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_messages(
    State(store): State<Store>,
) -> AppResult<Json<BTreeMap<String, Message>>> {
    let messages = store.list_messages().await?
        .into_iter()
        .map(|msg| (msg.id.clone(), msg))
        .collect();
    Ok(Json(messages))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message(
    Path(id): Path<String>,
    State(store): State<Store>,
) -> AppResult<impl IntoResponse> {
    store.delete_message(&id).await?;
    Ok(success())
}
