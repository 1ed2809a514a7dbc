use std::collections::BTreeMap;

use axum::{debug_handler, extract::{Path, State}, Json};

use crate::{
    db::{DisplayRecord, Identity, Message, Store},
    AppResult, RelayResult,
};

pub type Conversations = BTreeMap<Identity, Vec<DisplayRecord>>;

/// Every conversation `identity` takes part in. Empty when it has none.
pub async fn conversations(store: &Store, identity: &str) -> RelayResult<Conversations> {
    let messages = store.list_messages().await?;
    Ok(group_by_correspondent(&messages, identity))
}

pub fn group_by_correspondent(messages: &[Message], identity: &str) -> Conversations {
    let mut chats = Conversations::new();
    for msg in messages {
        let other = if msg.sender == identity {
            &msg.receiver
        } else if msg.receiver == identity {
            &msg.sender
        } else {
            continue;
        };

        chats.entry(other.clone())
            .or_default()
            .push(DisplayRecord::from(msg));
    }
    chats
}

#[debug_handler(state = crate::AppState)]
pub async fn chats(
    Path(phone): Path<Identity>,
    State(store): State<Store>,
) -> AppResult<Json<Conversations>> {
    Ok(Json(conversations(&store, &phone).await?))
}
