mod connection;
mod events;
mod msg;
mod registry;
mod ws;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{db::Store, AppState};

pub use connection::{Connection, ConnectionState, Flow};
pub use events::{ClientEvent, SendMessage, ServerEvent};
pub use msg::RouteError;
pub use registry::{ConnectionHandle, SessionRegistry, OUTBOX_CAPACITY};

#[derive(Clone)]
pub struct Relay {
    pub registry: Arc<SessionRegistry>,
    pub store: Store,
}

impl Relay {
    pub fn new(store: Store) -> Relay {
        Relay {
            registry: Arc::new(SessionRegistry::default()),
            store,
        }
    }

    pub fn open(&self) -> (Connection, tokio::sync::mpsc::Receiver<ServerEvent>) {
        let (handle, rx) = ConnectionHandle::channel();
        (Connection::new(self.clone(), handle), rx)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::relay_ws))
}
