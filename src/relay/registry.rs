use std::{collections::HashMap, fmt};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;
use uuid::Uuid;

use crate::{db::Identity, RelayError, RelayResult};

use super::events::ServerEvent;

/// Events a stalled socket may fall behind by before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 64;

/// One live transport session. Events pushed here are written to the socket
/// by the session's writer task; once that task is gone they are dropped.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn channel() -> (ConnectionHandle, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        (ConnectionHandle { id: Uuid::now_v7(), tx }, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns false when the event was dropped: the connection is gone or
    /// its outbox is full.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("outbox of connection {} is full, dropping event", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConnectionHandle({})", self.id)
    }
}

/// Identity -> live connection, at most one per identity. All mutations go
/// through one lock so concurrent joins for the same identity have a single winner.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Identity, ConnectionHandle>>,
}

impl SessionRegistry {
    pub fn bind(&self, identity: &str, handle: ConnectionHandle) -> RelayResult<()> {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(identity) {
            return Err(RelayError::AlreadyLoggedIn);
        }
        sessions.insert(identity.to_owned(), handle);
        Ok(())
    }

    /// Drops whichever identity `handle` is bound to. Returns that identity.
    pub fn unbind(&self, handle: &ConnectionHandle) -> Option<Identity> {
        let mut sessions = self.sessions.lock();
        let identity = sessions
            .iter()
            .find_map(|(identity, bound)| (bound == handle).then(|| identity.clone()))?;
        sessions.remove(&identity);
        Some(identity)
    }

    pub fn lookup(&self, identity: &str) -> Option<ConnectionHandle> {
        self.sessions.lock().get(identity).cloned()
    }
}
