use tracing::{info, warn};

use crate::db::Identity;

use super::{events::{ClientEvent, ServerEvent}, msg, ConnectionHandle, Relay};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unauthenticated,
    Joined(Identity),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Server side of one transport session. Events are handled one at a time, so
/// messages from one sender are persisted and delivered in submission order.
/// Dropping the connection releases its registry binding.
pub struct Connection {
    relay: Relay,
    handle: ConnectionHandle,
    state: ConnectionState,
}

impl Connection {
    pub(crate) fn new(relay: Relay, handle: ConnectionHandle) -> Connection {
        Connection {
            relay,
            handle,
            state: ConnectionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub async fn handle_event(&mut self, event: ClientEvent) -> Flow {
        let joined = match &self.state {
            ConnectionState::Unauthenticated => None,
            ConnectionState::Joined(identity) => Some(identity.clone()),
            ConnectionState::Closed => return Flow::Close,
        };

        match (joined, event) {
            (None, ClientEvent::Join(identity)) => self.join(identity),
            (Some(joined), ClientEvent::Join(identity)) => {
                warn!("{joined} tried to join again as {identity}, ignoring");
                Flow::Continue
            }
            (Some(joined), ClientEvent::SendMessage(message)) => {
                if let Err(e) = msg::send_msg(&self.relay, &self.handle, &joined, message).await {
                    warn!("message from {joined} not sent: {e}");
                    self.handle.send(ServerEvent::MessageError(e.to_string()));
                }
                Flow::Continue
            }
            (None, ClientEvent::SendMessage(_)) => {
                self.handle.send(ServerEvent::MessageError("Join before sending messages".to_owned()));
                Flow::Continue
            }
        }
    }

    fn join(&mut self, identity: Identity) -> Flow {
        match self.relay.registry.bind(&identity, self.handle.clone()) {
            Ok(()) => {
                info!("User {identity} joined");
                self.state = ConnectionState::Joined(identity);
                Flow::Continue
            }
            Err(e) => {
                warn!("rejecting join for {identity}: {e}");
                self.handle.send(ServerEvent::LoginError(e.to_string()));
                self.state = ConnectionState::Closed;
                Flow::Close
            }
        }
    }

    /// Terminal transition; unbinds if this connection had joined.
    pub fn close(&mut self) {
        if let ConnectionState::Joined(identity) = &self.state {
            if self.relay.registry.unbind(&self.handle).is_some() {
                info!("User {identity} disconnected");
            }
        }
        self.state = ConnectionState::Closed;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use crate::{db::Store, relay::SendMessage};

    use super::*;

    async fn relay() -> Relay {
        Relay::new(Store::connect("sqlite::memory:", 1).await.unwrap())
    }

    #[tokio::test]
    async fn second_join_for_live_identity_is_rejected_then_closed() {
        let relay = relay().await;
        let (mut first, _first_rx) = relay.open();
        let (mut second, mut second_rx) = relay.open();

        assert_eq!(first.handle_event(ClientEvent::Join("A".to_owned())).await, Flow::Continue);
        assert_eq!(second.handle_event(ClientEvent::Join("A".to_owned())).await, Flow::Close);

        assert_eq!(
            second_rx.try_recv().unwrap(),
            ServerEvent::LoginError("User already logged in".to_owned())
        );
        assert_eq!(second.state(), &ConnectionState::Closed);
        assert_eq!(first.state(), &ConnectionState::Joined("A".to_owned()));

        drop(second);
        assert_eq!(relay.registry.lookup("A").as_ref(), Some(first.handle()));
    }

    #[tokio::test]
    async fn drop_releases_identity_for_a_new_session() {
        let relay = relay().await;
        let (mut first, _rx) = relay.open();
        first.handle_event(ClientEvent::Join("A".to_owned())).await;
        drop(first);

        assert!(relay.registry.lookup("A").is_none());
        let (mut again, _rx) = relay.open();
        assert_eq!(again.handle_event(ClientEvent::Join("A".to_owned())).await, Flow::Continue);
    }

    #[tokio::test]
    async fn send_before_join_is_refused() {
        let relay = relay().await;
        let (mut conn, mut rx) = relay.open();

        let flow = conn
            .handle_event(ClientEvent::SendMessage(SendMessage {
                sender: "A".to_owned(),
                receiver: "B".to_owned(),
                text: "hi".to_owned(),
            }))
            .await;

        assert_eq!(flow, Flow::Continue);
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::MessageError(_)));
        assert_eq!(conn.state(), &ConnectionState::Unauthenticated);
        assert!(relay.store.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejoin_on_joined_connection_is_ignored() {
        let relay = relay().await;
        let (mut conn, _rx) = relay.open();
        conn.handle_event(ClientEvent::Join("A".to_owned())).await;

        assert_eq!(conn.handle_event(ClientEvent::Join("B".to_owned())).await, Flow::Continue);
        assert_eq!(conn.state(), &ConnectionState::Joined("A".to_owned()));
        assert!(relay.registry.lookup("B").is_none());
    }
}
