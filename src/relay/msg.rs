use thiserror::Error;
use tracing::{debug, error};

use crate::{
    db::{now_millis, DisplayRecord},
    RelayError,
};

use super::{events::{SendMessage, ServerEvent}, ConnectionHandle, Relay};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Sender does not match the joined user")]
    SenderMismatch,
    #[error("Message text is empty")]
    EmptyText,
    #[error("Message could not be sent")]
    Lost(#[from] RelayError),
}

/// Persists `msg` and then relays it: to the receiver if it is online, and
/// always back to `from` as the delivery confirmation. Nothing is delivered
/// unless the write succeeded.
pub(crate) async fn send_msg(
    relay: &Relay,
    from: &ConnectionHandle,
    joined_as: &str,

    SendMessage { sender, receiver, text }: SendMessage,
) -> Result<DisplayRecord, RouteError> {
    if sender != joined_as {
        return Err(RouteError::SenderMismatch);
    }
    if text.is_empty() {
        return Err(RouteError::EmptyText);
    }

    let msg = relay.store
        .append_message(&sender, &receiver, &text, now_millis())
        .await
        .inspect_err(|e| error!("dropping message {sender} -> {receiver}: {e}"))?;
    let record = DisplayRecord::from(&msg);

    if let Some(to) = relay.registry.lookup(&receiver) {
        if to != *from && !to.send(ServerEvent::ReceiveMessage(record.clone())) {
            debug!("receiver {receiver} went away before delivery");
        }
    }
    from.send(ServerEvent::ReceiveMessage(record.clone()));

    Ok(record)
}
