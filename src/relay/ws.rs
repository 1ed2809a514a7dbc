use axum::{debug_handler, extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade}, response::IntoResponse};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::relay::{ClientEvent, Flow, Relay, ServerEvent};

#[debug_handler(state = crate::AppState)]
pub async fn relay_ws(
    State(relay): State<Relay>,

    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |stream| serve_connection(relay, stream))
}

async fn serve_connection(relay: Relay, stream: WebSocket) {
    let (mut connection, rx) = relay.open();
    let id = connection.handle().id();
    info!("connection {id} opened");

    let (sender, mut receiver) = stream.split();
    let writer = tokio::spawn(write_events(sender, rx));

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(_) | Message::Binary(_) => {}
            Message::Close(_) => break,
            _ => continue,
        }
        let event: ClientEvent = match serde_json::from_slice(&msg.into_data()) {
            Ok(event) => event,
            Err(e) => {
                warn!("connection {id} sent an undecodable frame: {e}");
                continue
            }
        };

        if connection.handle_event(event).await == Flow::Close {
            break;
        }
    }

    // Unbinds and lets the writer drain whatever is still queued.
    drop(connection);
    let _ = writer.await;
    info!("connection {id} closed");
}

async fn write_events(
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not encode {event:?}: {e}");
                continue
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("socket gone, dropping outgoing events");
            return;
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}
