use pairchat::{
    chats::conversations,
    db::{display_time, DisplayRecord, Store},
    relay::{ClientEvent, Connection, ConnectionState, Flow, Relay, SendMessage, ServerEvent},
};
use tokio::sync::mpsc::Receiver;

async fn relay() -> Relay {
    Relay::new(Store::connect("sqlite::memory:", 1).await.unwrap())
}

async fn joined(relay: &Relay, identity: &str) -> (Connection, Receiver<ServerEvent>) {
    let (mut conn, rx) = relay.open();
    assert_eq!(conn.handle_event(ClientEvent::Join(identity.to_owned())).await, Flow::Continue);
    (conn, rx)
}

fn send(sender: &str, receiver: &str, text: &str) -> ClientEvent {
    ClientEvent::SendMessage(SendMessage {
        sender: sender.to_owned(),
        receiver: receiver.to_owned(),
        text: text.to_owned(),
    })
}

fn received(rx: &mut Receiver<ServerEvent>) -> DisplayRecord {
    match rx.try_recv() {
        Ok(ServerEvent::ReceiveMessage(record)) => record,
        other => panic!("expected receiveMessage, got {other:?}"),
    }
}

#[tokio::test]
async fn two_users_exchange_a_message() {
    let relay = relay().await;
    let (mut a, mut a_rx) = joined(&relay, "A").await;
    let (_b, mut b_rx) = joined(&relay, "B").await;

    a.handle_event(send("A", "B", "hi")).await;

    let at_b = received(&mut b_rx);
    let at_a = received(&mut a_rx);
    assert_eq!(at_b.sender, "A");
    assert_eq!(at_b.text, "hi");
    assert_eq!(at_a, at_b);

    let stored = relay.store.list_messages().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(display_time(stored[0].time), at_b.time);

    let a_view = conversations(&relay.store, "A").await.unwrap();
    assert_eq!(a_view.len(), 1);
    assert_eq!(a_view["B"], vec![at_b.clone()]);

    let b_view = conversations(&relay.store, "B").await.unwrap();
    assert_eq!(b_view.len(), 1);
    assert_eq!(b_view["A"], vec![at_b]);
}

#[tokio::test]
async fn duplicate_join_leaves_first_session_intact() {
    let relay = relay().await;
    let (first, _first_rx) = joined(&relay, "A").await;

    let (mut second, mut second_rx) = relay.open();
    assert_eq!(second.handle_event(ClientEvent::Join("A".to_owned())).await, Flow::Close);
    assert_eq!(second_rx.try_recv().unwrap(), ServerEvent::LoginError("User already logged in".to_owned()));
    drop(second);

    assert_eq!(first.state(), &ConnectionState::Joined("A".to_owned()));
    let (mut c, _c_rx) = joined(&relay, "C").await;
    c.handle_event(send("C", "A", "still there?")).await;
    assert_eq!(relay.registry.lookup("A").as_ref(), Some(first.handle()));
}

#[tokio::test]
async fn one_sender_keeps_submission_order() {
    let relay = relay().await;
    let (mut a, mut a_rx) = joined(&relay, "A").await;
    let (_b, mut b_rx) = joined(&relay, "B").await;

    for text in ["m1", "m2", "m3"] {
        a.handle_event(send("A", "B", text)).await;
    }

    let stored: Vec<_> = relay.store.list_messages().await.unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(stored, ["m1", "m2", "m3"]);

    for text in ["m1", "m2", "m3"] {
        assert_eq!(received(&mut b_rx).text, text);
        assert_eq!(received(&mut a_rx).text, text);
    }
}

#[tokio::test]
async fn offline_receiver_finds_message_later() {
    let relay = relay().await;
    let (mut a, mut a_rx) = joined(&relay, "A").await;

    a.handle_event(send("A", "B", "while you were out")).await;
    let echo = received(&mut a_rx);
    drop(a);

    let (_b, mut b_rx) = joined(&relay, "B").await;
    assert!(b_rx.try_recv().is_err());

    let view = conversations(&relay.store, "B").await.unwrap();
    assert_eq!(view["A"], vec![echo]);
}

#[tokio::test]
async fn echo_is_not_stored_twice() {
    let relay = relay().await;
    let (mut a, mut a_rx) = joined(&relay, "A").await;

    a.handle_event(send("A", "B", "once")).await;
    let echo = received(&mut a_rx);

    let stored = relay.store.list_messages().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, echo.text);
    assert_eq!(display_time(stored[0].time), echo.time);
}

#[tokio::test]
async fn lost_message_is_reported_to_sender() {
    let relay = relay().await;
    let (mut a, mut a_rx) = joined(&relay, "A").await;
    let (_b, mut b_rx) = joined(&relay, "B").await;
    relay.store.close().await;

    assert_eq!(a.handle_event(send("A", "B", "hi")).await, Flow::Continue);

    assert_eq!(a_rx.try_recv().unwrap(), ServerEvent::MessageError("Message could not be sent".to_owned()));
    assert!(b_rx.try_recv().is_err());
    assert_eq!(a.state(), &ConnectionState::Joined("A".to_owned()));
}
