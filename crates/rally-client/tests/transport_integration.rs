//! Integration tests for the client WebSocket transport.
//!
//! These tests run a real WebSocket server on a loopback port and verify
//! delivery order, the single terminal close, and silence after `close()`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rally_client::transport::{self, TransportEvent};
use rally_proto::{Envelope, MoveDirection};
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// Bind a loopback listener and return it with its `ws://` URL.
async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    (listener, url)
}

#[tokio::test]
async fn frames_arrive_in_order_then_one_close() {
    let (listener, url) = listen().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        for i in 0..20 {
            let text = format!(r#"{{"type":"players","content":["p{i}"]}}"#);
            ws.send(Message::text(text)).await.unwrap();
        }
        ws.close(None).await.unwrap();
    });

    let mut client = transport::connect(&url).await.unwrap();

    for i in 0..20 {
        let event = timeout(WAIT, client.recv()).await.unwrap();
        let Some(TransportEvent::Frame(bytes)) = &event else {
            panic!("expected frame {i}, got {event:?}");
        };
        let expected = format!(r#"{{"type":"players","content":["p{i}"]}}"#);
        assert_eq!(bytes, expected.as_bytes());
    }

    let closed = timeout(WAIT, client.recv()).await.unwrap();
    assert!(matches!(closed, Some(TransportEvent::Closed { .. })));
    assert_eq!(timeout(WAIT, client.recv()).await.unwrap(), None);
    assert!(client.is_closed());
}

#[tokio::test]
async fn sent_envelopes_reach_server() {
    let (listener, url) = listen().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut received = Vec::new();
        while received.len() < 2 {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => received.push(text),
                Some(Ok(_)) => {},
                _ => break,
            }
        }
        received
    });

    let client = transport::connect(&url).await.unwrap();
    client.send(&Envelope::Challenge("bob".into())).unwrap();
    client.send(&Envelope::Move(MoveDirection::Up)).unwrap();

    let received = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(Envelope::decode_str(&received[0]).unwrap(), Envelope::Challenge("bob".into()));
    assert_eq!(Envelope::decode_str(&received[1]).unwrap(), Envelope::Move(MoveDirection::Up));
}

#[tokio::test]
async fn nothing_delivered_after_close() {
    let (listener, url) = listen().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        loop {
            if ws.send(Message::text(r#"{"type":"gameOver"}"#)).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });

    let mut client = transport::connect(&url).await.unwrap();
    let first = timeout(WAIT, client.recv()).await.unwrap();
    assert!(matches!(first, Some(TransportEvent::Frame(_))));

    client.close();

    assert_eq!(client.try_recv(), None);
    assert_eq!(timeout(WAIT, client.recv()).await.unwrap(), None);
    assert!(client.send(&Envelope::Move(MoveDirection::Down)).is_err());
}

#[tokio::test]
async fn connect_fails_without_server() {
    let (listener, url) = listen().await;
    drop(listener);

    let result = timeout(WAIT, transport::connect(&url)).await.unwrap();
    assert!(result.is_err(), "connect should fail with nothing listening");
}
