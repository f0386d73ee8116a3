use crate::broadcast::{ChannelObserver, Snapshot, OBSERVER_CHANNEL_CAPACITY};
use crate::config::Configuration;
use crate::engine::TrafficGenerator;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(generator): State<TrafficGenerator>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, generator))
}

async fn handle_websocket(socket: WebSocket, generator: TrafficGenerator) {
    let (observer, snapshots) = ChannelObserver::channel(OBSERVER_CHANNEL_CAPACITY);
    let observer_id = match generator.subscribe(Arc::new(observer)) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "failed to register websocket observer");
            return;
        }
    };
    tracing::debug!(observer = %observer_id, "websocket connected");

    let (sender, mut receiver) = socket.split();
    let mut send_task = tokio::spawn(forward_snapshots(snapshots, sender));

    let push_generator = generator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => handle_push(&push_generator, &text),
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    generator.unsubscribe(observer_id);
    tracing::debug!(observer = %observer_id, "websocket disconnected");
}

async fn forward_snapshots<S>(mut snapshots: mpsc::Receiver<Snapshot>, mut sender: S)
where
    S: Sink<Message> + Unpin,
{
    while let Some(snapshot) = snapshots.recv().await {
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode snapshot");
                continue;
            }
        };

        if sender.send(Message::Text(json)).await.is_err() {
            return;
        }
    }
}

/// Malformed pushes are dropped; the connection stays open.
fn handle_push(generator: &TrafficGenerator, text: &str) {
    match serde_json::from_str::<Configuration>(text) {
        Ok(config) => generator.on_config_push(config),
        Err(e) => tracing::warn!(error = %e, "ignoring malformed configuration push"),
    }
}
