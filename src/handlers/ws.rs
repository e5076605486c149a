//! Live view of a user's records.
//!
//! Each watched collection pushes `{"collection", "path", "value"}` once on
//! connect and again after every write under it.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::auth::middleware::{authenticate, AuthUser};
use crate::store::{paths, ChangeCallback, StoreResult, Subscription};
use crate::AppState;

const COLLECTIONS: [&str; 4] = ["habits", "moods", "stats", "wellnessScores"];

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        return (StatusCode::UNAUTHORIZED, "Missing token query parameter").into_response();
    };
    let user = match authenticate(&state, token) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

async fn subscribe(
    state: &AppState,
    uid: &str,
    tx: mpsc::UnboundedSender<String>,
) -> StoreResult<Vec<Subscription>> {
    let mut subscriptions = Vec::with_capacity(COLLECTIONS.len());
    for collection in COLLECTIONS {
        let path = format!("{}/{}", paths::user_root(uid), collection);
        let tx = tx.clone();
        let watched = path.clone();
        let callback: ChangeCallback = Arc::new(move |value: Option<&Value>| {
            let frame = json!({
                "collection": collection,
                "path": watched,
                "value": value,
            });
            // receiver gone means the socket is closing
            let _ = tx.send(frame.to_string());
        });
        subscriptions.push(state.store.on_change(&path, callback).await?);
    }
    Ok(subscriptions)
}

async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let subscriptions = match subscribe(&state, &user.id, tx).await {
        Ok(subscriptions) => subscriptions,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "WebSocket subscribe failed");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::debug!(
        user_id = %user.id,
        watched = subscriptions.len(),
        "WebSocket connection established"
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let uid = user.id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!(user_id = %uid, message = %text, "Ignoring client message");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // unregisters the listeners
    drop(subscriptions);
    tracing::debug!(user_id = %user.id, "WebSocket connection closed");
}
