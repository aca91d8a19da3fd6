//! Live-update WebSocket connections.
//!
//! A connection registers one hub session for the route it was opened on and
//! forwards every matching update as a JSON text frame. Client frames are
//! only read to notice the close.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;

use folio_repo::Route;

use super::hub::{HubHandle, Subscription};

/// Longest a single frame may take to send before the client is dropped.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept the upgrade and serve updates for `route`.
pub(crate) fn upgrade(ws: WebSocketUpgrade, hub: HubHandle, route: Route) -> Response {
    ws.on_upgrade(move |socket| {
        let subscription = hub.register(route);
        handle_socket(socket, subscription)
    })
}

/// Pump updates until either side goes away.
///
/// The subscription is owned by this task and unregisters when it ends,
/// whichever way that happens.
async fn handle_socket(mut socket: WebSocket, mut subscription: Subscription) {
    tracing::debug!(id = %subscription.id(), route = %subscription.route(), "Live connection opened");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    // Hub dropped the session or shut down.
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                let Ok(text) = serde_json::to_string(&event) else {
                    continue;
                };
                match tokio::time::timeout(SEND_TIMEOUT, socket.send(Message::Text(text.into()))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(id = %subscription.id(), error = %e, "Live send failed");
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(id = %subscription.id(), "Live send timed out");
                        break;
                    }
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(id = %subscription.id(), "Live connection closed");
}
