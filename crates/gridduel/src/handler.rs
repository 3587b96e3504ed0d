//! Per-connection handler: frame decoding, request routing, outbound queue.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a writer task draining this connection's outbound queue
//!   2. Loop: receive frames → decode → dispatch against the registry
//!   3. On close, error or idle timeout: drop the connection from every room

use std::sync::Arc;

use gridduel_protocol::{
    ClientMessage, Codec, ServerMessage, decode_client_message,
};
use gridduel_room::{ParticipantSender, RoomError, RoomRegistry};
use gridduel_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::GridduelError;
use crate::server::ServerState;

/// Drop guard that removes a connection from every room when the handler
/// exits.
///
/// Runs even if the handler panics. Since `Drop` is synchronous, we spawn
/// a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let affected = state.registry.lock().await.disconnect(conn_id);
            tracing::debug!(%conn_id, rooms = affected.len(), "connection cleaned up");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GridduelError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, "client connected");

    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        outbound_rx,
    ));
    let _guard = DisconnectGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let result = loop {
        let received = match state.idle_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, conn.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        tracing::info!(%conn_id, "connection idle, closing");
                        break Ok(());
                    }
                }
            }
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "client disconnected");
                break Ok(());
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "recv error");
                break Err(GridduelError::Transport(e));
            }
        };

        let msg = match decode_client_message(&state.codec, &data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "dropping malformed message");
                continue;
            }
        };

        let mut registry = state.registry.lock().await;
        if let Err(e) = dispatch(&mut registry, conn_id, &outbound, msg) {
            tracing::debug!(%conn_id, error = %e, "request ignored");
        }
    };

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    // _guard drops here → room cleanup fires.
    result
}

/// Drains the outbound queue into the socket.
///
/// Ends once every sender is gone: the handler's own and the clones held
/// by rooms, which the disconnect cleanup drops.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbound_rx: UnboundedReceiver<ServerMessage>,
) {
    let conn_id = conn.id();
    while let Some(msg) = outbound_rx.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, message skipped");
        }
    }
}

/// Applies one decoded request to the registry.
///
/// Join rejections are answered with an `error` message on `outbound`;
/// everything else that fails is silent towards the client. The returned
/// error only tells the caller what to log.
pub(crate) fn dispatch(
    registry: &mut RoomRegistry,
    conn_id: ConnectionId,
    outbound: &ParticipantSender,
    msg: ClientMessage,
) -> Result<(), GridduelError> {
    match msg {
        ClientMessage::Join { room_id } => {
            if let Err(e) = registry.join(room_id, conn_id, outbound.clone()) {
                // The queue only closes once the writer is gone.
                let _ = outbound.send(ServerMessage::error(rejection_text(&e)));
                return Err(e.into());
            }
        }
        ClientMessage::Move { room_id, index } => {
            let room = registry
                .get_mut(&room_id)
                .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
            room.apply_move(conn_id, index)?;
        }
    }
    Ok(())
}

fn rejection_text(err: &RoomError) -> String {
    match err {
        RoomError::RoomFull(_) => "Room is full. Try another room.".to_owned(),
        RoomError::AlreadyInRoom(..) => {
            "You are already in this room.".to_owned()
        }
        RoomError::NotFound(_) => err.to_string(),
    }
}
