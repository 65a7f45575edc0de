//! Per-connection handler: handshake, auth, and message routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive `hello` → authenticate token → resolve [`Identity`]
//!   2. Register the session, send `welcome`
//!   3. Loop: decode client messages → route to rooms / scoreboard
//!
//! A writer task drains one outbound channel per connection. Rooms get
//! clones of that channel's sender, so room broadcasts and direct
//! replies share a single ordered path to the socket.
//!
//! After the handshake nothing is ever refused out loud: bad input is
//! logged and dropped, and the client realigns from the next broadcast.

use std::collections::HashSet;
use std::sync::Arc;

use parlor_games::GameKind;
use parlor_protocol::{
    ClientMessage, Codec, Identity, ProtocolError, RoomKey, ServerMessage,
};
use parlor_session::Authenticator;
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::transport::WebSocketConnection;
use crate::ParlorError;

/// How long a fresh connection has to say hello.
const HANDSHAKE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A: Authenticator>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A>>,
) -> Result<(), ParlorError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let identity = perform_handshake(&conn, &state).await?;
    let player_id = identity.player_id;
    tracing::info!(%conn_id, %player_id, recognized = identity.recognized, "player authenticated");

    // The session lock is never held across a socket write: a refused
    // duplicate that stops reading must not stall other handshakes.
    let created = {
        let mut sessions = state.sessions.lock().await;
        sessions.create(identity).map(|_| ())
    };
    if let Err(e) = created {
        send_error(&conn, &state.codec, &e.to_string()).await?;
        return Err(e.into());
    }

    // One outbound channel per connection; rooms broadcast into clones
    // of its sender. The writer task is the only place that touches the
    // socket's sink after this point.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let bytes = match codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode outbound message");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    let _ = outbound_tx.send(ServerMessage::Welcome {
        player_id,
        recognized: identity.recognized,
    });

    // Rooms this connection joined, so departure can be fanned out on
    // disconnect.
    let mut joined: HashSet<(GameKind, RoomKey)> = HashSet::new();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "undecodable message, ignoring");
                continue;
            }
        };

        match msg {
            ClientMessage::Hello { .. } => {
                tracing::debug!(%player_id, "repeated hello, ignoring");
            }

            ClientMessage::Join { game, room } => {
                let handle = state.registry.get_or_create(game, &room);
                match handle.join(identity, outbound_tx.clone()).await {
                    Ok(seat) => {
                        tracing::debug!(%player_id, %game, room, ?seat, "joined room");
                        joined.insert((game, room));
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "join refused");
                    }
                }
            }

            ClientMessage::Action { game, room, payload } => {
                // A payload shaped for another game never reaches the
                // room.
                if payload.kind() != game {
                    tracing::debug!(%player_id, %game, "action payload for wrong game, ignoring");
                    continue;
                }
                if let Some(handle) = state.registry.get(game, &room) {
                    let _ = handle.action(player_id, payload).await;
                }
            }

            ClientMessage::Restart { game, room } => {
                if let Some(handle) = state.registry.get(game, &room) {
                    let _ = handle.restart(player_id).await;
                }
            }

            ClientMessage::Leave { game, room } => {
                if let Some(handle) = state.registry.get(game, &room) {
                    if let Err(e) = handle.leave(player_id).await {
                        tracing::debug!(%player_id, error = %e, "leave failed");
                    }
                }
                joined.remove(&(game, room));
            }

            ClientMessage::Leaderboard { game, limit } => {
                let entries = state.scores.leaderboard(game, limit);
                let _ = outbound_tx.send(ServerMessage::Leaderboard { game, entries });
            }
        }
    }

    // Teardown: drop out of every room, then the session.
    for (game, key) in joined.drain() {
        if let Some(handle) = state.registry.get(game, &key) {
            let _ = handle.leave(player_id).await;
        }
    }
    {
        let mut sessions = state.sessions.lock().await;
        let _ = sessions.disconnect(player_id);
    }
    drop(outbound_tx);
    writer.abort();

    Ok(())
}

/// Receives `hello`, authenticates the token, and resolves the identity.
async fn perform_handshake<A: Authenticator>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A>>,
) -> Result<Identity, ParlorError> {
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before hello".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("hello timed out".into()).into());
        }
    };

    let msg: ClientMessage = state.codec.decode(&data)?;
    let token = match msg {
        ClientMessage::Hello { token } => token,
        _ => {
            send_error(conn, &state.codec, "expected hello").await?;
            return Err(ProtocolError::InvalidMessage(
                "first message must be hello".into(),
            )
            .into());
        }
    };

    match state.auth.authenticate(token.as_deref()).await {
        Ok(identity) => Ok(identity),
        Err(e) => {
            send_error(conn, &state.codec, "unauthorized").await?;
            Err(e.into())
        }
    }
}

/// The one place the server complains out loud: handshake failures.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    message: &str,
) -> Result<(), ParlorError> {
    let msg = ServerMessage::Error {
        message: message.to_string(),
    };
    let bytes = codec.encode(&msg)?;
    conn.send(&bytes).await?;
    Ok(())
}
