//! Per-connection handler: greeting, request routing, and the event
//! gateway.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection's outbox in the directory
//!   2. Send `Welcome` with the connection id
//!   3. Spawn the writer task pumping the outbox onto the socket
//!   4. Loop: receive requests → route to the registry or directory
//!   5. On close: leave the current room, vacating any held seat
//!
//! The outbox is the room-layer `MemberSender`: the same channel a room
//! actor broadcasts into is drained here, so everything a client sees —
//! direct answers and room broadcasts alike — leaves through one ordered
//! queue.

use std::sync::Arc;

use flipside_protocol::{
    ClientRequest, Codec, ConnectionId, MoveRejection, ServerEvent,
};
use flipside_rules::Coord;
use flipside_transport::{Connection, WebSocketConnection};
use rand::Rng;
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::FlipsideError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), FlipsideError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (events_tx, mut events_rx) =
        mpsc::unbounded_channel::<ServerEvent>();

    state
        .directory
        .lock()
        .await
        .register(conn_id, events_tx.clone());

    // The greeting goes through the outbox too, so it is ordered before
    // everything else the client will see.
    let _ = events_tx.send(ServerEvent::Welcome {
        connection_id: conn_id,
    });

    // Writer task: drain the outbox onto the socket. The transport's
    // send path locks independently of recv, so this never contends
    // with the read loop below.
    let conn = Arc::new(conn);
    let writer_conn = Arc::clone(&conn);
    let writer_state = Arc::clone(&state);
    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let bytes = match writer_state.codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // Read loop: decode and route requests until the peer goes away.
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "failed to decode request"
                );
                let _ = events_tx.send(ServerEvent::Error {
                    message: format!("invalid request: {e}"),
                });
                continue;
            }
        };

        handle_request(&state, conn_id, &events_tx, request).await;
    }

    // Cleanup: vacate any held seat and drop the directory entry. Seats
    // are only released here, never inferred mid-game from a failed send.
    state.registry.lock().await.disconnect(conn_id).await;
    state.directory.lock().await.unregister(conn_id);

    // Dropping our outbox sender ends the writer once room clones are
    // gone too (disconnect above removed them), letting it drain any
    // queued events first.
    drop(events_tx);
    let _ = writer.await;
    let _ = conn.close().await;

    tracing::debug!(%conn_id, "connection handler finished");
    Ok(())
}

/// Routes one decoded request.
async fn handle_request(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    events_tx: &mpsc::UnboundedSender<ServerEvent>,
    request: ClientRequest,
) {
    match request {
        ClientRequest::JoinRoom { room, username } => {
            state
                .directory
                .lock()
                .await
                .set_username(conn_id, &username);

            // Lock only for the join itself; broadcasts go through the
            // actor's member channels, not this lock.
            let result = {
                let mut registry = state.registry.lock().await;
                registry
                    .join(conn_id, room.clone(), username, events_tx.clone())
                    .await
            };

            match result {
                Ok(seat) => {
                    let _ = events_tx
                        .send(ServerEvent::Joined { room, seat });
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "join failed");
                    let _ = events_tx.send(ServerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        ClientRequest::ProposeMove {
            room,
            row,
            col,
            color,
        } => {
            let result = state
                .registry
                .lock()
                .await
                .propose_move(conn_id, &room, color, Coord::new(row, col))
                .await;

            // A proposal from outside the room never reaches the actor;
            // it is refused here as a wrong-player move.
            if let Err(e) = result {
                tracing::debug!(%conn_id, error = %e, "move refused");
                let _ = events_tx.send(ServerEvent::Rejected {
                    room,
                    reason: MoveRejection::WrongPlayer,
                });
            }
        }

        ClientRequest::LeaveRoom { room } => {
            let result = state
                .registry
                .lock()
                .await
                .leave(conn_id, &room)
                .await;
            if let Err(e) = result {
                tracing::debug!(%conn_id, error = %e, "leave failed");
            }
        }

        ClientRequest::Chat { room, message } => {
            let result = state
                .registry
                .lock()
                .await
                .chat(conn_id, &room, message)
                .await;
            if let Err(e) = result {
                let _ = events_tx.send(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        ClientRequest::Invite { to } => {
            let mut directory = state.directory.lock().await;
            let username = directory
                .username_of(conn_id)
                .unwrap_or_default()
                .to_string();
            if !directory.invite(conn_id, to) {
                let _ = events_tx.send(ServerEvent::Error {
                    message: format!("no such connection: {to}"),
                });
                return;
            }
            directory.send_to(
                to,
                ServerEvent::Invited {
                    from: conn_id,
                    username,
                },
            );
        }

        ClientRequest::Uninvite { to } => {
            let mut directory = state.directory.lock().await;
            if directory.uninvite(conn_id, to) {
                directory
                    .send_to(to, ServerEvent::Uninvited { from: conn_id });
            }
        }

        ClientRequest::StartGame { to } => {
            let mut directory = state.directory.lock().await;
            if !directory.invite_between(conn_id, to) {
                let _ = events_tx.send(ServerEvent::Error {
                    message: format!("no pending invite with {to}"),
                });
                return;
            }
            directory.clear_invites_between(conn_id, to);

            let match_id = mint_match_id();
            tracing::info!(
                %conn_id, opponent = %to, %match_id, "match starting"
            );
            directory.send_to(
                to,
                ServerEvent::GameStarting {
                    match_id: match_id.clone(),
                    opponent: conn_id,
                },
            );
            let _ = events_tx.send(ServerEvent::GameStarting {
                match_id,
                opponent: to,
            });
        }
    }
}

/// Mints a short hex room name for an accepted match. Both sides join
/// the room named by it; uniqueness does not matter beyond avoiding
/// casual collisions, since rooms are keyed by name and an occupied one
/// simply seats the first two arrivals.
fn mint_match_id() -> String {
    let n: u32 = rand::rng().random_range(1..=0x0010_0000);
    format!("{n:x}")
}
