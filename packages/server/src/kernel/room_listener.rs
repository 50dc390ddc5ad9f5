//! Change-feed listener for room writes.
//!
//! The `games` trigger publishes a before/after image of every INSERT and
//! UPDATE on the `room_writes` channel. Each notification is parsed and
//! dispatched on its own task, so writes to different rooms are handled
//! concurrently and a slow push send never blocks the feed.

use anyhow::{Context, Result};
use futures::StreamExt;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domains::rooms::{dispatch_room_write, DispatchResult, RoomWriteEvent};
use crate::kernel::ServerDeps;

/// Channel the `notify_room_write` trigger publishes on.
pub const ROOM_WRITES_CHANNEL: &str = "room_writes";

/// Parse a change-feed payload into a room write event
pub fn parse_room_write(payload: &str) -> Result<RoomWriteEvent> {
    serde_json::from_str(payload).context("Malformed room write payload")
}

/// Listen for room writes until the connection fails.
///
/// Notifications published while the listener is reconnecting are lost; the
/// feed is best-effort like the notifications it drives.
pub async fn run_room_listener(pool: &PgPool, deps: ServerDeps) -> Result<()> {
    let mut listener = PgListener::connect_with(pool)
        .await
        .context("Failed to connect room write listener")?;
    listener
        .listen(ROOM_WRITES_CHANNEL)
        .await
        .context("Failed to subscribe to room writes")?;

    info!(channel = ROOM_WRITES_CHANNEL, "Listening for room writes");

    let mut notifications = listener.into_stream();
    while let Some(notification) = notifications.next().await {
        let notification = notification.context("Room write listener connection failed")?;
        spawn_dispatch(notification.payload(), &deps);
    }

    Ok(())
}

/// Dispatch one payload on its own task. Malformed payloads are dropped.
pub fn spawn_dispatch(payload: &str, deps: &ServerDeps) -> Option<JoinHandle<DispatchResult>> {
    let event = match parse_room_write(payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Dropping room write notification");
            return None;
        }
    };

    let push_service = deps.push_service.clone();
    Some(tokio::spawn(async move {
        dispatch_room_write(&event, push_service.as_ref()).await
    }))
}
