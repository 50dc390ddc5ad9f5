//! Rooms domain - reacts to writes on game rooms and reclaims stale ones
//!
//! Architecture:
//!   games trigger → room_listener → dispatch_room_write → push service
//!   scheduler → sweep_expired_rooms → room store (one batch delete)

pub mod actions;
pub mod events;
pub mod models;

// Re-export commonly used types
pub use actions::*;
pub use events::{RoomWriteEvent, TransitionKind};
pub use models::{RoomSnapshot, RoomStatus, RECLAIMABLE_STATUSES};
