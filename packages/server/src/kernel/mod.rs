//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod room_listener;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{FcmAdapter, PgRoomStore, ServerDeps};
pub use room_listener::{parse_room_write, run_room_listener, ROOM_WRITES_CHANNEL};
pub use scheduled_tasks::{run_expiry_sweep, start_scheduler};
pub use test_dependencies::TestDependencies;
pub use traits::*;
