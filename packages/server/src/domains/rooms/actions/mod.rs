//! Room domain actions - business logic functions
//!
//! Actions are plain async functions that take their collaborators as trait
//! objects, so the change-feed listener, the scheduler and tests all call the
//! same code.

mod classify_transition;
mod dispatch_join_request;
mod sweep_expired;

pub use classify_transition::classify_transition;
pub use dispatch_join_request::{dispatch_room_write, DispatchResult, SkipReason};
pub use sweep_expired::{sweep_expired_rooms, SweepConsistency, SweepError, SweepResult};
