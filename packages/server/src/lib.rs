// Game Rooms - Reaction Engine Core
//
// Reacts to room writes in the shared `games` table: pushes a join-request
// notification to the host when a room enters `pendingJoin`, and sweeps rooms
// that expired while still waiting for a match.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
