// Business domains
pub mod rooms;
