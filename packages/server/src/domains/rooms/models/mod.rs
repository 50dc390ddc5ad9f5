pub mod join_request;
pub mod room;

pub use join_request::*;
pub use room::*;
