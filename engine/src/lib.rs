pub mod config;
pub mod error;
pub mod path;
pub mod phase;
pub mod roles;
pub mod round;
pub mod tickets;
pub mod types;
pub mod zones;


pub use error::{Result, RoundError};
pub use types::*;
