// Library root for the draft synchronization engine.

pub mod board;
pub mod chat;
pub mod config;
pub mod draft;
pub mod focus;
pub mod pool;
pub mod presence;
pub mod protocol;
pub mod transport;
