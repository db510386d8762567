// TUI widget modules for each board panel.

pub mod board;
pub mod chat;
pub mod order;
pub mod pool;
pub mod status_bar;
