// Terminal front-end for the snake draft client.

pub mod tui;
