pub mod bus;
pub mod config;
pub mod dialog;
mod error;
pub mod launcher;
pub mod notify;
pub mod platform;
pub mod status;
pub mod tabs;
pub mod window;

#[cfg(test)]
mod testing;

pub use error::Error;

/// Product label used in the window title and the chat banner.
pub const PRODUCT_NAME: &str = "HamDeck";
