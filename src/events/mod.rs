//! Event handling for Arbilo.
//!
//! Terminal input is polled by [`EventHandler`] and translated into store
//! actions using the configured key bindings.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, KeyBinding, Modifiers};
