//! Client-side session storage.
//!
//! Two key-value stores back the session: a durable store that survives
//! restarts and a session-scoped store that lives only as long as the
//! process. [`TokenStore`] combines them and knows which keys hold which
//! piece of session data.

mod file;
mod memory;
mod token_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use token_store::{Persistence, TokenStore};

use crate::error::Result;
use std::fmt::Debug;

/// Well-known storage keys.
pub mod keys {
    pub const AUTH_TOKEN: &str = "authToken";
    pub const USER: &str = "user";
    pub const ADMIN_TOKEN: &str = "adminToken";
    pub const ADMIN_USER: &str = "adminUser";
    pub const REMEMBERED_EMAIL: &str = "rememberedEmail";
    pub const REMEMBERED_PASSWORD: &str = "rememberedPassword";
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
