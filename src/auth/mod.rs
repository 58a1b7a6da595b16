//! Session plumbing: where the bearer token lives and how to leave a page
//! once the session is gone. No protocol logic lives here.

mod navigator;
mod token;

pub use navigator::{InMemoryNavigator, Navigator, NoopNavigator};
pub use token::{KeyringTokenStore, MemoryTokenStore, TokenStore};
