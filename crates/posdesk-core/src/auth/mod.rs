//! Authentication state for the admin client.
//!
//! This module provides:
//! - `SessionStore`: the shared token/username/role record with derived role flags
//! - `SessionStorage`: where that record is persisted (`FileStorage`, `MemoryStorage`)
//!
//! The session is written through to storage on every mutation and
//! rehydrated when the store is opened.

pub mod session;
pub mod storage;

pub use session::{Credentials, PersistedSession, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
