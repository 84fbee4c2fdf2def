//! Tab-scoped session
//!
//! The session is the identity of whoever logged in through this tab. It is
//! written once at login, read by the shell and screens, and cleared at logout.

pub mod storage;
pub mod store;
pub mod types;

pub use storage::{FileTabStorage, MemoryTabStorage, TabStorage};
pub use store::SessionStore;
pub use types::{Session, SessionFields};
