//! Authentication: password digests and cookie sessions.

pub mod password;
pub mod session;

pub use password::hash_password;
pub use session::{session_key, Session, SessionError, SessionSettings, SessionUser};
