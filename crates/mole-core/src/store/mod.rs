//! On-disk state that outlives a single run.

pub mod session;
pub mod sink;

pub use session::{Session, SessionStore, SESSION_VERSION};
pub use sink::DualSink;
