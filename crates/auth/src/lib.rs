//! `stockdesk-auth`: authentication boundary for the client.
//!
//! Session model, credential validation, the process-wide session-change
//! channel and the guard that gates protected screens. No HTTP or storage
//! code lives here.

pub mod channel;
pub mod credentials;
pub mod guard;
pub mod session;

pub use channel::{AuthEvent, SessionChange, SessionChannel, SessionSubscription};
pub use credentials::{Credentials, MIN_PASSWORD_LENGTH, Registration};
pub use guard::{Access, SessionGuard, SessionState};
pub use session::{AuthUser, Session, SessionValidationError, validate_session};
