//! Connection identity for the parlor server.
//!
//! Authentication proper is a collaborator, not something this crate
//! implements: the [`Authenticator`] trait turns a connection's token
//! into an [`Identity`](parlor_protocol::Identity) — a player id plus a
//! "recognized" flag — and the [`SessionManager`] tracks which identities
//! are currently connected. Rooms and scoring only ever see the resolved
//! identity.

mod auth;
mod error;
mod manager;

pub use auth::Authenticator;
pub use error::SessionError;
pub use manager::{Session, SessionManager};
