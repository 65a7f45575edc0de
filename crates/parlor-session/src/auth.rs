//! Authentication hook for resolving a connection's identity.
//!
//! The server never validates credentials itself. It defines the
//! [`Authenticator`] trait and calls it once per connection during the
//! handshake; deployments plug in whatever actually checks the token
//! (a JWT validator, a database lookup, an accept-everyone stub for
//! development).
//!
//! Unlike a pass/fail check, authentication here always yields an
//! [`Identity`]: an unrecognized token still gets a guest identity with
//! `recognized` false. Guests can play; they just never appear on a
//! leaderboard. Reserve [`SessionError::AuthFailed`] for tokens that are
//! actively malformed or forged, where dropping the connection is the
//! right response.

use parlor_protocol::Identity;

use crate::SessionError;

/// Resolves an optional handshake token into a player identity.
///
/// `Send + Sync + 'static` because the authenticator is shared across
/// all connection tasks for the life of the server.
///
/// # Example
///
/// ```rust
/// use parlor_protocol::{Identity, PlayerId};
/// use parlor_session::{Authenticator, SessionError};
///
/// /// Treats a numeric token as a recognized player id and anything
/// /// else as a guest. Development only.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         token: Option<&str>,
///     ) -> Result<Identity, SessionError> {
///         match token.and_then(|t| t.parse::<u64>().ok()) {
///             Some(id) => Ok(Identity::recognized(PlayerId(id))),
///             None => Ok(Identity::guest(PlayerId(rand_id()))),
///         }
///     }
/// }
/// # fn rand_id() -> u64 { 7 }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves the handshake token (if the client sent one) into an
    /// [`Identity`].
    ///
    /// # Returns
    /// - `Ok(identity)` with `recognized: true` for a valid known player
    /// - `Ok(identity)` with `recognized: false` for a guest
    /// - `Err(SessionError::AuthFailed)` for a token bad enough to
    ///   refuse the connection outright
    fn authenticate(
        &self,
        token: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}
