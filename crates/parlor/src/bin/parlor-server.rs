//! Standalone parlor server binary.
//!
//! Listens on `PARLOR_ADDR` (default `0.0.0.0:8080`). Tokens that parse
//! as a number become recognized players with that id; everything else,
//! including no token at all, plays as a guest.

use parlor::prelude::*;
use rand::Rng;
use tracing_subscriber::EnvFilter;

struct TokenAuth;

impl Authenticator for TokenAuth {
    async fn authenticate(&self, token: Option<&str>) -> Result<Identity, SessionError> {
        match token.and_then(|t| t.parse::<u64>().ok()) {
            Some(id) => Ok(Identity::recognized(PlayerId(id))),
            None => Ok(Identity::guest(PlayerId(rand::rng().random()))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("PARLOR_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = ParlorServerBuilder::new().bind(&addr).build(TokenAuth).await?;
    tracing::info!(%addr, "parlor server starting");
    server.run().await
}
