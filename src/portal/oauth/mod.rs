//! Usage: OAuth code-flow helpers for the desktop sign-in relay.
//!
//! Uses the Adapter Design Pattern: a provider implements `OAuthProvider`,
//! and the portal routes dispatch through `Arc<dyn OAuthProvider>`.

pub(crate) mod adapters;
pub(crate) mod pending;
pub(crate) mod pkce;
pub(crate) mod provider_trait;
pub(crate) mod token_exchange;
pub(crate) mod token_info;
pub(crate) mod user_info;
