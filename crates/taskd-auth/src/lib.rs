//! Stateless authentication for the Taskd server.
//!
//! This crate provides:
//! - Bearer credential issuance (signed, self-contained HS256 tokens)
//! - Credential verification as a pure function of (token, secret, clock)
//! - Building blocks for the server's authentication middleware
//!
//! Verification requires no storage lookup: the token embeds the identity
//! claims and its own expiry, and only holders of the shared signing
//! secret can mint or alter one.

pub mod config;
pub mod error;
pub mod middleware;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::{AuthState, bearer_token, unauthorized_response};
pub use token::{IdentityClaims, TokenService};
