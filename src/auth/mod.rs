//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! private key
//!     → signature.rs (address, public key, signed "{address}-{timestamp}")
//!     → token.rs (form POST to /connect/token, single-slot cache)
//!     → Authorization header for REST calls
//! ```
//!
//! # Security Constraints
//! - Keys, signatures and access tokens are redacted in `Debug`
//! - Token endpoint failures carry the server body only

pub mod signature;
pub mod token;

pub use signature::{build_auth_payload, SignaturePayload};
pub use token::{AuthError, AuthToken, TokenCache};
