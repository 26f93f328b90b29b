//! REST backend subsystem.
//!
//! # Data Flow
//! ```text
//! domain tool (path, query | body, auth?)
//!     → url.rs (join onto {api_base}/api/app, encode query)
//!     → auth (bearer token when requested)
//!     → client.rs (timeout + retry loop from resilience)
//!     → envelope unwrap: data | business error
//! ```

pub mod client;
pub mod types;
pub mod url;

pub use client::ApiClient;
pub use types::{ApiError, ApiResult, RequestOptions, SUCCESS_CODE};
