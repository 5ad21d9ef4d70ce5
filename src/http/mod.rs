//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (assign / propagate request ID)
//!     → proxy handler forwards to the upstream
//!     → rewrite layer rewrites the upstream's response headers
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};
