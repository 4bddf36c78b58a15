//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (assign / keep x-request-id)
//!     → middleware.rs (route-access gate: allow or redirect)
//!     → upstream.rs (forward allowed requests to the renderer)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
pub use upstream::Upstream;
