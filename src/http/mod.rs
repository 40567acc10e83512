//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → [routing layer picks backend]
//!     → forward.rs + headers.rs (rewrite, relay, strip hop-by-hop)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{HttpServer, StartupError};
