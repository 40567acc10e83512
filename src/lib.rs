//! Round-robin HTTP load balancer with active health probing.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::LbConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
