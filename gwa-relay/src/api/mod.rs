//! HTTP API handlers for gwa-relay

pub mod health;
pub mod session;
pub mod workflow;

pub use health::health_routes;
pub use session::session_routes;
pub use workflow::workflow_routes;
