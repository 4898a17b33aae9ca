//! HTTP surface for pictovoz: board sessions, stateless rule suggestions,
//! a WebSocket snapshot stream and Prometheus metrics.

pub mod api;
pub mod metrics;
pub mod session;
pub mod state;
