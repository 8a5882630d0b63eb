pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod relay;
pub mod service;
pub mod sessions;
pub mod telemetry;
pub mod upload;

pub use config::{LogFormat, RelayTimeouts, ServiceConfig};
pub use relay::{RelayClient, RelayError, RelayResponse};
pub use service::{AppState, SharedRandom, build_router, create_app};
