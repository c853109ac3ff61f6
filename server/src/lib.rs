//! # Recap Server
//!
//! HTTP front end for the report pipeline.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and version
//! - `GET /api/members` - Active technicians
//! - `GET /api/providers` - Generation providers whose credentials are set
//! - `POST /api/generate` - Run the pipeline for one technician and date range
//! - `GET /metrics` - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{RecapServer, run_from_env};
pub use state::AppState;
