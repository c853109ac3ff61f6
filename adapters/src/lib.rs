//! # Adapters
//!
//! Record source adapters for upstream helpdesk systems.

pub mod connectwise;

pub use connectwise::{ConnectWiseClient, render_conditions};
