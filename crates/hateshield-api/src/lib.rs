//! HateShield API
//!
//! HTTP front end for the abusive-language classifier.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use app::{build_app, run_server};
pub use config::Settings;
pub use error::AppError;
pub use state::AppState;
