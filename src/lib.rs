//! Risk register service: scores risks by probability and impact, derives a
//! severity tier with recommendations, and serves the register over HTTP.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{RegisterError, Result};
pub use routes::create_router;
pub use services::AppState;
