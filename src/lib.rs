//! Front-desk client for the dental clinic management API: REST client,
//! per-feature stores, agenda and billing rules, and plain-text views.

pub mod agenda;
pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod stores;
pub mod views;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ValidationError};
pub use session::{Session, SessionStore};
