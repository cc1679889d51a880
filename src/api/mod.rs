//! Web API module for the dashboard
//!
//! REST endpoints for auth, bot control and account data.

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;


pub use error::{ApiError, ErrorResponse};
pub use extract::AuthUser;
pub use server::{create_app, AppState};
