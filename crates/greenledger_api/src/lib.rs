//! HTTP request handlers for the Green Ledger carbon tracker.
//!
//! # Responsibility
//! - Expose entry use-cases under `/api/carbon-entries` via axum.
//! - Map core errors to HTTP status codes and JSON error bodies.
//!
//! # Invariants
//! - Handlers never touch SQL; every call goes through `EntryService`.
//! - Cross-origin requests are allowed from any origin.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use server::serve;
pub use state::AppState;
