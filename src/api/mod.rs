//! HTTP surface of the clinic.
//!
//! Pages and JSON endpoints for every dashboard, behind a middleware stack:
//! Rate Limit → Session → Audit → Auth/Role guard → Handler.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{build_router, clinic_router};
pub use server::{start_server_on, ClinicServer, ServerError, ServerSession};
pub use types::ApiContext;
