//! HTTP front end: an axum router over the query processor plus static
//! file serving and a remote-shutdown endpoint.

mod handlers;
mod router;
mod types;

pub use handlers::*;
pub use router::*;
pub use types::*;
