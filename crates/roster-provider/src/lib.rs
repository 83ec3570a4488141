//! Deterministic fault-injection provider.
//!
//! Serves the department employee resource and answers according to a
//! [`FaultTable`]: reserved department ids and emails produce not-found,
//! client-error or schema-violating responses so that clients and contract
//! tests can exercise every path.

pub mod error;
pub mod faults;
pub mod routes;
pub mod server;

pub use error::ProviderError;
pub use faults::{Behavior, FaultTable};
pub use routes::{router, ProviderState};
pub use server::{serve, serve_with_shutdown, ProviderHandle};
