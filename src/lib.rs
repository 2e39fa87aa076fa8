//! Black-box verification of the campaign scheduling service.
//!
//! Requests are built and validated locally (`campaign::request`), sent
//! through `client::ApiClient`, and their envelopes asserted by the scenarios
//! in `scenario::catalog`. Persisted state is read back from MongoDB through
//! `database::ScopedConnection`.

pub mod campaign;
pub mod client;
pub mod collaborator;
pub mod config;
pub mod database;
pub mod envelope;
pub mod error;
pub mod scenario;
pub mod typedid;
pub mod violations;

pub use error::Error;
