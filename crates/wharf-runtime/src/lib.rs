//! Execution layer for Wharf: container runtime backends and the job
//! worker.
//!
//! The worker claims jobs from the shared queue, regenerates each app's
//! compose document and env file through the generation engine, and
//! invokes the container runtime behind the pluggable `ComposeRuntime`
//! trait (a `docker compose` subprocess backend, plus an in-memory mock
//! used by every test that would otherwise need Docker).

pub mod backend;
pub mod docker;
pub mod env;
pub mod mock;
pub mod worker;

pub use backend::{select_backend, ComposeRuntime, RunOutput};
pub use docker::DockerComposeRuntime;
pub use env::{render_env, write_artifact, EnvContext};
pub use mock::{MockOp, MockRuntime};
pub use worker::{derive_subnet, Worker, WorkerConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend '{0}' is not available on this system")]
    BackendUnavailable(String),
    #[error("compose command failed: {0}")]
    CommandFailed(String),
    #[error("app record not found: {0}")]
    AppMissing(String),
    #[error("app '{0}' is not in the catalog")]
    CatalogEntryMissing(String),
    #[error("event error: {0}")]
    Event(#[from] wharf_events::EventError),
    #[error("store error: {0}")]
    Store(#[from] wharf_store::StoreError),
    #[error("catalog error: {0}")]
    Catalog(#[from] wharf_schema::CatalogError),
    #[error("compose generation error: {0}")]
    Compose(#[from] wharf_compose::ComposeError),
    #[error("invalid form payload: {0}")]
    Form(#[from] serde_json::Error),
}
