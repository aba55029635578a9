//! App lifecycle command engine for Wharf.
//!
//! This crate ties the schema, store, and dispatch layers together into
//! the `AppEngine`: one method per lifecycle operation, each validating
//! synchronously, persisting intent, delegating execution through the
//! event dispatcher, and finalizing or rolling back the persisted status
//! from the outcome.

pub mod engine;
pub mod lifecycle;
pub mod settings;
pub mod validate;

pub use engine::AppEngine;
pub use lifecycle::transition_pair;
pub use settings::{load_settings_file, parse_settings_str, EngineSettings};
pub use validate::{validate_exposure, validate_platform};

use thiserror::Error;
use wharf_schema::{AppArchitecture, AppId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("app not found: {0}")]
    AppNotFound(AppId),
    #[error("app '{0}' is not in the catalog")]
    CatalogEntryMissing(String),
    #[error("an exposed app requires a domain")]
    DomainRequired,
    #[error("'{0}' is not a valid fully qualified domain name")]
    InvalidDomain(String),
    #[error("app '{0}' cannot be exposed")]
    NotExposable(String),
    #[error("app '{0}' must be exposed")]
    ExposureRequired(String),
    #[error("domain '{domain}' is already used by app '{app_id}'")]
    DomainInUse { domain: String, app_id: AppId },
    #[error("architecture '{0}' is not supported by this app")]
    UnsupportedArchitecture(AppArchitecture),
    #[error("could not determine a supported host architecture")]
    UnknownArchitecture,
    #[error("app requires wharf {required} or newer, host is {current}")]
    VersionTooOld { required: String, current: String },
    #[error("demo mode allows at most {0} installed apps")]
    DemoLimitReached(usize),
    #[error("command '{0}' is not a plain lifecycle transition")]
    InvalidTransition(String),
    #[error("config update failed: {0}")]
    ConfigUpdateFailed(String),
    #[error("form error: {0}")]
    Form(#[from] wharf_schema::FormError),
    #[error("version error: {0}")]
    Version(#[from] wharf_schema::VersionError),
    #[error("store error: {0}")]
    Store(#[from] wharf_store::StoreError),
    #[error("event error: {0}")]
    Event(#[from] wharf_events::EventError),
    #[error("catalog error: {0}")]
    Catalog(#[from] wharf_schema::CatalogError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
