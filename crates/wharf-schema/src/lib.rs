//! Catalog schema, identifier types, and input validation for Wharf.
//!
//! This crate defines the read-only side of the system: catalog entry
//! parsing (`AppInfo`, form fields, the `Catalog` trait with filesystem
//! and in-memory implementations), identifier newtypes (`AppId`,
//! `StoreId`, `JobId`, `AppUrn`), FQDN validation, host architecture
//! detection, and semver gating of catalog entries against the host.

pub mod arch;
pub mod catalog;
pub mod domain;
pub mod form;
pub mod types;
pub mod version;

pub use arch::{host_architecture, AppArchitecture};
pub use catalog::{
    parse_app_info_file, parse_app_info_str, AppInfo, Catalog, CatalogError, FieldType, FormField,
    FsCatalog, MemoryCatalog,
};
pub use domain::is_valid_fqdn;
pub use form::{validate_form, AppForm, FormError};
pub use types::{AppId, AppUrn, JobId, StoreId};
pub use version::{satisfies_minimum, VersionError};
