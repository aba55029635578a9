use crate::arch::AppArchitecture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog entry: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog entry: {0}")]
    ParseJson(#[from] serde_json::Error),
}

/// One form field an app's catalog entry asks the user to fill in.
///
/// The answer is persisted under `env_variable` in the app's config map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub env_variable: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: Option<u64>,
    #[serde(default)]
    pub max: Option<u64>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
    Email,
    Number,
    Url,
    Boolean,
    Random,
}

/// Read-only catalog definition of an installable app.
///
/// The catalog file format is owned by the catalog collaborator; unknown
/// fields are ignored rather than rejected, and everything but `id` and
/// `name` is optional with a sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    /// Catalog revision counter, persisted on the installed app.
    #[serde(default)]
    pub version: u32,
    /// Internal port of the main service, also the default host port
    /// binding when the app opens a port.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
    #[serde(default)]
    pub exposable: bool,
    #[serde(default)]
    pub force_expose: bool,
    #[serde(default)]
    pub dynamic_config: bool,
    /// Absent means every architecture is supported.
    #[serde(default)]
    pub supported_architectures: Option<Vec<AppArchitecture>>,
    /// Semver minimum of the Wharf host version, checked at install and
    /// re-checked before every update.
    #[serde(default)]
    pub min_wharf_version: Option<String>,
}

pub fn parse_app_info_str(input: &str) -> Result<AppInfo, CatalogError> {
    Ok(serde_json::from_str(input)?)
}

pub fn parse_app_info_file(path: impl AsRef<Path>) -> Result<AppInfo, CatalogError> {
    let content = fs::read_to_string(path)?;
    parse_app_info_str(&content)
}

/// Read-only access to app catalog entries.
///
/// `compose_spec` returns the raw dynamic-compose JSON text; parsing it
/// belongs to the generation engine, not the catalog.
pub trait Catalog: Send + Sync {
    fn app_info(&self, app_name: &str) -> Result<Option<AppInfo>, CatalogError>;

    fn compose_spec(&self, app_name: &str) -> Result<Option<String>, CatalogError>;
}

/// Catalog backed by a directory tree of `<app>/config.json` and
/// `<app>/docker-compose.json` files.
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, app_name: &str, file: &str) -> PathBuf {
        self.root.join(app_name).join(file)
    }
}

impl Catalog for FsCatalog {
    fn app_info(&self, app_name: &str) -> Result<Option<AppInfo>, CatalogError> {
        let path = self.entry_path(app_name, "config.json");
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(parse_app_info_file(&path)?))
    }

    fn compose_spec(&self, app_name: &str) -> Result<Option<String>, CatalogError> {
        let path = self.entry_path(app_name, "docker-compose.json");
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }
}

/// In-memory catalog for tests and embedded use.
#[derive(Default)]
pub struct MemoryCatalog {
    entries: Mutex<HashMap<String, (AppInfo, String)>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, info: AppInfo, compose_spec: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(info.id.clone(), (info, compose_spec.into()));
    }
}

impl Catalog for MemoryCatalog {
    fn app_info(&self, app_name: &str) -> Result<Option<AppInfo>, CatalogError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(app_name).map(|(info, _)| info.clone()))
    }

    fn compose_spec(&self, app_name: &str) -> Result<Option<String>, CatalogError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(app_name).map(|(_, spec)| spec.clone()))
    }
}
