//! Generation of the per-app env file consumed by the compose document.

use crate::RuntimeError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use wharf_schema::AppUrn;

/// Built-in variables always present alongside the user's config.
#[derive(Debug, Clone)]
pub struct EnvContext<'a> {
    pub urn: &'a AppUrn,
    pub data_dir: &'a Path,
    pub domain: Option<&'a str>,
    pub app_port: Option<u16>,
}

/// Render `KEY=value` lines: built-ins first, then the user's config in
/// key order. Pure; writing is a separate step.
pub fn render_env(ctx: &EnvContext<'_>, config: &BTreeMap<String, String>) -> String {
    let app_id = ctx.urn.app_id();
    let mut lines = Vec::new();
    lines.push(format!("APP_DATA_DIR={}", ctx.data_dir.display()));
    if let Some(domain) = ctx.domain {
        lines.push(format!("APP_DOMAIN={domain}"));
    }
    lines.push(format!("APP_HOST={app_id}"));
    lines.push(format!("APP_ID={app_id}"));
    if let Some(port) = ctx.app_port {
        lines.push(format!("APP_PORT={port}"));
    }
    for (key, value) in config {
        lines.push(format!("{key}={value}"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Atomically overwrite a generated artifact (env file or compose
/// document); partial writes must never be observable.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), RuntimeError> {
    let dir = path
        .parent()
        .ok_or_else(|| RuntimeError::Io(std::io::Error::other("artifact path has no parent")))?;
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| RuntimeError::Io(e.error))?;
    Ok(())
}
