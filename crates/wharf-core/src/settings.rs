use crate::CoreError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use wharf_events::DispatcherConfig;
use wharf_schema::{host_architecture, AppArchitecture};

/// Host-level configuration, read from `wharf.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Version of the running host, compared against catalog minimums.
    pub wharf_version: String,
    /// Domain suffix for locally-exposed apps.
    pub local_domain: String,
    /// Overrides host architecture detection when set.
    pub architecture: Option<AppArchitecture>,
    pub demo_mode: bool,
    /// Install ceiling enforced when `demo_mode` is on.
    pub demo_app_limit: usize,
    pub poll_interval_ms: u64,
    pub operation_timeout_secs: u64,
    pub backup_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            wharf_version: env!("CARGO_PKG_VERSION").to_owned(),
            local_domain: "wharf.lan".to_owned(),
            architecture: None,
            demo_mode: false,
            demo_app_limit: 5,
            poll_interval_ms: 500,
            operation_timeout_secs: 5 * 60,
            backup_timeout_secs: 15 * 60,
        }
    }
}

impl EngineSettings {
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.operation_timeout_secs),
            backup_timeout: Duration::from_secs(self.backup_timeout_secs),
        }
    }

    /// Configured architecture override, falling back to detection.
    pub fn effective_architecture(&self) -> Option<AppArchitecture> {
        self.architecture.or_else(host_architecture)
    }
}

pub fn parse_settings_str(input: &str) -> Result<EngineSettings, CoreError> {
    Ok(toml::from_str(input)?)
}

/// Read settings from a file; a missing file means defaults.
pub fn load_settings_file(path: &Path) -> Result<EngineSettings, CoreError> {
    if !path.exists() {
        return Ok(EngineSettings::default());
    }
    let content = std::fs::read_to_string(path)?;
    parse_settings_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_settings() {
        let settings = parse_settings_str(
            r#"
wharf_version = "1.4.0"
local_domain = "home.arpa"
architecture = "arm64"
demo_mode = true
demo_app_limit = 2
poll_interval_ms = 100
operation_timeout_secs = 60
backup_timeout_secs = 120
"#,
        )
        .unwrap();
        assert_eq!(settings.wharf_version, "1.4.0");
        assert_eq!(settings.local_domain, "home.arpa");
        assert_eq!(settings.architecture, Some(AppArchitecture::Arm64));
        assert!(settings.demo_mode);
        assert_eq!(settings.demo_app_limit, 2);
        assert_eq!(
            settings.dispatcher_config().poll_interval,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = parse_settings_str("").unwrap();
        assert_eq!(settings.local_domain, "wharf.lan");
        assert!(!settings.demo_mode);
        assert_eq!(
            settings.dispatcher_config().timeout,
            Duration::from_secs(300)
        );
        assert_eq!(
            settings.dispatcher_config().backup_timeout,
            Duration::from_secs(900)
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(parse_settings_str("unknown_key = true").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_file(&dir.path().join("wharf.toml")).unwrap();
        assert_eq!(settings.local_domain, "wharf.lan");
    }

    #[test]
    fn architecture_override_wins_over_detection() {
        let mut settings = EngineSettings::default();
        settings.architecture = Some(AppArchitecture::Arm64);
        assert_eq!(
            settings.effective_architecture(),
            Some(AppArchitecture::Arm64)
        );
    }
}
