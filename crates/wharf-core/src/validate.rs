//! Synchronous pre-dispatch validation. Nothing here mutates state; a
//! violation surfaces as a typed error before any record is written.

use crate::settings::EngineSettings;
use crate::CoreError;
use wharf_schema::{is_valid_fqdn, satisfies_minimum, AppForm, AppId, AppInfo};
use wharf_store::AppStore;

/// Exposure and domain rules, shared by install and reconfiguration.
///
/// `exclude` names the app being reconfigured so it may keep its own
/// domain.
pub fn validate_exposure(
    form: &AppForm,
    info: &AppInfo,
    store: &AppStore,
    exclude: Option<&AppId>,
) -> Result<(), CoreError> {
    if info.force_expose && !form.exposed {
        return Err(CoreError::ExposureRequired(info.id.clone()));
    }
    if !form.exposed {
        return Ok(());
    }

    let domain = form
        .domain
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(CoreError::DomainRequired)?;
    if !is_valid_fqdn(domain) {
        return Err(CoreError::InvalidDomain(domain.to_owned()));
    }
    if !info.exposable {
        return Err(CoreError::NotExposable(info.id.clone()));
    }
    for app in store.get_by_domain(domain)? {
        if exclude != Some(&app.id) {
            return Err(CoreError::DomainInUse {
                domain: domain.to_owned(),
                app_id: app.id,
            });
        }
    }
    Ok(())
}

/// Host compatibility: architecture support and the catalog entry's
/// minimum Wharf version.
pub fn validate_platform(info: &AppInfo, settings: &EngineSettings) -> Result<(), CoreError> {
    if let Some(supported) = &info.supported_architectures {
        let architecture = settings
            .effective_architecture()
            .ok_or(CoreError::UnknownArchitecture)?;
        if !supported.contains(&architecture) {
            return Err(CoreError::UnsupportedArchitecture(architecture));
        }
    }

    if let Some(minimum) = &info.min_wharf_version {
        if !satisfies_minimum(&settings.wharf_version, minimum)? {
            return Err(CoreError::VersionTooOld {
                required: minimum.clone(),
                current: settings.wharf_version.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wharf_schema::{parse_app_info_str, AppArchitecture, StoreId};
    use wharf_store::{AppRecord, AppStatus, StoreLayout};

    fn store() -> (tempfile::TempDir, AppStore) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        (dir, AppStore::new(layout))
    }

    fn exposable_info() -> AppInfo {
        parse_app_info_str(r#"{"id": "blog", "name": "Blog", "exposable": true}"#).unwrap()
    }

    fn exposed_form(domain: &str) -> AppForm {
        AppForm {
            exposed: true,
            domain: Some(domain.to_owned()),
            ..AppForm::default()
        }
    }

    fn record_with_domain(id: &str, domain: &str) -> AppRecord {
        AppRecord {
            id: AppId::new(id),
            app_name: id.split('-').next().unwrap_or(id).to_owned(),
            store_id: StoreId::new("1"),
            status: AppStatus::Running,
            config: std::collections::BTreeMap::new(),
            version: 1,
            exposed: true,
            exposed_local: false,
            open_port: false,
            enable_auth: false,
            domain: Some(domain.to_owned()),
            is_visible_on_guest_dashboard: false,
            created_at: "2025-01-01T00:00:00Z".to_owned(),
            updated_at: "2025-01-01T00:00:00Z".to_owned(),
        }
    }

    #[test]
    fn unexposed_form_passes_without_domain() {
        let (_dir, store) = store();
        validate_exposure(&AppForm::default(), &exposable_info(), &store, None).unwrap();
    }

    #[test]
    fn exposed_requires_domain() {
        let (_dir, store) = store();
        let form = AppForm {
            exposed: true,
            ..AppForm::default()
        };
        assert!(matches!(
            validate_exposure(&form, &exposable_info(), &store, None).unwrap_err(),
            CoreError::DomainRequired
        ));
    }

    #[test]
    fn exposed_requires_valid_fqdn() {
        let (_dir, store) = store();
        assert!(matches!(
            validate_exposure(&exposed_form("not a domain"), &exposable_info(), &store, None)
                .unwrap_err(),
            CoreError::InvalidDomain(_)
        ));
    }

    #[test]
    fn exposed_requires_exposable_entry() {
        let (_dir, store) = store();
        let info = parse_app_info_str(r#"{"id": "db", "name": "DB"}"#).unwrap();
        assert!(matches!(
            validate_exposure(&exposed_form("db.example.com"), &info, &store, None).unwrap_err(),
            CoreError::NotExposable(_)
        ));
    }

    #[test]
    fn force_expose_requires_exposed() {
        let (_dir, store) = store();
        let info =
            parse_app_info_str(r#"{"id": "vpn", "name": "VPN", "forceExpose": true, "exposable": true}"#)
                .unwrap();
        assert!(matches!(
            validate_exposure(&AppForm::default(), &info, &store, None).unwrap_err(),
            CoreError::ExposureRequired(_)
        ));
        validate_exposure(&exposed_form("vpn.example.com"), &info, &store, None).unwrap();
    }

    #[test]
    fn domain_collision_is_rejected() {
        let (_dir, store) = store();
        store
            .create(&record_with_domain("blog-1", "blog.example.com"))
            .unwrap();
        assert!(matches!(
            validate_exposure(
                &exposed_form("blog.example.com"),
                &exposable_info(),
                &store,
                None
            )
            .unwrap_err(),
            CoreError::DomainInUse { .. }
        ));
    }

    #[test]
    fn reconfigured_app_may_keep_its_own_domain() {
        let (_dir, store) = store();
        store
            .create(&record_with_domain("blog-1", "blog.example.com"))
            .unwrap();
        validate_exposure(
            &exposed_form("blog.example.com"),
            &exposable_info(),
            &store,
            Some(&AppId::new("blog-1")),
        )
        .unwrap();
    }

    #[test]
    fn unsupported_architecture_is_rejected() {
        let info = parse_app_info_str(
            r#"{"id": "x", "name": "X", "supportedArchitectures": ["arm64"]}"#,
        )
        .unwrap();
        let mut settings = EngineSettings::default();
        settings.architecture = Some(AppArchitecture::Amd64);
        assert!(matches!(
            validate_platform(&info, &settings).unwrap_err(),
            CoreError::UnsupportedArchitecture(AppArchitecture::Amd64)
        ));

        settings.architecture = Some(AppArchitecture::Arm64);
        validate_platform(&info, &settings).unwrap();
    }

    #[test]
    fn undeclared_architectures_mean_everything_is_supported() {
        let info = parse_app_info_str(r#"{"id": "x", "name": "X"}"#).unwrap();
        validate_platform(&info, &EngineSettings::default()).unwrap();
    }

    #[test]
    fn old_host_version_is_rejected() {
        let info = parse_app_info_str(
            r#"{"id": "x", "name": "X", "minWharfVersion": "99.0.0"}"#,
        )
        .unwrap();
        assert!(matches!(
            validate_platform(&info, &EngineSettings::default()).unwrap_err(),
            CoreError::VersionTooOld { .. }
        ));
    }

    #[test]
    fn satisfied_minimum_passes() {
        let info = parse_app_info_str(
            r#"{"id": "x", "name": "X", "minWharfVersion": "0.0.1"}"#,
        )
        .unwrap();
        let mut settings = EngineSettings::default();
        settings.wharf_version = "1.0.0".to_owned();
        validate_platform(&info, &settings).unwrap();
    }
}
