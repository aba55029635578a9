use crate::lifecycle::transition_pair;
use crate::settings::EngineSettings;
use crate::{validate, CoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wharf_events::{AppCommand, EventDispatcher, SystemEvent};
use wharf_schema::{validate_form, AppForm, AppId, AppInfo, AppUrn, Catalog};
use wharf_store::{AppRecord, AppStatus, AppStore, StoreLayout};

/// Central command engine for the app lifecycle.
///
/// One method per operation: each validates synchronously, persists the
/// pending status, hands execution to the dispatcher, and finalizes (or
/// rolls back) the persisted status from the outcome. Dispatch and
/// worker failures are absorbed into a status rollback plus a logged
/// message; only validation and not-found errors propagate to the
/// caller.
pub struct AppEngine {
    store: AppStore,
    dispatcher: EventDispatcher,
    catalog: Arc<dyn Catalog>,
    settings: EngineSettings,
}

impl AppEngine {
    pub fn new(
        layout: &StoreLayout,
        dispatcher: EventDispatcher,
        catalog: Arc<dyn Catalog>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store: AppStore::new(layout.clone()),
            dispatcher,
            catalog,
            settings,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Install an app from the catalog.
    ///
    /// Installing an app that already has a record of any status is
    /// equivalent to starting it; a record is never created twice.
    pub fn install(
        &self,
        app_name: &str,
        store_id: &str,
        form: &AppForm,
    ) -> Result<(), CoreError> {
        let urn = AppUrn::new(app_name, store_id);
        let app_id = urn.app_id();

        if self.store.get(&app_id)?.is_some() {
            info!("{app_id} is already installed, starting it instead");
            return self.start(&app_id);
        }

        if self.settings.demo_mode && self.store.list()?.len() >= self.settings.demo_app_limit {
            return Err(CoreError::DemoLimitReached(self.settings.demo_app_limit));
        }

        let info = self.require_catalog_entry(app_name)?;
        validate::validate_platform(&info, &self.settings)?;
        validate::validate_exposure(form, &info, &self.store, None)?;
        validate_form(&form.config, &info.form_fields)?;

        let now = chrono::Utc::now().to_rfc3339();
        let record = AppRecord {
            id: app_id.clone(),
            app_name: urn.app_name.clone(),
            store_id: urn.store_id.clone(),
            status: AppStatus::Installing,
            config: form.config.clone(),
            version: info.version,
            exposed: form.exposed,
            exposed_local: form.exposed_local,
            open_port: form.open_port,
            enable_auth: form.enable_auth,
            domain: form.domain.clone(),
            is_visible_on_guest_dashboard: form.is_visible_on_guest_dashboard,
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.create(&record)?;

        let event = SystemEvent::app(AppCommand::Install, app_id.as_str())
            .with_form(serde_json::to_value(form)?);
        let outcome = self
            .dispatcher
            .dispatch_event_async(&event, self.dispatcher.timeout_for(&event));

        if outcome.success {
            self.finalize_status(&app_id, AppStatus::Running);
        } else {
            // The install never happened: no record survives it.
            warn!("install of {app_id} failed, rolling back: {}", outcome.stdout);
            self.store.delete(&app_id)?;
        }
        Ok(())
    }

    pub fn start(&self, app_id: &AppId) -> Result<(), CoreError> {
        self.run_transition(app_id, AppCommand::Start)
    }

    pub fn stop(&self, app_id: &AppId) -> Result<(), CoreError> {
        self.run_transition(app_id, AppCommand::Stop)
    }

    pub fn restart(&self, app_id: &AppId) -> Result<(), CoreError> {
        self.run_transition(app_id, AppCommand::Restart)
    }

    pub fn reset(&self, app_id: &AppId) -> Result<(), CoreError> {
        self.run_transition(app_id, AppCommand::Reset)
    }

    /// Update an app to its current catalog revision.
    pub fn update(&self, app_id: &AppId, perform_backup: bool) -> Result<(), CoreError> {
        let record = self.require(app_id)?;
        let status_before = record.status;

        // An update may raise the catalog's minimum host version; this
        // must block before anything is mutated.
        let info = self.require_catalog_entry(&record.app_name)?;
        validate::validate_platform(&info, &self.settings)?;

        self.store.update_status(app_id, AppStatus::Updating)?;
        let event =
            SystemEvent::app(AppCommand::Update, app_id.as_str()).with_backup(perform_backup);
        let outcome = self
            .dispatcher
            .dispatch_event_async(&event, self.dispatcher.timeout_for(&event));

        if outcome.success {
            self.store.update(app_id, |r| r.version = info.version)?;
            if status_before == AppStatus::Running {
                self.start(app_id)?;
            } else {
                self.finalize_status(app_id, status_before);
            }
        } else {
            // Never leave the record in a transitional state.
            warn!("update of {app_id} failed: {}", outcome.stdout);
            self.finalize_status(app_id, AppStatus::Stopped);
        }
        Ok(())
    }

    /// Reconfigure an app without implying a container restart.
    ///
    /// On failure this propagates an error and the old config stays
    /// untouched; the new fields are only persisted once the worker has
    /// regenerated the artifacts successfully.
    pub fn update_config(&self, app_id: &AppId, form: &AppForm) -> Result<(), CoreError> {
        let record = self.require(app_id)?;
        let info = self.require_catalog_entry(&record.app_name)?;
        validate::validate_platform(&info, &self.settings)?;
        validate::validate_exposure(form, &info, &self.store, Some(app_id))?;
        validate_form(&form.config, &info.form_fields)?;

        let event = SystemEvent::app(AppCommand::GenerateEnv, app_id.as_str())
            .with_form(serde_json::to_value(form)?);
        let outcome = self
            .dispatcher
            .dispatch_event_async(&event, self.dispatcher.timeout_for(&event));

        if !outcome.success {
            return Err(CoreError::ConfigUpdateFailed(outcome.stdout));
        }
        self.store.update(app_id, |r| {
            r.config = form.config.clone();
            r.exposed = form.exposed;
            r.exposed_local = form.exposed_local;
            r.open_port = form.open_port;
            r.enable_auth = form.enable_auth;
            r.domain = form.domain.clone();
            r.is_visible_on_guest_dashboard = form.is_visible_on_guest_dashboard;
        })?;
        Ok(())
    }

    pub fn uninstall(&self, app_id: &AppId) -> Result<(), CoreError> {
        self.require(app_id)?;
        self.store.update_status(app_id, AppStatus::Uninstalling)?;

        let event = SystemEvent::app(AppCommand::Uninstall, app_id.as_str());
        let outcome = self
            .dispatcher
            .dispatch_event_async(&event, self.dispatcher.timeout_for(&event));

        if outcome.success {
            self.store.delete(app_id)?;
        } else {
            // Never silently delete on failure.
            warn!("uninstall of {app_id} failed: {}", outcome.stdout);
            self.finalize_status(app_id, AppStatus::Stopped);
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<AppRecord>, CoreError> {
        Ok(self.store.list()?)
    }

    pub fn inspect(&self, app_id: &AppId) -> Result<AppRecord, CoreError> {
        self.require(app_id)
    }

    fn run_transition(&self, app_id: &AppId, command: AppCommand) -> Result<(), CoreError> {
        let Some((pending, terminal)) = transition_pair(command) else {
            return Err(CoreError::InvalidTransition(command.to_string()));
        };
        let record = self.require(app_id)?;
        let previous = record.status;

        self.store.update_status(app_id, pending)?;
        let event = SystemEvent::app(command, app_id.as_str());
        let outcome = self
            .dispatcher
            .dispatch_event_async(&event, self.dispatcher.timeout_for(&event));

        if outcome.success {
            self.finalize_status(app_id, terminal);
        } else {
            warn!(
                "{command} of {app_id} failed, reverting to {previous}: {}",
                outcome.stdout
            );
            self.finalize_status(app_id, previous);
        }
        Ok(())
    }

    fn require(&self, app_id: &AppId) -> Result<AppRecord, CoreError> {
        self.store
            .get(app_id)?
            .ok_or_else(|| CoreError::AppNotFound(app_id.clone()))
    }

    fn require_catalog_entry(&self, app_name: &str) -> Result<AppInfo, CoreError> {
        self.catalog
            .app_info(app_name)?
            .ok_or_else(|| CoreError::CatalogEntryMissing(app_name.to_owned()))
    }

    /// Best-effort status finalization. A record deleted by a concurrent
    /// uninstall makes this a no-op rather than an error.
    fn finalize_status(&self, app_id: &AppId, status: AppStatus) {
        match self.store.update_status(app_id, status) {
            Ok(Some(_)) => {}
            Ok(None) => debug!("{app_id} vanished before finalization, skipping status update"),
            Err(e) => warn!("failed to finalize status of {app_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wharf_events::{DispatcherConfig, JobQueue};
    use wharf_schema::{parse_app_info_str, MemoryCatalog};

    struct Fixture {
        _dir: tempfile::TempDir,
        engine: AppEngine,
        queue: JobQueue,
        store: AppStore,
    }

    fn fixture_with(settings: EngineSettings) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();

        let catalog = Arc::new(MemoryCatalog::new());
        catalog.insert(
            parse_app_info_str(
                r#"{"id": "nginx", "name": "nginx", "version": 7, "port": 8080, "exposable": true}"#,
            )
            .unwrap(),
            r#"{"services": [{"name": "nginx", "image": "nginx:1.27", "isMain": true, "internalPort": 80}]}"#,
        );

        let config = DispatcherConfig {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(400),
            backup_timeout: Duration::from_millis(800),
        };
        let dispatcher = EventDispatcher::new(layout.jobs_dir(), config).unwrap();
        let queue = JobQueue::new(layout.jobs_dir());
        let store = AppStore::new(layout.clone());
        let engine = AppEngine::new(&layout, dispatcher, catalog, settings);

        Fixture {
            _dir: dir,
            engine,
            queue,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(EngineSettings::default())
    }

    /// Serve exactly `outcomes.len()` jobs with scripted results, in
    /// dispatch order.
    fn serve_jobs(queue: &JobQueue, outcomes: Vec<(bool, &'static str)>) -> std::thread::JoinHandle<()> {
        let queue = queue.clone();
        std::thread::spawn(move || {
            for (success, stdout) in outcomes {
                loop {
                    if let Some(record) = queue.claim_next().unwrap() {
                        queue.complete(record, success, stdout).unwrap();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        })
    }

    fn app_id() -> AppId {
        AppId::new("nginx-1")
    }

    #[test]
    fn install_persists_pending_status_then_running() {
        let f = fixture();

        // Capture the status the worker observes while the job runs.
        let observed = Arc::new(std::sync::Mutex::new(None));
        let observed_in_worker = Arc::clone(&observed);
        let queue = f.queue.clone();
        let store_layout = StoreLayout::new(f._dir.path());
        let worker = std::thread::spawn(move || {
            let store = AppStore::new(store_layout);
            loop {
                if let Some(record) = queue.claim_next().unwrap() {
                    let status = store
                        .get(&AppId::new(record.event.appid.clone()))
                        .unwrap()
                        .map(|r| r.status);
                    *observed_in_worker.lock().unwrap() = status;
                    queue.complete(record, true, "up").unwrap();
                    break;
                }
                std::thread::sleep(Duration::from_millis(2));
            }
        });

        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        worker.join().unwrap();

        assert_eq!(
            *observed.lock().unwrap(),
            Some(AppStatus::Installing),
            "worker must see the pending status"
        );
        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert_eq!(record.status, AppStatus::Running);
        assert_eq!(record.version, 7);
    }

    #[test]
    fn install_failure_rolls_back_to_no_record() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(false, "image pull failed")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        worker.join().unwrap();
        assert!(f.store.get(&app_id()).unwrap().is_none());
    }

    #[test]
    fn install_timeout_rolls_back_to_no_record() {
        let f = fixture();
        // No worker: the dispatch times out, which is a result rather
        // than a panic, and the rollback still runs.
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        assert!(f.store.get(&app_id()).unwrap().is_none());
    }

    #[test]
    fn install_on_existing_record_delegates_to_start() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (true, "up")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        worker.join().unwrap();

        // Still exactly one record, and the second job was a start.
        assert_eq!(f.store.list().unwrap().len(), 1);
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Running
        );
    }

    #[test]
    fn install_validation_failures_mutate_nothing() {
        let f = fixture();

        // Unknown catalog entry.
        assert!(matches!(
            f.engine
                .install("ghost", "1", &AppForm::default())
                .unwrap_err(),
            CoreError::CatalogEntryMissing(_)
        ));

        // Exposed without a domain.
        let form = AppForm {
            exposed: true,
            ..AppForm::default()
        };
        assert!(matches!(
            f.engine.install("nginx", "1", &form).unwrap_err(),
            CoreError::DomainRequired
        ));

        // Bad domain.
        let form = AppForm {
            exposed: true,
            domain: Some("not a domain".to_owned()),
            ..AppForm::default()
        };
        assert!(matches!(
            f.engine.install("nginx", "1", &form).unwrap_err(),
            CoreError::InvalidDomain(_)
        ));

        assert!(f.store.list().unwrap().is_empty());
    }

    #[test]
    fn demo_mode_caps_install_count() {
        let mut settings = EngineSettings::default();
        settings.demo_mode = true;
        settings.demo_app_limit = 1;
        let f = fixture_with(settings);

        let worker = serve_jobs(&f.queue, vec![(true, "up")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        worker.join().unwrap();

        assert!(matches!(
            f.engine
                .install("nginx", "2", &AppForm::default())
                .unwrap_err(),
            CoreError::DemoLimitReached(1)
        ));
    }

    #[test]
    fn domain_exclusivity_across_install_and_update_config() {
        let f = fixture();
        let worker = serve_jobs(
            &f.queue,
            vec![(true, "up"), (true, "up"), (true, "regenerated")],
        );

        let form_a = AppForm {
            exposed: true,
            domain: Some("a.example.com".to_owned()),
            ..AppForm::default()
        };
        f.engine.install("nginx", "1", &form_a).unwrap();

        let form_b = AppForm {
            exposed: true,
            domain: Some("b.example.com".to_owned()),
            ..AppForm::default()
        };
        f.engine.install("nginx", "2", &form_b).unwrap();

        // Stealing nginx-1's domain must fail.
        let stolen = AppForm {
            exposed: true,
            domain: Some("a.example.com".to_owned()),
            ..AppForm::default()
        };
        assert!(matches!(
            f.engine
                .update_config(&AppId::new("nginx-2"), &stolen)
                .unwrap_err(),
            CoreError::DomainInUse { .. }
        ));

        // Keeping its own domain is fine.
        f.engine
            .update_config(&AppId::new("nginx-2"), &form_b)
            .unwrap();
        worker.join().unwrap();

        let a = f.store.get(&AppId::new("nginx-1")).unwrap().unwrap();
        let b = f.store.get(&AppId::new("nginx-2")).unwrap().unwrap();
        assert_ne!(a.domain, b.domain);
    }

    #[test]
    fn lifecycle_transitions_set_terminal_statuses() {
        let f = fixture();
        let worker = serve_jobs(
            &f.queue,
            vec![(true, "up"), (true, "down"), (true, "up"), (true, "reset")],
        );
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();

        f.engine.stop(&app_id()).unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Stopped
        );

        f.engine.restart(&app_id()).unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Running
        );

        f.engine.reset(&app_id()).unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Stopped
        );
        worker.join().unwrap();
    }

    #[test]
    fn failed_transition_reverts_to_previous_status() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (false, "compose down failed")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();

        f.engine.stop(&app_id()).unwrap();
        worker.join().unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Running
        );
    }

    #[test]
    fn operations_on_missing_apps_are_not_found() {
        let f = fixture();
        let missing = AppId::new("ghost-1");
        assert!(matches!(
            f.engine.start(&missing).unwrap_err(),
            CoreError::AppNotFound(_)
        ));
        assert!(matches!(
            f.engine.stop(&missing).unwrap_err(),
            CoreError::AppNotFound(_)
        ));
        assert!(matches!(
            f.engine.update(&missing, false).unwrap_err(),
            CoreError::AppNotFound(_)
        ));
        assert!(matches!(
            f.engine.uninstall(&missing).unwrap_err(),
            CoreError::AppNotFound(_)
        ));
        assert!(matches!(
            f.engine.inspect(&missing).unwrap_err(),
            CoreError::AppNotFound(_)
        ));
    }

    #[test]
    fn update_refreshes_version_and_restores_running() {
        let f = fixture();
        // install, update, start (update restarts a running app).
        let worker = serve_jobs(
            &f.queue,
            vec![(true, "up"), (true, "updated"), (true, "up")],
        );
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        f.store.update(&app_id(), |r| r.version = 3).unwrap();

        f.engine.update(&app_id(), false).unwrap();
        worker.join().unwrap();

        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert_eq!(record.status, AppStatus::Running);
        assert_eq!(record.version, 7, "version must track the catalog");
    }

    #[test]
    fn update_of_stopped_app_restores_stopped() {
        let f = fixture();
        let worker = serve_jobs(
            &f.queue,
            vec![(true, "up"), (true, "down"), (true, "updated")],
        );
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        f.engine.stop(&app_id()).unwrap();

        f.engine.update(&app_id(), false).unwrap();
        worker.join().unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Stopped
        );
    }

    #[test]
    fn update_failure_forces_stopped() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (false, "update exploded")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();

        f.engine.update(&app_id(), false).unwrap();
        worker.join().unwrap();
        assert_eq!(
            f.store.get(&app_id()).unwrap().unwrap().status,
            AppStatus::Stopped,
            "a failed update must never leave a transitional status"
        );
    }

    #[test]
    fn update_blocks_on_raised_minimum_version() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        worker.join().unwrap();

        // The catalog raises its minimum beyond this host.
        let catalog = MemoryCatalog::new();
        catalog.insert(
            parse_app_info_str(
                r#"{"id": "nginx", "name": "nginx", "version": 8, "minWharfVersion": "99.0.0"}"#,
            )
            .unwrap(),
            r#"{"services": []}"#,
        );
        let engine = AppEngine::new(
            &StoreLayout::new(f._dir.path()),
            EventDispatcher::new(
                StoreLayout::new(f._dir.path()).jobs_dir(),
                *f.engine.dispatcher().config(),
            )
            .unwrap(),
            Arc::new(catalog),
            EngineSettings::default(),
        );

        assert!(matches!(
            engine.update(&app_id(), false).unwrap_err(),
            CoreError::VersionTooOld { .. }
        ));
        // Nothing was mutated.
        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert_eq!(record.status, AppStatus::Running);
        assert_eq!(record.version, 7);
    }

    #[test]
    fn update_config_persists_only_on_success() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (false, "generation failed")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();

        let mut config = std::collections::BTreeMap::new();
        config.insert("TZ".to_owned(), "Europe/Rome".to_owned());
        let form = AppForm {
            config,
            open_port: true,
            ..AppForm::default()
        };
        let err = f.engine.update_config(&app_id(), &form).unwrap_err();
        assert!(matches!(err, CoreError::ConfigUpdateFailed(_)));
        worker.join().unwrap();

        // Old config untouched.
        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert!(record.config.is_empty());
        assert!(!record.open_port);

        // And a successful pass persists everything atomically.
        let worker = serve_jobs(&f.queue, vec![(true, "regenerated")]);
        f.engine.update_config(&app_id(), &form).unwrap();
        worker.join().unwrap();
        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert_eq!(record.config.get("TZ").unwrap(), "Europe/Rome");
        assert!(record.open_port);
    }

    #[test]
    fn uninstall_deletes_record_on_success() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (true, "destroyed")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        f.engine.uninstall(&app_id()).unwrap();
        worker.join().unwrap();
        assert!(f.store.get(&app_id()).unwrap().is_none());
    }

    #[test]
    fn uninstall_failure_leaves_stopped_record() {
        let f = fixture();
        let worker = serve_jobs(&f.queue, vec![(true, "up"), (false, "still in use")]);
        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        f.engine.uninstall(&app_id()).unwrap();
        worker.join().unwrap();

        let record = f.store.get(&app_id()).unwrap().unwrap();
        assert_eq!(record.status, AppStatus::Stopped);
    }

    #[test]
    fn finalization_after_concurrent_delete_is_a_noop() {
        let f = fixture();
        // Serve the install normally; when the stop job arrives, delete
        // the record before reporting success, simulating a concurrent
        // uninstall landing first.
        let queue = f.queue.clone();
        let store = AppStore::new(StoreLayout::new(f._dir.path()));
        let worker = std::thread::spawn(move || {
            let mut served = 0;
            while served < 2 {
                if let Some(record) = queue.claim_next().unwrap() {
                    if record.event.command == AppCommand::Stop {
                        store
                            .delete(&AppId::new(record.event.appid.clone()))
                            .unwrap();
                    }
                    queue.complete(record, true, "ok").unwrap();
                    served += 1;
                } else {
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        });

        f.engine.install("nginx", "1", &AppForm::default()).unwrap();
        // Stop resolves successfully, but finalization finds no record;
        // the engine must neither error nor resurrect it.
        f.engine.stop(&app_id()).unwrap();
        worker.join().unwrap();
        assert!(f.store.get(&app_id()).unwrap().is_none());
    }

    #[test]
    fn schedule_and_clear_via_engine_dispatcher() {
        let f = fixture();
        f.engine
            .dispatcher()
            .schedule_event(
                SystemEvent::app(AppCommand::GenerateEnv, "nginx-1"),
                "0 4 * * *",
            )
            .unwrap();
        f.engine.dispatcher().clear().unwrap();
    }
}
