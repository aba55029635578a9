//! The out-of-process executor: claims one job at a time, regenerates the
//! app's artifacts through the generation engine, and drives the
//! container runtime.
//!
//! The single execution slot is the backpressure mechanism: the next job
//! is only claimed after the current one's terminal status has been
//! published, so container-mutating operations never stampede and no two
//! jobs for the same app run concurrently.

use crate::backend::ComposeRuntime;
use crate::env::{render_env, write_artifact, EnvContext};
use crate::RuntimeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wharf_compose::{generate, merge_architecture_overrides, parse_compose_spec_str, ExposureForm};
use wharf_events::{AppCommand, JobQueue, SystemEvent};
use wharf_schema::{AppArchitecture, AppForm, AppId, AppUrn, Catalog};
use wharf_store::{AppRecord, AppStore, StoreLayout};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub local_domain: String,
    pub architecture: AppArchitecture,
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            local_domain: "wharf.lan".to_owned(),
            architecture: wharf_schema::host_architecture().unwrap_or(AppArchitecture::Amd64),
            poll_interval: Duration::from_millis(500),
        }
    }
}

pub struct Worker {
    queue: JobQueue,
    store: AppStore,
    layout: StoreLayout,
    catalog: Arc<dyn Catalog>,
    backend: Arc<dyn ComposeRuntime>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        layout: StoreLayout,
        catalog: Arc<dyn Catalog>,
        backend: Arc<dyn ComposeRuntime>,
        config: WorkerConfig,
    ) -> Self {
        let queue = JobQueue::new(layout.jobs_dir());
        let store = AppStore::new(layout.clone());
        Self {
            queue,
            store,
            layout,
            catalog,
            backend,
            config,
        }
    }

    /// Claim and execute at most one job. Returns whether one was served.
    ///
    /// Job-level failures are reported through the job's terminal status,
    /// not as an `Err`; only queue access itself can fail here.
    pub fn run_once(&self) -> Result<bool, RuntimeError> {
        let Some(record) = self.queue.claim_next()? else {
            return Ok(false);
        };
        info!(
            "executing job {} ({} {})",
            record.id, record.event.command, record.event.appid
        );

        match self.execute(&record.event) {
            Ok(output) => self.queue.complete(record, true, output)?,
            Err(e) => {
                warn!("job failed: {e}");
                self.queue.complete(record, false, e.to_string())?;
            }
        }
        Ok(true)
    }

    /// Serve jobs until the shutdown flag is raised.
    pub fn run(&self, shutdown: &AtomicBool) {
        info!("worker started ({} backend)", self.backend.name());
        while !shutdown.load(Ordering::SeqCst) {
            match self.run_once() {
                Ok(true) => {}
                Ok(false) => std::thread::sleep(self.config.poll_interval),
                Err(e) => {
                    warn!("queue error: {e}");
                    std::thread::sleep(self.config.poll_interval);
                }
            }
        }
        info!("worker stopped");
    }

    fn execute(&self, event: &SystemEvent) -> Result<String, RuntimeError> {
        let app_id = AppId::new(event.appid.clone());
        let project = app_id.to_string();
        let compose_file = self.layout.compose_path(&app_id);

        match event.command {
            AppCommand::Install | AppCommand::Start => {
                self.regenerate(&app_id, event)?;
                Ok(self.backend.up(&project, &compose_file)?.stdout)
            }
            AppCommand::Stop => {
                self.ensure_artifacts(&app_id, event)?;
                Ok(self.backend.down(&project, &compose_file)?.stdout)
            }
            AppCommand::Restart => {
                self.regenerate(&app_id, event)?;
                Ok(self.backend.restart(&project, &compose_file)?.stdout)
            }
            AppCommand::Update => {
                if event.perform_backup == Some(true) {
                    // File-copy mechanics belong to the backup collaborator;
                    // the flag only widens the operation budget here.
                    debug!("backup requested before updating {app_id}");
                }
                self.ensure_artifacts(&app_id, event)?;
                let down = self.backend.down(&project, &compose_file)?;
                self.regenerate(&app_id, event)?;
                Ok(down.stdout)
            }
            AppCommand::Uninstall => {
                self.ensure_artifacts(&app_id, event)?;
                let output = self.backend.destroy(&project, &compose_file)?;
                self.remove_app_data(&app_id)?;
                Ok(output.stdout)
            }
            AppCommand::Reset => {
                self.ensure_artifacts(&app_id, event)?;
                let output = self.backend.destroy(&project, &compose_file)?;
                self.remove_app_data(&app_id)?;
                self.regenerate(&app_id, event)?;
                Ok(output.stdout)
            }
            AppCommand::GenerateEnv => {
                self.regenerate(&app_id, event)?;
                Ok(format!("regenerated artifacts for {app_id}"))
            }
        }
    }

    /// Rebuild the compose document and env file from catalog + record,
    /// preferring the event's form payload over persisted config so that
    /// not-yet-committed reconfigurations take effect.
    fn regenerate(&self, app_id: &AppId, event: &SystemEvent) -> Result<(), RuntimeError> {
        let record = self
            .store
            .get(app_id)?
            .ok_or_else(|| RuntimeError::AppMissing(app_id.to_string()))?;
        let urn = AppUrn::new(record.app_name.clone(), record.store_id.clone());

        let info = self
            .catalog
            .app_info(&record.app_name)?
            .ok_or_else(|| RuntimeError::CatalogEntryMissing(record.app_name.clone()))?;
        let spec_text = self
            .catalog
            .compose_spec(&record.app_name)?
            .ok_or_else(|| RuntimeError::CatalogEntryMissing(record.app_name.clone()))?;
        let spec = parse_compose_spec_str(&spec_text)?;
        let services =
            merge_architecture_overrides(&spec.services, &spec.overrides, self.config.architecture)?;

        let form_override: Option<AppForm> = if event.form.is_null() {
            None
        } else {
            Some(serde_json::from_value(event.form.clone())?)
        };
        let (config, exposure) = match form_override {
            Some(form) => {
                let exposure = ExposureForm {
                    exposed: form.exposed,
                    exposed_local: form.exposed_local,
                    open_port: form.open_port,
                    enable_auth: form.enable_auth,
                    domain: form.domain.clone(),
                    local_domain: self.config.local_domain.clone(),
                    app_port: info.port,
                    is_visible_on_guest_dashboard: form.is_visible_on_guest_dashboard,
                };
                (form.config, exposure)
            }
            None => exposure_from_record(&record, &self.config.local_domain, info.port),
        };

        let subnet = derive_subnet(app_id);
        let compose_text = generate(&services, &exposure, &urn, &subnet)?;
        write_artifact(&self.layout.compose_path(app_id), &compose_text)?;

        let data_dir = self.layout.app_data_dir(app_id);
        let env_text = render_env(
            &EnvContext {
                urn: &urn,
                data_dir: &data_dir,
                domain: exposure.domain.as_deref(),
                app_port: info.port,
            },
            &config,
        );
        write_artifact(&self.layout.env_path(app_id), &env_text)?;
        debug!("regenerated artifacts for {app_id} in {subnet}");
        Ok(())
    }

    /// Regenerate only when the compose document is absent, so teardown
    /// of an app whose catalog entry has vanished still works.
    fn ensure_artifacts(&self, app_id: &AppId, event: &SystemEvent) -> Result<(), RuntimeError> {
        if self.layout.compose_path(app_id).exists() {
            return Ok(());
        }
        self.regenerate(app_id, event)
    }

    fn remove_app_data(&self, app_id: &AppId) -> Result<(), RuntimeError> {
        let dir = self.layout.app_data_dir(app_id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

fn exposure_from_record(
    record: &AppRecord,
    local_domain: &str,
    app_port: Option<u16>,
) -> (std::collections::BTreeMap<String, String>, ExposureForm) {
    let exposure = ExposureForm {
        exposed: record.exposed,
        exposed_local: record.exposed_local,
        open_port: record.open_port,
        enable_auth: record.enable_auth,
        domain: record.domain.clone(),
        local_domain: local_domain.to_owned(),
        app_port,
        is_visible_on_guest_dashboard: record.is_visible_on_guest_dashboard,
    };
    (record.config.clone(), exposure)
}

/// Stable per-app subnet inside 10.128.0.0/16, derived from the app id
/// so regeneration never reshuffles addressing between apps.
pub fn derive_subnet(app_id: &AppId) -> String {
    let hash = blake3::hash(app_id.as_bytes());
    let octet = u16::from(hash.as_bytes()[0]) % 254 + 1;
    format!("10.128.{octet}.0/24")
}
