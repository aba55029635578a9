use super::EXIT_SUCCESS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wharf_core::EngineSettings;
use wharf_runtime::{select_backend, ComposeRuntime, Worker, WorkerConfig};
use wharf_schema::Catalog;
use wharf_store::{StoreLayout, StoreLock};

pub fn run(
    layout: &StoreLayout,
    catalog: Arc<dyn Catalog>,
    backend_name: &str,
    settings: &EngineSettings,
) -> Result<u8, String> {
    let backend: Arc<dyn ComposeRuntime> =
        Arc::from(select_backend(backend_name).map_err(|e| e.to_string())?);
    if !backend.available() {
        return Err(format!(
            "backend '{}' is not available on this system",
            backend.name()
        ));
    }

    // One worker per store: the lock is the execution slot.
    let _lock = StoreLock::try_acquire(layout)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "another worker already serves this store".to_owned())?;

    let architecture = settings
        .effective_architecture()
        .ok_or_else(|| "could not determine a supported host architecture".to_owned())?;
    let worker = Worker::new(
        layout.clone(),
        catalog,
        backend,
        WorkerConfig {
            local_domain: settings.local_domain.clone(),
            architecture,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        },
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        if flag.load(Ordering::SeqCst) {
            std::process::exit(1);
        }
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nshutdown requested, finishing current job...");
    })
    .map_err(|e| e.to_string())?;

    worker.run(&shutdown);
    Ok(EXIT_SUCCESS)
}
