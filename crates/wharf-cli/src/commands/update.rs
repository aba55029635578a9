use super::{spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_SUCCESS};
use wharf_core::AppEngine;
use wharf_schema::AppId;
use wharf_store::AppStatus;

pub fn run(engine: &AppEngine, app_id: &str, backup: bool) -> Result<u8, String> {
    let id = AppId::new(app_id);
    let msg = if backup {
        format!("updating {id} (with backup)...")
    } else {
        format!("updating {id}...")
    };
    let pb = spinner(&msg);

    if let Err(e) = engine.update(&id, backup) {
        spin_fail(&pb, &format!("update of {id} failed"));
        return Err(e.to_string());
    }

    match engine.store().get(&id).map_err(|e| e.to_string())? {
        Some(record) if record.status != AppStatus::Updating => {
            spin_ok(
                &pb,
                &format!("{id} is {} (version {})", record.status, record.version),
            );
            Ok(EXIT_SUCCESS)
        }
        Some(record) => {
            spin_fail(&pb, &format!("{id} is {}", record.status));
            Ok(EXIT_FAILURE)
        }
        None => {
            spin_fail(&pb, &format!("{id} is missing"));
            Ok(EXIT_FAILURE)
        }
    }
}
