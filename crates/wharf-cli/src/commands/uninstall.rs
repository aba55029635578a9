use super::{spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_SUCCESS};
use wharf_core::AppEngine;
use wharf_schema::AppId;

pub fn run(engine: &AppEngine, app_id: &str) -> Result<u8, String> {
    let id = AppId::new(app_id);
    let pb = spinner(&format!("uninstalling {id}..."));

    if let Err(e) = engine.uninstall(&id) {
        spin_fail(&pb, &format!("uninstall of {id} failed"));
        return Err(e.to_string());
    }

    match engine.store().get(&id).map_err(|e| e.to_string())? {
        None => {
            spin_ok(&pb, &format!("{id} uninstalled"));
            Ok(EXIT_SUCCESS)
        }
        Some(record) => {
            spin_fail(
                &pb,
                &format!("uninstall of {id} failed, app left {}", record.status),
            );
            Ok(EXIT_FAILURE)
        }
    }
}
