use super::{spin_fail, spin_ok, spinner, FormArgs, EXIT_FAILURE, EXIT_SUCCESS};
use wharf_core::AppEngine;
use wharf_schema::AppUrn;

pub fn run(
    engine: &AppEngine,
    app_name: &str,
    store_id: &str,
    form_args: &FormArgs,
) -> Result<u8, String> {
    let form = form_args.to_app_form()?;
    let app_id = AppUrn::new(app_name, store_id).app_id();

    let pb = spinner(&format!("installing {app_id}..."));
    if let Err(e) = engine.install(app_name, store_id, &form) {
        spin_fail(&pb, &format!("install of {app_id} failed"));
        return Err(e.to_string());
    }

    // A failed install rolls back to no record at all.
    match engine.store().get(&app_id).map_err(|e| e.to_string())? {
        Some(record) => {
            spin_ok(&pb, &format!("{app_id} is {}", record.status));
            Ok(EXIT_SUCCESS)
        }
        None => {
            spin_fail(&pb, &format!("install of {app_id} failed and was rolled back"));
            Ok(EXIT_FAILURE)
        }
    }
}
