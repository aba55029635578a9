use super::{spin_fail, spin_ok, spinner, FormArgs, EXIT_SUCCESS};
use wharf_core::AppEngine;
use wharf_schema::AppId;

pub fn run(engine: &AppEngine, app_id: &str, form_args: &FormArgs) -> Result<u8, String> {
    let form = form_args.to_app_form()?;
    let id = AppId::new(app_id);
    let pb = spinner(&format!("reconfiguring {id}..."));

    match engine.update_config(&id, &form) {
        Ok(()) => {
            spin_ok(&pb, &format!("{id} reconfigured"));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            // The old config is untouched on any failure.
            spin_fail(&pb, &format!("reconfiguration of {id} failed"));
            Err(e.to_string())
        }
    }
}
