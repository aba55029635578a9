//! Plain lifecycle transitions sharing one spinner-and-verify shape.

use super::{spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_SUCCESS};
use wharf_core::{AppEngine, CoreError};
use wharf_schema::AppId;
use wharf_store::AppStatus;

fn run_op(
    engine: &AppEngine,
    app_id: &str,
    verb: &str,
    op: fn(&AppEngine, &AppId) -> Result<(), CoreError>,
    expected: AppStatus,
) -> Result<u8, String> {
    let id = AppId::new(app_id);
    let pb = spinner(&format!("{verb} {id}..."));
    if let Err(e) = op(engine, &id) {
        spin_fail(&pb, &format!("{verb} {id} failed"));
        return Err(e.to_string());
    }

    match engine.store().get(&id).map_err(|e| e.to_string())? {
        Some(record) if record.status == expected => {
            spin_ok(&pb, &format!("{id} is {}", record.status));
            Ok(EXIT_SUCCESS)
        }
        Some(record) => {
            // The dispatch failed and the engine rolled the status back.
            spin_fail(&pb, &format!("{id} is {}", record.status));
            Ok(EXIT_FAILURE)
        }
        None => {
            spin_fail(&pb, &format!("{id} is missing"));
            Ok(EXIT_FAILURE)
        }
    }
}

pub fn start(engine: &AppEngine, app_id: &str) -> Result<u8, String> {
    run_op(engine, app_id, "starting", AppEngine::start, AppStatus::Running)
}

pub fn stop(engine: &AppEngine, app_id: &str) -> Result<u8, String> {
    run_op(engine, app_id, "stopping", AppEngine::stop, AppStatus::Stopped)
}

pub fn restart(engine: &AppEngine, app_id: &str) -> Result<u8, String> {
    run_op(
        engine,
        app_id,
        "restarting",
        AppEngine::restart,
        AppStatus::Running,
    )
}

pub fn reset(engine: &AppEngine, app_id: &str) -> Result<u8, String> {
    run_op(engine, app_id, "resetting", AppEngine::reset, AppStatus::Stopped)
}
