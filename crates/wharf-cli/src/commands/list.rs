use super::{colorize_status, json_pretty, EXIT_SUCCESS};
use wharf_core::AppEngine;

pub fn run(engine: &AppEngine, json: bool) -> Result<u8, String> {
    let apps = engine.list().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&apps)?);
    } else if apps.is_empty() {
        println!("no apps installed");
    } else {
        println!("{:<24} {:<9} {:<14} DOMAIN", "APP_ID", "VERSION", "STATUS");
        for app in &apps {
            let status = colorize_status(&app.status.to_string());
            let domain = app.domain.as_deref().unwrap_or("");
            println!("{:<24} {:<9} {:<14} {domain}", app.id, app.version, status);
        }
    }
    Ok(EXIT_SUCCESS)
}
