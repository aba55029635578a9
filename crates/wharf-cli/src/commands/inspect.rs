use super::{colorize_status, json_pretty, EXIT_SUCCESS};
use wharf_core::AppEngine;
use wharf_schema::AppId;

pub fn run(engine: &AppEngine, app_id: &str, json: bool) -> Result<u8, String> {
    let record = engine
        .inspect(&AppId::new(app_id))
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&record)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("id:        {}", record.id);
    println!("status:    {}", colorize_status(&record.status.to_string()));
    println!("version:   {}", record.version);
    println!("exposed:   {}", record.exposed);
    println!("local:     {}", record.exposed_local);
    println!("open port: {}", record.open_port);
    if let Some(domain) = &record.domain {
        println!("domain:    {domain}");
    }
    println!("created:   {}", record.created_at);
    println!("updated:   {}", record.updated_at);
    if !record.config.is_empty() {
        println!("config:");
        for (key, value) in &record.config {
            println!("  {key}={value}");
        }
    }
    Ok(EXIT_SUCCESS)
}
