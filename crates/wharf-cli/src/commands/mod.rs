pub mod completions;
pub mod config;
pub mod inspect;
pub mod install;
pub mod lifecycle;
pub mod list;
pub mod uninstall;
pub mod update;
pub mod worker;

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;
use wharf_schema::AppForm;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status {
        "running" => Style::new().cyan().bold().apply_to(status).to_string(),
        "stopped" => Style::new().yellow().apply_to(status).to_string(),
        "installing" | "starting" | "stopping" | "updating" | "uninstalling" | "restarting"
        | "resetting" | "backing_up" | "restoring" => {
            Style::new().blue().apply_to(status).to_string()
        }
        "missing" => Style::new().dim().apply_to(status).to_string(),
        other => other.to_owned(),
    }
}

/// Shared exposure and form flags for `install` and `config`.
#[derive(Debug, clap::Args)]
pub struct FormArgs {
    /// Expose the app publicly behind the reverse proxy.
    #[arg(long, default_value_t = false)]
    pub exposed: bool,
    /// Public domain for the app; required with --exposed.
    #[arg(long)]
    pub domain: Option<String>,
    /// Expose the app on the local-network subdomain.
    #[arg(long, default_value_t = false)]
    pub local: bool,
    /// Publish the app's main port on the host.
    #[arg(long, default_value_t = false)]
    pub open_port: bool,
    /// Protect exposed routes with the shared forward-auth middleware.
    #[arg(long, default_value_t = false)]
    pub auth: bool,
    /// Show the app on the guest dashboard.
    #[arg(long, default_value_t = false)]
    pub guest: bool,
    /// Form answer as KEY=VALUE; repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,
}

impl FormArgs {
    pub fn to_app_form(&self) -> Result<AppForm, String> {
        let mut config = BTreeMap::new();
        for pair in &self.env {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("invalid --env '{pair}', expected KEY=VALUE"))?;
            if key.is_empty() {
                return Err(format!("invalid --env '{pair}', empty key"));
            }
            config.insert(key.to_owned(), value.to_owned());
        }
        Ok(AppForm {
            config,
            exposed: self.exposed,
            exposed_local: self.local,
            open_port: self.open_port,
            enable_auth: self.auth,
            domain: self.domain.clone(),
            is_visible_on_guest_dashboard: self.guest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> FormArgs {
        FormArgs {
            exposed: false,
            domain: None,
            local: false,
            open_port: false,
            auth: false,
            guest: false,
            env: Vec::new(),
        }
    }

    #[test]
    fn json_pretty_serializes_value() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
    }

    #[test]
    fn colorize_status_known_states() {
        assert!(colorize_status("running").contains("running"));
        assert!(colorize_status("stopped").contains("stopped"));
        assert!(colorize_status("updating").contains("updating"));
        assert_eq!(colorize_status("weird"), "weird");
    }

    #[test]
    fn form_args_parse_env_pairs() {
        let mut args = bare_args();
        args.env = vec!["TZ=UTC".to_owned(), "EMPTY=".to_owned()];
        let form = args.to_app_form().unwrap();
        assert_eq!(form.config.get("TZ").unwrap(), "UTC");
        assert_eq!(form.config.get("EMPTY").unwrap(), "");
    }

    #[test]
    fn form_args_reject_malformed_env() {
        let mut args = bare_args();
        args.env = vec!["NO_SEPARATOR".to_owned()];
        assert!(args.to_app_form().is_err());

        args.env = vec!["=value".to_owned()];
        assert!(args.to_app_form().is_err());
    }

    #[test]
    fn form_args_map_exposure_flags() {
        let mut args = bare_args();
        args.exposed = true;
        args.domain = Some("x.example.com".to_owned());
        args.local = true;
        args.guest = true;
        let form = args.to_app_form().unwrap();
        assert!(form.exposed);
        assert!(form.exposed_local);
        assert!(form.is_visible_on_guest_dashboard);
        assert_eq!(form.domain.as_deref(), Some("x.example.com"));
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_VALIDATION_ERROR);
        assert_ne!(EXIT_VALIDATION_ERROR, EXIT_STORE_ERROR);
    }

    #[test]
    fn spinner_helpers_finish() {
        let pb = spinner("working...");
        spin_ok(&pb, "done");
        let pb = spinner("working...");
        spin_fail(&pb, "failed");
    }
}
