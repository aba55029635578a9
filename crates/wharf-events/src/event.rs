use serde::{Deserialize, Serialize};

/// Container-mutating operation a job asks the worker to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCommand {
    Install,
    Start,
    Stop,
    Update,
    Uninstall,
    Restart,
    Reset,
    GenerateEnv,
}

impl std::fmt::Display for AppCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppCommand::Install => write!(f, "install"),
            AppCommand::Start => write!(f, "start"),
            AppCommand::Stop => write!(f, "stop"),
            AppCommand::Update => write!(f, "update"),
            AppCommand::Uninstall => write!(f, "uninstall"),
            AppCommand::Restart => write!(f, "restart"),
            AppCommand::Reset => write!(f, "reset"),
            AppCommand::GenerateEnv => write!(f, "generate_env"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    App,
}

/// The unit of work handed to the dispatch layer. Immutable once
/// dispatched; identity and expiry live on the surrounding job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub command: AppCommand,
    pub appid: String,
    /// Opaque form payload forwarded to the worker; `null` when the
    /// persisted record already carries everything needed.
    #[serde(default)]
    pub form: serde_json::Value,
    #[serde(
        rename = "performBackup",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub perform_backup: Option<bool>,
}

impl SystemEvent {
    pub fn app(command: AppCommand, appid: impl Into<String>) -> Self {
        Self {
            kind: EventKind::App,
            command,
            appid: appid.into(),
            form: serde_json::Value::Null,
            perform_backup: None,
        }
    }

    pub fn with_form(mut self, form: serde_json::Value) -> Self {
        self.form = form;
        self
    }

    pub fn with_backup(mut self, perform_backup: bool) -> Self {
        self.perform_backup = Some(perform_backup);
        self
    }
}
