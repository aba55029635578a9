use wharf_events::AppCommand;
use wharf_store::AppStatus;

/// The intermediate and terminal status pair for a plain lifecycle
/// transition. Install, update, and uninstall finalize differently and
/// are handled by their own engine paths; `generate_env` never touches
/// status at all.
pub fn transition_pair(command: AppCommand) -> Option<(AppStatus, AppStatus)> {
    match command {
        AppCommand::Start => Some((AppStatus::Starting, AppStatus::Running)),
        AppCommand::Stop => Some((AppStatus::Stopping, AppStatus::Stopped)),
        AppCommand::Restart => Some((AppStatus::Restarting, AppStatus::Running)),
        AppCommand::Reset => Some((AppStatus::Resetting, AppStatus::Stopped)),
        AppCommand::Install
        | AppCommand::Update
        | AppCommand::Uninstall
        | AppCommand::GenerateEnv => None,
    }
}
