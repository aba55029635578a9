mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{FormArgs, EXIT_FAILURE, EXIT_STORE_ERROR, EXIT_VALIDATION_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use wharf_core::{load_settings_file, AppEngine, EngineSettings};
use wharf_events::EventDispatcher;
use wharf_schema::FsCatalog;
use wharf_store::StoreLayout;

#[derive(Debug, Parser)]
#[command(
    name = "wharf",
    version,
    about = "Lifecycle manager for self-hosted Docker applications"
)]
struct Cli {
    /// Path to the Wharf state store directory.
    #[arg(long, default_value = "~/.local/share/wharf")]
    store: String,

    /// Path to the app catalog directory (defaults to <store>/catalog).
    #[arg(long)]
    catalog: Option<String>,

    /// Path to the settings file (defaults to <store>/wharf.toml).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install an app from the catalog.
    Install {
        /// Catalog name of the app.
        app: String,
        /// App store the catalog entry comes from.
        #[arg(long, default_value = "1")]
        store_id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Start an installed app.
    Start {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// Stop a running app.
    Stop {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// Restart an app.
    Restart {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// Reset an app to a pristine state (destroys its data).
    Reset {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// Update an app to its current catalog revision.
    Update {
        /// App id (<name>-<store>).
        app_id: String,
        /// Back the app up first (extends the operation budget).
        #[arg(long, default_value_t = false)]
        backup: bool,
    },
    /// Reconfigure an app without restarting it.
    Config {
        /// App id (<name>-<store>).
        app_id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Uninstall an app and delete its record.
    Uninstall {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// List all installed apps.
    List,
    /// Inspect one app's persisted record.
    Inspect {
        /// App id (<name>-<store>).
        app_id: String,
    },
    /// Run the job worker that executes container operations.
    Worker {
        /// Container runtime backend (docker or mock).
        #[arg(long, default_value = "docker")]
        backend: String,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WHARF_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let store_path = expand_tilde(&cli.store);
    let catalog_path = cli
        .catalog
        .as_deref()
        .map_or_else(|| store_path.join("catalog"), expand_tilde);
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| store_path.join("wharf.toml"));

    let result = dispatch(&cli, &store_path, &catalog_path, &settings_path);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(classify_error(&msg))
        }
    }
}

fn dispatch(
    cli: &Cli,
    store_path: &std::path::Path,
    catalog_path: &std::path::Path,
    settings_path: &std::path::Path,
) -> Result<u8, String> {
    let settings = load_settings_file(settings_path).map_err(|e| e.to_string())?;
    let layout = StoreLayout::new(store_path);
    layout.initialize().map_err(|e| e.to_string())?;
    let catalog = Arc::new(FsCatalog::new(catalog_path));

    if let Commands::Completions { shell } = &cli.command {
        return commands::completions::run::<Cli>(*shell);
    }
    if let Commands::Worker { backend } = &cli.command {
        return commands::worker::run(&layout, catalog, backend, &settings);
    }

    let engine = build_engine(&layout, catalog, settings)?;
    match &cli.command {
        Commands::Install {
            app,
            store_id,
            form,
        } => commands::install::run(&engine, app, store_id, form),
        Commands::Start { app_id } => commands::lifecycle::start(&engine, app_id),
        Commands::Stop { app_id } => commands::lifecycle::stop(&engine, app_id),
        Commands::Restart { app_id } => commands::lifecycle::restart(&engine, app_id),
        Commands::Reset { app_id } => commands::lifecycle::reset(&engine, app_id),
        Commands::Update { app_id, backup } => commands::update::run(&engine, app_id, *backup),
        Commands::Config { app_id, form } => commands::config::run(&engine, app_id, form),
        Commands::Uninstall { app_id } => commands::uninstall::run(&engine, app_id),
        Commands::List => commands::list::run(&engine, cli.json),
        Commands::Inspect { app_id } => commands::inspect::run(&engine, app_id, cli.json),
        Commands::Worker { .. } | Commands::Completions { .. } => unreachable!("handled above"),
    }
}

fn build_engine(
    layout: &StoreLayout,
    catalog: Arc<FsCatalog>,
    settings: EngineSettings,
) -> Result<AppEngine, String> {
    let dispatcher = EventDispatcher::new(layout.jobs_dir(), settings.dispatcher_config())
        .map_err(|e| e.to_string())?;
    Ok(AppEngine::new(layout, dispatcher, catalog, settings))
}

fn classify_error(msg: &str) -> u8 {
    const VALIDATION_PREFIXES: [&str; 9] = [
        "an exposed app",
        "app '",
        "domain '",
        "architecture '",
        "app requires wharf",
        "demo mode",
        "form error:",
        "could not determine",
        "invalid",
    ];
    if msg.starts_with("store error:") || msg.starts_with("store I/O") {
        EXIT_STORE_ERROR
    } else if VALIDATION_PREFIXES.iter().any(|p| msg.starts_with(p))
        || msg.contains("not a valid fully qualified")
    {
        EXIT_VALIDATION_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_install_with_form_flags() {
        let cli = Cli::parse_from([
            "wharf",
            "install",
            "nginx",
            "--store-id",
            "2",
            "--exposed",
            "--domain",
            "nginx.example.com",
            "--env",
            "TZ=UTC",
        ]);
        match cli.command {
            Commands::Install {
                app,
                store_id,
                form,
            } => {
                assert_eq!(app, "nginx");
                assert_eq!(store_id, "2");
                assert!(form.exposed);
                assert_eq!(form.domain.as_deref(), Some("nginx.example.com"));
                assert_eq!(form.env, vec!["TZ=UTC".to_owned()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_worker_backend() {
        let cli = Cli::parse_from(["wharf", "worker", "--backend", "mock"]);
        match cli.command {
            Commands::Worker { backend } => assert_eq!(backend, "mock"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn classify_error_routes_exit_codes() {
        assert_eq!(classify_error("store error: disk full"), EXIT_STORE_ERROR);
        assert_eq!(
            classify_error("an exposed app requires a domain"),
            EXIT_VALIDATION_ERROR
        );
        assert_eq!(
            classify_error("'nope' is not a valid fully qualified domain name"),
            EXIT_VALIDATION_ERROR
        );
        assert_eq!(classify_error("something else broke"), EXIT_FAILURE);
    }

    #[test]
    fn expand_tilde_uses_home() {
        std::env::set_var("HOME", "/home/test");
        assert_eq!(
            expand_tilde("~/.local/share/wharf"),
            PathBuf::from("/home/test/.local/share/wharf")
        );
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
