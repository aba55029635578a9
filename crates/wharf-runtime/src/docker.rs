use crate::backend::{ComposeRuntime, RunOutput};
use crate::RuntimeError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Backend shelling out to the `docker compose` plugin.
#[derive(Debug, Default)]
pub struct DockerComposeRuntime;

impl DockerComposeRuntime {
    pub fn new() -> Self {
        Self
    }

    fn compose(
        &self,
        project: &str,
        compose_file: &Path,
        args: &[&str],
    ) -> Result<RunOutput, RuntimeError> {
        debug!("docker compose -p {project} {args:?}");
        let output = Command::new("docker")
            .arg("compose")
            .arg("-p")
            .arg(project)
            .arg("-f")
            .arg(compose_file)
            .args(args)
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(RunOutput { stdout: text })
        } else {
            Err(RuntimeError::CommandFailed(text))
        }
    }
}

impl ComposeRuntime for DockerComposeRuntime {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn available(&self) -> bool {
        Command::new("docker")
            .args(["compose", "version"])
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn up(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.compose(project, compose_file, &["up", "-d", "--remove-orphans"])
    }

    fn down(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.compose(project, compose_file, &["down"])
    }

    fn destroy(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.compose(
            project,
            compose_file,
            &["down", "--volumes", "--remove-orphans"],
        )
    }
}
