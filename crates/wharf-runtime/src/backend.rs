use crate::RuntimeError;
use std::path::Path;

/// Captured output of one container runtime invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
}

/// The container runtime as the worker sees it: an opaque "run this
/// compose file" surface keyed by project name.
pub trait ComposeRuntime: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    fn up(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError>;

    fn down(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError>;

    fn restart(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        let mut output = self.down(project, compose_file)?;
        let up = self.up(project, compose_file)?;
        output.stdout.push('\n');
        output.stdout.push_str(&up.stdout);
        Ok(output)
    }

    /// Tear down containers, networks, and volumes for good.
    fn destroy(&self, project: &str, compose_file: &Path) -> Result<RunOutput, RuntimeError>;
}

pub fn select_backend(name: &str) -> Result<Box<dyn ComposeRuntime>, RuntimeError> {
    match name {
        "docker" => Ok(Box::new(crate::docker::DockerComposeRuntime::new())),
        "mock" => Ok(Box::new(crate::mock::MockRuntime::new())),
        other => Err(RuntimeError::BackendUnavailable(other.to_owned())),
    }
}
