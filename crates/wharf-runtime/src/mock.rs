use crate::backend::{ComposeRuntime, RunOutput};
use crate::RuntimeError;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Up,
    Down,
    Restart,
    Destroy,
}

#[derive(Default)]
struct MockState {
    invocations: Vec<(MockOp, String)>,
    fail_ops: HashSet<MockOp>,
    running: HashSet<String>,
}

/// In-memory backend recording every invocation, with per-operation
/// failure injection for rollback tests.
#[derive(Default)]
pub struct MockRuntime {
    state: Mutex<MockState>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent invocation of `op` fail.
    pub fn fail_on(&self, op: MockOp) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_ops.insert(op);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_ops.clear();
    }

    pub fn invocations(&self) -> Vec<(MockOp, String)> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.invocations.clone()
    }

    pub fn is_running(&self, project: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.running.contains(project)
    }

    fn record(&self, op: MockOp, project: &str) -> Result<RunOutput, RuntimeError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_ops.contains(&op) {
            return Err(RuntimeError::CommandFailed(format!(
                "mock {op:?} failure for {project}"
            )));
        }
        state.invocations.push((op, project.to_owned()));
        match op {
            MockOp::Up => {
                state.running.insert(project.to_owned());
            }
            MockOp::Down | MockOp::Destroy => {
                state.running.remove(project);
            }
            MockOp::Restart => {
                state.running.insert(project.to_owned());
            }
        }
        Ok(RunOutput {
            stdout: format!("mock {op:?} {project}"),
        })
    }
}

impl ComposeRuntime for MockRuntime {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn up(&self, project: &str, _compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.record(MockOp::Up, project)
    }

    fn down(&self, project: &str, _compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.record(MockOp::Down, project)
    }

    fn restart(&self, project: &str, _compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.record(MockOp::Restart, project)
    }

    fn destroy(&self, project: &str, _compose_file: &Path) -> Result<RunOutput, RuntimeError> {
        self.record(MockOp::Destroy, project)
    }
}
