use crate::process::ProcessStatus;
use serde::Serialize;

/// The lifecycle operations the orchestrator can sequence over a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleAction {
    /// Boot every process not already running.
    #[serde(rename = "start_server")]
    Start,
    /// Stop every process currently running.
    #[serde(rename = "stop_server")]
    Stop,
    /// Hard restart: issue the restart command regardless of liveness.
    #[serde(rename = "restart")]
    Restart,
    /// Reload running processes, boot dead ones.
    #[serde(rename = "graceful-restart")]
    GracefulRestart,
    /// Orderly shutdown, draining in-flight work where supported.
    #[serde(rename = "graceful-stop")]
    GracefulStop,
}

impl LifecycleAction {
    /// The action name recorded in `ControlState` and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Start => "start_server",
            LifecycleAction::Stop => "stop_server",
            LifecycleAction::Restart => "restart",
            LifecycleAction::GracefulRestart => "graceful-restart",
            LifecycleAction::GracefulStop => "graceful-stop",
        }
    }

    /// Whether the action drives processes toward being alive (`true`)
    /// or stopped (`false`).
    pub fn desired_alive(&self) -> bool {
        matches!(
            self,
            LifecycleAction::Start | LifecycleAction::Restart | LifecycleAction::GracefulRestart
        )
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-process classification of one orchestrated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The process was already where the action wanted it; no command
    /// was issued.
    AlreadyInDesiredState,
    /// The post-command recheck found the process in the desired state.
    Success,
    /// The post-command recheck found the process still in the wrong
    /// state, or the command could not be launched.
    Error,
}

/// What happened to one process during an orchestrated operation.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    /// Process name.
    pub process: String,
    /// Classification of the result.
    pub status: OutcomeStatus,
    /// The PID observed at the recheck, if the process is alive.
    pub pid: Option<u32>,
    /// Captured stdout of the control command, when one was issued.
    pub stdout: Option<String>,
    /// Captured stderr of the control command (or the launch error),
    /// when one was issued.
    pub stderr: Option<String>,
}

impl ProcessOutcome {
    /// Outcome for a process that required no command.
    pub fn already(process: &str, pid: Option<u32>) -> Self {
        Self {
            process: process.to_string(),
            status: OutcomeStatus::AlreadyInDesiredState,
            pid,
            stdout: None,
            stderr: None,
        }
    }
}

/// Aggregate classification of one orchestrated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// Every process ended in its desired terminal state.
    Success,
    /// At least one process did not reach its desired state.
    Partial,
    /// Every process was already in the desired state; nothing was done.
    AlreadyInDesiredState,
}

/// Full result of one orchestrated operation: the aggregate verdict, the
/// per-process outcomes in execution order, and the rechecked statuses.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    /// The action that was executed.
    pub action: LifecycleAction,
    /// Aggregate verdict over the whole group.
    pub status: AggregateStatus,
    /// Per-process outcomes, in the order they were executed.
    pub outcomes: Vec<ProcessOutcome>,
    /// Post-operation status per process, in execution order.
    pub statuses: Vec<(String, ProcessStatus)>,
}

impl OperationReport {
    /// Whether every process in the report is alive.
    pub fn all_alive(&self) -> bool {
        self.statuses.iter().all(|(_, s)| s.alive)
    }

    /// Whether any process in the report is alive.
    pub fn any_alive(&self) -> bool {
        self.statuses.iter().any(|(_, s)| s.alive)
    }
}
