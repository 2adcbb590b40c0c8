use crate::config::ProcessGroup;
use crate::orchestrator::outcome::OperationReport;
use crate::process::ProcessStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Observed composite state of the managed group.
///
/// These are not states the orchestrator owns; they are derived by
/// composing each process's current liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    /// No process is alive.
    Stopped,
    /// Every process is alive.
    Running,
    /// One constituent process is alive, the other is not.
    Partial,
}

impl GroupState {
    /// Derive the composite state from per-process statuses.
    pub fn derive<'a>(statuses: impl IntoIterator<Item = &'a ProcessStatus>) -> Self {
        let mut any_alive = false;
        let mut any_dead = false;

        for status in statuses {
            if status.alive {
                any_alive = true;
            } else {
                any_dead = true;
            }
        }

        match (any_alive, any_dead) {
            (true, false) => GroupState::Running,
            (true, true) => GroupState::Partial,
            _ => GroupState::Stopped,
        }
    }

    /// The wire representation used in status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupState::Stopped => "stopped",
            GroupState::Running => "running",
            GroupState::Partial => "partial",
        }
    }
}

/// Last-known snapshot of the managed group.
///
/// Created at control-server start with every process assumed stopped.
/// Mutated exclusively by the orchestrator after each operation, under
/// the per-group operation lock; read-only queries get a snapshot copy.
/// Never persisted to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ControlState {
    /// Last observed status per process.
    pub per_process: HashMap<String, ProcessStatus>,
    /// Name of the last orchestrated action, if any.
    pub last_action: Option<String>,
    /// When the last orchestrated action finished.
    pub last_action_time: Option<DateTime<Utc>>,
}

impl ControlState {
    /// Initial state: every configured process assumed stopped, no
    /// action recorded yet.
    pub fn assume_stopped(group: &ProcessGroup) -> Self {
        let per_process = group
            .processes
            .iter()
            .map(|spec| (spec.name.clone(), ProcessStatus::assumed_stopped()))
            .collect();

        Self {
            per_process,
            last_action: None,
            last_action_time: None,
        }
    }

    /// Record the result of an orchestrated operation.
    ///
    /// Every status written here came from a fresh liveness recheck, not
    /// from a command exit code.
    pub fn record_operation(&mut self, report: &OperationReport) {
        for (name, status) in &report.statuses {
            self.per_process.insert(name.clone(), status.clone());
        }

        self.last_action = Some(report.action.as_str().to_string());
        self.last_action_time = Some(Utc::now());
    }

    /// The last observed status of a process, by name.
    pub fn status_of(&self, name: &str) -> Option<&ProcessStatus> {
        self.per_process.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(alive: bool) -> ProcessStatus {
        ProcessStatus {
            alive,
            pid: alive.then_some(100),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_state_derivation() {
        assert_eq!(
            GroupState::derive(std::iter::empty::<&ProcessStatus>()),
            GroupState::Stopped
        );
        assert_eq!(GroupState::derive([&status(false)]), GroupState::Stopped);
        assert_eq!(GroupState::derive([&status(true)]), GroupState::Running);
        assert_eq!(
            GroupState::derive([&status(true), &status(true)]),
            GroupState::Running
        );
        assert_eq!(
            GroupState::derive([&status(true), &status(false)]),
            GroupState::Partial
        );
    }
}
