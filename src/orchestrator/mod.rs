//! Lifecycle orchestration for stack-control.
//!
//! This module sequences start/stop/restart/graceful operations across
//! the managed process group: per-operation ordering, idempotency checks,
//! settle-then-recheck classification, and aggregation of per-process
//! outcomes into one overall result.
//!
//! # Components
//!
//! * `outcome` - Actions, per-process outcomes, and operation reports
//! * `state` - The last-known group snapshot and derived group state
//!
//! Two rules shape everything here. First, ordering is a per-operation
//! table, not a single dependency direction: start-directed operations
//! walk the declared start order (dependent process first), stop-directed
//! operations walk the stop order (front-end first). Second, success is
//! classified from a fresh liveness recheck after a settle delay, never
//! from a command exit code alone, since control commands can exit zero
//! while the managed process fails to come up, and vice versa.
mod outcome;
mod state;

pub use outcome::{
    AggregateStatus, LifecycleAction, OperationReport, OutcomeStatus, ProcessOutcome,
};
pub use state::{ControlState, GroupState};

use crate::config::{CommandSpec, ProcessGroup, ProcessSpec, SettleConfig};
use crate::process::{CommandExecutor, CommandRunner, GroupProbe, ProcessProbe, ProcessStatus};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Sequences lifecycle operations over one managed process group.
///
/// The orchestrator is the only writer of [`ControlState`]. Callers must
/// serialize operations on one group (the control plane holds the
/// orchestrator behind a mutex) so that two concurrent operations cannot
/// interleave their check-then-act steps.
pub struct LifecycleOrchestrator {
    group: ProcessGroup,
    settle: SettleConfig,
    probe: Box<dyn ProcessProbe>,
    runner: Arc<dyn CommandExecutor>,
    state: Arc<RwLock<ControlState>>,
}

impl LifecycleOrchestrator {
    /// Create an orchestrator with the real probe and command runner.
    pub fn new(group: ProcessGroup, settle: SettleConfig, state: Arc<RwLock<ControlState>>) -> Self {
        Self::with_collaborators(
            group,
            settle,
            Box::new(GroupProbe::new()),
            Arc::new(CommandRunner::new()),
            state,
        )
    }

    /// Create an orchestrator with injected collaborators.
    pub fn with_collaborators(
        group: ProcessGroup,
        settle: SettleConfig,
        probe: Box<dyn ProcessProbe>,
        runner: Arc<dyn CommandExecutor>,
        state: Arc<RwLock<ControlState>>,
    ) -> Self {
        Self {
            group,
            settle,
            probe,
            runner,
            state,
        }
    }

    /// Execute one lifecycle operation across the group.
    ///
    /// A command timeout or failure never aborts the operation; it is
    /// recorded as that process's error outcome and the sequence
    /// continues. Nothing is retried automatically.
    #[tracing::instrument(skip(self), fields(operation = %Uuid::new_v4(), action = %action))]
    pub async fn execute(&mut self, action: LifecycleAction) -> OperationReport {
        let sequence: Vec<ProcessSpec> = self
            .ordering(action)
            .into_iter()
            .cloned()
            .collect();

        let mut outcomes = Vec::with_capacity(sequence.len());
        let mut statuses = Vec::with_capacity(sequence.len());

        for spec in &sequence {
            let (outcome, status) = self.apply(spec, action).await;
            outcomes.push(outcome);
            statuses.push((spec.name.clone(), status));
        }

        let desired_alive = action.desired_alive();
        let all_already = outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::AlreadyInDesiredState);
        let all_desired = statuses.iter().all(|(_, s)| s.alive == desired_alive);

        let status = if all_already {
            AggregateStatus::AlreadyInDesiredState
        } else if all_desired {
            AggregateStatus::Success
        } else {
            AggregateStatus::Partial
        };

        let report = OperationReport {
            action,
            status,
            outcomes,
            statuses,
        };

        match self.state.write() {
            Ok(mut state) => state.record_operation(&report),
            Err(e) => {
                tracing::error!(error = %e, "Control state lock poisoned; snapshot not updated")
            }
        }

        tracing::info!(
            status = ?report.status,
            summary = %summarize(&report),
            "Lifecycle operation finished"
        );

        report
    }

    /// The per-operation ordering table.
    fn ordering(&self, action: LifecycleAction) -> Vec<&ProcessSpec> {
        if action.desired_alive() {
            self.group.start_sequence()
        } else {
            self.group.stop_sequence()
        }
    }

    /// Drive one process toward the action's desired state.
    async fn apply(
        &mut self,
        spec: &ProcessSpec,
        action: LifecycleAction,
    ) -> (ProcessOutcome, ProcessStatus) {
        let before = self.probe.status(spec);

        // Idempotency: start-directed operations skip live processes,
        // stop-directed ones skip dead processes. Restart is deliberately
        // unconditional.
        let skip = match action {
            LifecycleAction::Start => before.alive,
            LifecycleAction::Stop | LifecycleAction::GracefulStop => !before.alive,
            LifecycleAction::Restart | LifecycleAction::GracefulRestart => false,
        };
        if skip {
            tracing::debug!(
                process = %spec.name,
                alive = before.alive,
                "Already in desired state, no command issued"
            );
            let outcome = ProcessOutcome::already(&spec.name, before.pid);
            return (outcome, before);
        }

        let command = self.command_for(spec, action, &before);

        let run = self.runner.run(command, spec.command_timeout()).await;

        tokio::time::sleep(self.settle_for(action)).await;
        let after = self.probe.status(spec);

        let reached_desired = after.alive == action.desired_alive();
        let (stdout, stderr) = match run {
            Ok(output) => (Some(output.stdout), Some(output.stderr)),
            Err(e) => {
                tracing::warn!(process = %spec.name, error = %e, "Control command could not be launched");
                (None, Some(e.to_string()))
            }
        };

        let outcome = ProcessOutcome {
            process: spec.name.clone(),
            status: if reached_desired {
                OutcomeStatus::Success
            } else {
                OutcomeStatus::Error
            },
            pid: after.pid,
            stdout,
            stderr,
        };

        (outcome, after)
    }

    /// Pick the control command for this action given the pre-check.
    ///
    /// A reload signal sent to a non-existent process is a no-op, so a
    /// graceful restart of a dead process boots it instead.
    fn command_for<'a>(
        &self,
        spec: &'a ProcessSpec,
        action: LifecycleAction,
        before: &ProcessStatus,
    ) -> &'a CommandSpec {
        match action {
            LifecycleAction::Start => &spec.commands.start,
            LifecycleAction::Stop => &spec.commands.stop,
            LifecycleAction::Restart => &spec.commands.restart,
            LifecycleAction::GracefulRestart => {
                if before.alive {
                    spec.commands.reload_or_restart()
                } else {
                    &spec.commands.start
                }
            }
            LifecycleAction::GracefulStop => spec.commands.graceful_stop_or_stop(),
        }
    }

    /// The named settle duration for this operation.
    fn settle_for(&self, action: LifecycleAction) -> Duration {
        let ms = match action {
            LifecycleAction::Start => self.settle.start_ms,
            LifecycleAction::Stop => self.settle.stop_ms,
            LifecycleAction::Restart => self.settle.restart_ms,
            LifecycleAction::GracefulRestart => self.settle.reload_ms,
            LifecycleAction::GracefulStop => self.settle.graceful_stop_ms,
        };
        Duration::from_millis(ms)
    }
}

/// One-line per-process summary for the operation log.
fn summarize(report: &OperationReport) -> String {
    report
        .statuses
        .iter()
        .map(|(name, status)| format!("{}: {}", name, status.state_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
