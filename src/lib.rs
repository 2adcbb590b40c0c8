/*!
 # stack-control

 A local control plane for supervising a front-end web server and its
 request-processing manager on a single host.

 ## Overview

 stack-control provides functionality to:
 - Determine whether each managed process is genuinely alive (PID file
   plus process-table scan, with zombie filtering)
 - Sequence start/stop/restart/graceful operations across dependent
   processes with idempotency and partial-failure reporting
 - Serve lifecycle operations and status queries over an HTTP JSON API
 - Tail the managed server's logs and run its configuration self-check

 It does not supervise processes across hosts, respawn crashed
 processes, or implement the underlying control commands; it
 orchestrates calls to them and interprets the results.

 ## Basic Usage

 ```no_run
 use actix_web::web::Data;
 use stack_control::{ControlPlane, LifecycleAction, Result, api};

 #[actix_web::main]
 async fn main() -> Result<()> {
     // Create a control plane from a config file
     let plane = Data::new(ControlPlane::from_config_file("control.json")?);

     // Dispatch an orchestrated operation
     let report = plane.dispatch(LifecycleAction::Start).await;
     println!("start: {:?}", report.status);

     // Or serve the HTTP control API
     api::serve(plane.clone()).await?;

     // Drain managed processes before exit
     plane.shutdown_drain().await;

     Ok(())
 }
 ```

 ## Features

 - **Liveness Resolution**: PID-file and process-table discovery merged
   into one zombie-aware liveness decision
 - **Lifecycle Orchestration**: per-operation ordering, settle-then-recheck
   classification, partial-failure aggregation
 - **HTTP Control API**: health, status, lifecycle, log-tail, and
   config-test endpoints
 - **Error Handling**: structured error responses; the control server
   stays reachable even when a managed process is unmanageable
 - **Async Support**: full async/await support

 ## License

 This project is licensed under the terms in the LICENSE file.
*/

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod process;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::{
    AggregateStatus, ControlState, GroupState, LifecycleAction, OperationReport,
};
pub use process::{GroupProbe, ProcessProbe, ProcessStatus};

use crate::orchestrator::LifecycleOrchestrator;
use crate::process::{CommandExecutor, CommandRunner};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;

/// Result of the managed server's configuration self-check.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigTestReport {
    /// Whether the configuration passed the self-check.
    pub valid: bool,
    /// Combined stderr + stdout of the self-check command.
    pub output: String,
    /// Exit code of the self-check command, if it ran to completion.
    pub exit_code: Option<i32>,
}

/// Supervise the managed process group.
///
/// This struct is the main entry point: it owns the configuration, the
/// orchestrator (behind the per-group operation lock), and the last-known
/// state snapshot. All lifecycle operations on the group serialize
/// through [`ControlPlane::dispatch`]; read-only queries run fresh probes
/// and read snapshot copies without taking the operation lock.
/// All public methods are instrumented with `tracing`.
pub struct ControlPlane {
    /// Configuration
    config: Config,
    /// The orchestrator, serialized per group
    orchestrator: Mutex<LifecycleOrchestrator>,
    /// Last-known state, written only by the orchestrator
    state: Arc<RwLock<ControlState>>,
    /// Command runner for the configuration self-check
    runner: Arc<dyn CommandExecutor>,
}

impl ControlPlane {
    /// Create a new control plane from a configuration file path.
    ///
    /// Validates the configuration after parsing.
    #[tracing::instrument(skip(path), fields(config_path = ?path.as_ref()))]
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        config::validate_config(&config)?;
        Ok(Self::new(config))
    }

    /// Create a new control plane from an already-validated configuration.
    pub fn new(config: Config) -> Self {
        let state = Arc::new(RwLock::new(ControlState::assume_stopped(&config.group)));
        let orchestrator = LifecycleOrchestrator::new(
            config.group.clone(),
            config.settle.clone(),
            Arc::clone(&state),
        );

        Self {
            config,
            orchestrator: Mutex::new(orchestrator),
            state,
            runner: Arc::new(CommandRunner::new()),
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one lifecycle operation across the group.
    ///
    /// Operations serialize on the per-group lock: two concurrent calls
    /// cannot interleave their check-then-act steps.
    #[tracing::instrument(skip(self), fields(action = %action))]
    pub async fn dispatch(&self, action: LifecycleAction) -> OperationReport {
        let mut orchestrator = self.orchestrator.lock().await;
        orchestrator.execute(action).await
    }

    /// Fresh liveness of every managed process, in declared start order.
    ///
    /// Does not take the operation lock; each call builds its own
    /// process-table snapshot.
    pub fn probe_group(&self) -> Vec<(String, ProcessStatus)> {
        let mut probe = GroupProbe::new();
        self.config
            .group
            .processes
            .iter()
            .map(|spec| (spec.name.clone(), probe.status(spec)))
            .collect()
    }

    /// A copy of the last-known state snapshot.
    pub fn state_snapshot(&self) -> ControlState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Run the managed server's configuration self-check command.
    ///
    /// Validity is exit code zero or the configured success pattern
    /// appearing in the combined output; some self-check tools write
    /// their verdict to stderr even on success.
    #[tracing::instrument(skip(self))]
    pub async fn run_config_test(&self) -> Result<ConfigTestReport> {
        let spec = self.config.config_test.as_ref().ok_or_else(|| {
            Error::Other("no configuration self-check command configured".to_string())
        })?;

        let output = self
            .runner
            .run(&spec.command, Duration::from_secs(spec.timeout_secs))
            .await?;

        let combined = format!("{}{}", output.stderr, output.stdout);
        let valid = output.success()
            || spec
                .success_pattern
                .as_ref()
                .is_some_and(|pattern| combined.contains(pattern));

        tracing::info!(valid = valid, exit_code = ?output.exit_code, "Configuration self-check finished");

        Ok(ConfigTestReport {
            valid,
            output: combined,
            exit_code: output.exit_code,
        })
    }

    /// Drain the managed group before the control server exits.
    ///
    /// Invoked by the hosting process after the HTTP server stops; calls
    /// the same graceful-stop contract as the API, bounded by the
    /// configured drain timeout.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown_drain(&self) {
        let drain = Duration::from_secs(self.config.shutdown_drain_secs);
        tracing::info!(
            timeout_secs = self.config.shutdown_drain_secs,
            "Draining managed processes before exit"
        );

        match tokio::time::timeout(drain, self.dispatch(LifecycleAction::GracefulStop)).await {
            Ok(report) => {
                tracing::info!(status = ?report.status, "Managed processes drained");
            }
            Err(_) => {
                tracing::warn!("Drain timed out; exiting with managed processes still running");
            }
        }
    }
}
