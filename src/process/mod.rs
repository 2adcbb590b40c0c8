//! Process discovery and liveness for stack-control.
//!
//! This module answers the one question everything else depends on: is a
//! managed process actually alive right now, and under which PID? It
//! combines two discovery sources (PID file and process-table scan),
//! filters out zombies, and exposes the external-command seam used by the
//! orchestrator.
//!
//! # Components
//!
//! * `resolver` - Candidate PID discovery from PID file and table scan
//! * `liveness` - Zombie-aware liveness decision over the candidates
//! * `runner` - Bounded-timeout external command execution
//!
//! # Examples
//!
//! Probing a process:
//!
//! ```no_run
//! use stack_control::config::{CommandSet, CommandSpec, MatchSpec, ProcessSpec};
//! use stack_control::process::{GroupProbe, ProcessProbe};
//!
//! let spec = ProcessSpec {
//!     name: "httpd".to_string(),
//!     pid_file: None,
//!     r#match: MatchSpec::Exe("apache2".to_string()),
//!     commands: CommandSet {
//!         start: CommandSpec { command: "apachectl".into(), args: vec!["-k".into(), "start".into()] },
//!         stop: CommandSpec { command: "apachectl".into(), args: vec!["-k".into(), "stop".into()] },
//!         restart: CommandSpec { command: "apachectl".into(), args: vec!["-k".into(), "restart".into()] },
//!         reload: None,
//!         graceful_stop: None,
//!     },
//!     command_timeout_secs: 10,
//! };
//!
//! let mut probe = GroupProbe::new();
//! let status = probe.status(&spec);
//! println!("alive: {}, pid: {:?}", status.alive, status.pid);
//! ```
pub mod liveness;
pub mod resolver;
pub mod runner;

pub use liveness::{Liveness, LivenessChecker};
pub use resolver::PidResolver;
pub use runner::{CommandExecutor, CommandOutput, CommandRunner};

use crate::config::ProcessSpec;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time liveness of a managed process.
///
/// Derived fresh on every query; the only copy that outlives a request is
/// the last-known snapshot the orchestrator keeps for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessStatus {
    /// Whether the process is genuinely running (not a zombie).
    pub alive: bool,
    /// The live PID, when alive.
    pub pid: Option<u32>,
    /// When this observation was made.
    pub observed_at: DateTime<Utc>,
}

impl ProcessStatus {
    /// The status every process is assumed to have before the first probe.
    pub fn assumed_stopped() -> Self {
        Self {
            alive: false,
            pid: None,
            observed_at: Utc::now(),
        }
    }

    /// The wire representation used in status payloads.
    pub fn state_str(&self) -> &'static str {
        if self.alive { "running" } else { "stopped" }
    }
}

/// Liveness probe seam used by the orchestrator and the status handlers.
pub trait ProcessProbe: Send {
    /// Derive the current status of one managed process.
    fn status(&mut self, spec: &ProcessSpec) -> ProcessStatus;
}

/// The real probe: PID-file + table-scan resolution, then zombie-aware
/// liveness over the merged candidates.
pub struct GroupProbe {
    resolver: PidResolver,
    checker: LivenessChecker,
}

impl GroupProbe {
    /// Create a probe with fresh process-table snapshots.
    pub fn new() -> Self {
        Self {
            resolver: PidResolver::new(),
            checker: LivenessChecker::new(),
        }
    }
}

impl Default for GroupProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for GroupProbe {
    fn status(&mut self, spec: &ProcessSpec) -> ProcessStatus {
        let candidates = self.resolver.resolve(spec);
        let liveness = self.checker.check(&candidates);

        ProcessStatus {
            alive: liveness.alive,
            pid: liveness.pid,
            observed_at: Utc::now(),
        }
    }
}
