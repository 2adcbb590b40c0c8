use std::collections::BTreeSet;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Result of a liveness check over a candidate PID set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveness {
    /// Whether any candidate is a genuinely running process.
    pub alive: bool,
    /// The first live PID found, in ascending order.
    pub pid: Option<u32>,
}

impl Liveness {
    /// The not-alive result.
    pub fn dead() -> Self {
        Self {
            alive: false,
            pid: None,
        }
    }
}

/// Decides whether a managed process is genuinely alive.
///
/// A PID existing in the candidate set is not enough: the process record
/// may belong to a zombie (unreaped exit metadata, not a running
/// process), or may have vanished between discovery and inspection.
/// Candidates are inspected in ascending numeric order and the first one
/// that survives both filters wins. A well-behaved managed process has at
/// most one master instance, so the first live match avoids ambiguity
/// when stale entries linger in the candidate set.
pub struct LivenessChecker {
    /// System information collector
    system: System,
}

impl LivenessChecker {
    /// Create a new checker with an empty process-table snapshot.
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Check the candidate set and return the first live PID, if any.
    pub fn check(&mut self, candidates: &BTreeSet<u32>) -> Liveness {
        for &pid in candidates {
            let sys_pid = Pid::from_u32(pid);

            self.system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[sys_pid]),
                true,
                ProcessRefreshKind::everything(),
            );

            match self.system.process(sys_pid) {
                Some(process) if process.status() == sysinfo::ProcessStatus::Zombie => {
                    tracing::debug!(pid = pid, "Skipping zombie candidate");
                }
                Some(_) => {
                    return Liveness {
                        alive: true,
                        pid: Some(pid),
                    };
                }
                // Process exited between discovery and inspection.
                None => continue,
            }
        }

        Liveness::dead()
    }
}

impl Default for LivenessChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_candidates_are_dead() {
        let mut checker = LivenessChecker::new();
        let result = checker.check(&BTreeSet::new());

        assert!(!result.alive);
        assert_eq!(result.pid, None);
    }

    #[test]
    fn test_current_process_is_alive() {
        let mut checker = LivenessChecker::new();
        let own_pid = std::process::id();

        let candidates: BTreeSet<u32> = [own_pid].into_iter().collect();
        let result = checker.check(&candidates);

        assert!(result.alive);
        assert_eq!(result.pid, Some(own_pid));
    }

    #[test]
    fn test_vanished_candidate_is_skipped() {
        let mut checker = LivenessChecker::new();
        let own_pid = std::process::id();

        // PID 0 never belongs to a user process record.
        let candidates: BTreeSet<u32> = [0, own_pid].into_iter().collect();
        let result = checker.check(&candidates);

        assert!(result.alive);
        assert_eq!(result.pid, Some(own_pid));
    }
}
