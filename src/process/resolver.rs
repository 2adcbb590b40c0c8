use crate::config::{MatchSpec, ProcessSpec};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Discovers candidate PIDs for a managed process.
///
/// Two independent sources feed the candidate set: the process's recorded
/// PID file, and a live process-table scan against the configured match
/// predicate. The PID file may be stale (a PID from a previous run that
/// has exited or been recycled) or missing after an unclean shutdown, so
/// the table scan is the ground truth and the PID file is a fast-path
/// hint. Neither source is solely authoritative; the union of both is.
pub struct PidResolver {
    /// System information collector
    system: System,
}

impl PidResolver {
    /// Create a new resolver with an empty process-table snapshot.
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Resolve the candidate PID set for a managed process.
    ///
    /// Candidates are deduplicated and ascending. A missing PID file is
    /// silent; an unreadable or malformed one is a non-fatal warning and
    /// contributes no candidate.
    pub fn resolve(&mut self, spec: &ProcessSpec) -> BTreeSet<u32> {
        let mut candidates = BTreeSet::new();

        if let Some(path) = &spec.pid_file {
            if let Some(pid) = read_pid_file(path, &spec.name) {
                candidates.insert(pid);
            }
        }

        candidates.extend(self.scan(&spec.r#match));

        tracing::debug!(
            process = %spec.name,
            candidates = ?candidates,
            "Resolved candidate PIDs"
        );

        candidates
    }

    /// Scan the live process table for PIDs matching the predicate.
    fn scan(&mut self, pattern: &MatchSpec) -> BTreeSet<u32> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );

        self.system
            .processes()
            .iter()
            .filter(|(_, process)| match pattern {
                MatchSpec::Exe(exe) => process.name() == OsStr::new(exe),
                MatchSpec::Cmdline(needle) => {
                    let cmdline = process
                        .cmd()
                        .iter()
                        .map(|arg| arg.to_string_lossy())
                        .collect::<Vec<_>>()
                        .join(" ");
                    cmdline.contains(needle.as_str())
                }
            })
            .map(|(pid, _)| pid.as_u32())
            .collect()
    }
}

impl Default for PidResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a single positive PID from a PID file.
///
/// Returns `None` for a missing file (normal after a clean shutdown) and
/// for unreadable or malformed content, which is logged as a warning.
fn read_pid_file(path: &Path, process: &str) -> Option<u32> {
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                process = %process,
                path = %path.display(),
                error = %e,
                "Could not read PID file"
            );
            return None;
        }
    };

    match content.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Some(pid),
        _ => {
            tracing::warn!(
                process = %process,
                path = %path.display(),
                "PID file does not hold a positive integer"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_pid_file_valid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  4321  ").unwrap();

        assert_eq!(read_pid_file(file.path(), "httpd"), Some(4321));
    }

    #[test]
    fn test_read_pid_file_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not-a-pid").unwrap();

        assert_eq!(read_pid_file(file.path(), "httpd"), None);
    }

    #[test]
    fn test_read_pid_file_zero_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0").unwrap();

        assert_eq!(read_pid_file(file.path(), "httpd"), None);
    }

    #[test]
    fn test_read_pid_file_missing() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        drop(file);

        assert_eq!(read_pid_file(&path, "httpd"), None);
    }
}
