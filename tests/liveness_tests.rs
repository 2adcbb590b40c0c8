use stack_control::config::{CommandSet, CommandSpec, MatchSpec, ProcessSpec};
use stack_control::process::{GroupProbe, LivenessChecker, PidResolver, ProcessProbe};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn noop_commands() -> CommandSet {
    let noop = CommandSpec {
        command: "true".to_string(),
        args: vec![],
    };
    CommandSet {
        start: noop.clone(),
        stop: noop.clone(),
        restart: noop,
        reload: None,
        graceful_stop: None,
    }
}

fn spec(name: &str, pid_file: Option<PathBuf>, pattern: MatchSpec) -> ProcessSpec {
    ProcessSpec {
        name: name.to_string(),
        pid_file,
        r#match: pattern,
        commands: noop_commands(),
        command_timeout_secs: 10,
    }
}

/// A PID that can never belong to a live process record: Linux pid_max
/// tops out at 4194304.
const IMPOSSIBLE_PID: u32 = 999_999_999;

#[test]
fn test_no_pid_file_and_empty_scan_is_dead() {
    let mut probe = GroupProbe::new();
    let spec = spec(
        "ghost",
        None,
        MatchSpec::Cmdline("definitely-no-such-process-xyzzy".to_string()),
    );

    let status = probe.status(&spec);

    assert!(!status.alive);
    assert_eq!(status.pid, None);
}

#[test]
fn test_pid_file_alone_finds_live_process() {
    let mut pid_file = NamedTempFile::new().unwrap();
    write!(pid_file, "{}", std::process::id()).unwrap();

    let mut probe = GroupProbe::new();
    let spec = spec(
        "self",
        Some(pid_file.path().to_path_buf()),
        MatchSpec::Cmdline("definitely-no-such-process-xyzzy".to_string()),
    );

    let status = probe.status(&spec);

    assert!(status.alive);
    assert_eq!(status.pid, Some(std::process::id()));
}

#[test]
fn test_stale_pid_file_tolerated_when_scan_finds_true_pid() {
    // A sleep child with a distinctive argument the table scan can match.
    let mut child = std::process::Command::new("sleep")
        .arg("300.7391")
        .spawn()
        .expect("failed to spawn sleep");
    let child_pid = child.id();

    let mut pid_file = NamedTempFile::new().unwrap();
    write!(pid_file, "{}", IMPOSSIBLE_PID).unwrap();

    let mut probe = GroupProbe::new();
    let spec = spec(
        "sleeper",
        Some(pid_file.path().to_path_buf()),
        MatchSpec::Cmdline("300.7391".to_string()),
    );

    let status = probe.status(&spec);

    let _ = child.kill();
    let _ = child.wait();

    assert!(status.alive);
    assert_eq!(status.pid, Some(child_pid));
}

#[test]
fn test_zombie_candidate_is_never_alive() {
    // A child that exits immediately and is deliberately not reaped
    // stays in the table as a zombie until wait() below.
    let mut child = std::process::Command::new("true")
        .spawn()
        .expect("failed to spawn true");
    let child_pid = child.id();

    std::thread::sleep(std::time::Duration::from_millis(300));

    let mut pid_file = NamedTempFile::new().unwrap();
    write!(pid_file, "{}", child_pid).unwrap();

    let mut probe = GroupProbe::new();
    let spec = spec(
        "zombie",
        Some(pid_file.path().to_path_buf()),
        MatchSpec::Cmdline("definitely-no-such-process-xyzzy".to_string()),
    );

    let status = probe.status(&spec);

    let _ = child.wait();

    assert!(!status.alive);
    assert_eq!(status.pid, None);
}

#[test]
fn test_resolver_unions_pid_file_and_scan() {
    let mut child = std::process::Command::new("sleep")
        .arg("300.4177")
        .spawn()
        .expect("failed to spawn sleep");
    let child_pid = child.id();

    // PID file holds our own PID; the scan finds the child.
    let mut pid_file = NamedTempFile::new().unwrap();
    write!(pid_file, "{}", std::process::id()).unwrap();

    let mut resolver = PidResolver::new();
    let spec = spec(
        "sleeper",
        Some(pid_file.path().to_path_buf()),
        MatchSpec::Cmdline("300.4177".to_string()),
    );

    let candidates = resolver.resolve(&spec);

    let _ = child.kill();
    let _ = child.wait();

    assert!(candidates.contains(&std::process::id()));
    assert!(candidates.contains(&child_pid));
}

#[test]
fn test_checker_returns_first_live_candidate_ascending() {
    let mut checker = LivenessChecker::new();
    let own_pid = std::process::id();

    // The impossible candidate sorts last; our own PID is the first
    // live match in ascending order.
    let candidates = [IMPOSSIBLE_PID, own_pid].into_iter().collect();
    let result = checker.check(&candidates);

    assert!(result.alive);
    assert_eq!(result.pid, Some(own_pid));
}
