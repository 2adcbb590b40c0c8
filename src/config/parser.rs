use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of Actix Web workers for the control API.
pub const DEFAULT_WORKERS: usize = 4;

fn default_service_name() -> String {
    "stack-control".to_string()
}

fn default_command_timeout() -> u64 {
    10
}

fn default_config_test_timeout() -> u64 {
    5
}

fn default_drain_secs() -> u64 {
    30
}

/// A single external control command.
///
/// This is the unit handed to the command runner: an executable plus its
/// arguments. The command is expected to act on the managed process (for
/// example `apachectl -k start` or `service php8.2-fpm reload`) and exit;
/// long-running commands are cut off by the per-process timeout.
///
/// # Examples
///
/// ```
/// use stack_control::config::CommandSpec;
///
/// let spec = CommandSpec {
///     command: "apachectl".to_string(),
///     args: vec!["-k".to_string(), "start".to_string()],
/// };
/// assert_eq!(spec.display(), "apachectl -k start");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable to run. This can be an absolute path or a command
    /// available in the PATH.
    pub command: String,

    /// Command-line arguments to pass to the executable.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Render the command as a single display string for logs and reports.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Process-table match predicate for discovering a managed process.
///
/// The resolver scans the live process table with this predicate in
/// addition to reading the PID file, since the PID file may be stale or
/// missing after an unclean shutdown.
///
/// # JSON Schema
///
/// Either an exact executable name match:
///
/// ```json
/// { "exe": "apache2" }
/// ```
///
/// or a command-line substring match (useful for workers that retitle
/// themselves, such as `php-fpm: master process`):
///
/// ```json
/// { "cmdline": "php-fpm: master" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchSpec {
    /// Exact executable name, equivalent to `pgrep -x`.
    Exe(String),

    /// Substring of the full command line, equivalent to `pgrep -f`.
    Cmdline(String),
}

impl MatchSpec {
    /// The raw pattern string, regardless of match kind.
    pub fn pattern(&self) -> &str {
        match self {
            MatchSpec::Exe(p) => p,
            MatchSpec::Cmdline(p) => p,
        }
    }
}

/// The set of control commands a managed process accepts.
///
/// `start`, `stop`, and `restart` are required. `reload` (graceful
/// restart) falls back to `restart` when absent, and `gracefulStop`
/// falls back to `stop`, so a process that has no native graceful
/// variants still participates in every orchestrated operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSet {
    /// Command that boots the process.
    pub start: CommandSpec,

    /// Command that stops the process.
    pub stop: CommandSpec,

    /// Command that hard-restarts the process.
    pub restart: CommandSpec,

    /// Command that reloads configuration without dropping in-flight work.
    #[serde(default)]
    pub reload: Option<CommandSpec>,

    /// Command that drains connections and stops the process.
    #[serde(default)]
    pub graceful_stop: Option<CommandSpec>,
}

impl CommandSet {
    /// The reload command, falling back to the hard restart command.
    pub fn reload_or_restart(&self) -> &CommandSpec {
        self.reload.as_ref().unwrap_or(&self.restart)
    }

    /// The graceful-stop command, falling back to the plain stop command.
    pub fn graceful_stop_or_stop(&self) -> &CommandSpec {
        self.graceful_stop.as_ref().unwrap_or(&self.stop)
    }
}

/// Configuration for a single managed process.
///
/// This is immutable identity: a human name, the discovery sources (PID
/// file and process-table predicate), and the control commands. Loaded at
/// startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpec {
    /// Human name of the process, used as the key in every API payload.
    pub name: String,

    /// Path to the file the process records its own PID in, if it keeps one.
    #[serde(default)]
    pub pid_file: Option<PathBuf>,

    /// Process-table predicate for discovery independent of the PID file.
    pub r#match: MatchSpec,

    /// Control commands the process accepts.
    pub commands: CommandSet,

    /// Bound on how long any single control command may run, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl ProcessSpec {
    /// The command timeout as a `Duration`.
    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.command_timeout_secs)
    }
}

/// An ordered group of one or two managed processes.
///
/// `processes` is the declared start order: dependent processes come
/// first, the front-end last, since the front-end typically proxies to
/// the dependent one. `stop_order` names the stop sequence and defaults
/// to the reverse of the start order (front-end first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroup {
    /// Managed processes in declared start order.
    pub processes: Vec<ProcessSpec>,

    /// Names in stop order. Defaults to the reverse of the start order.
    #[serde(default)]
    pub stop_order: Option<Vec<String>>,
}

impl ProcessGroup {
    /// Processes in start order.
    pub fn start_sequence(&self) -> Vec<&ProcessSpec> {
        self.processes.iter().collect()
    }

    /// Processes in stop order.
    ///
    /// Names in `stop_order` that match nothing are skipped; the
    /// validator rejects such configurations before they get here.
    pub fn stop_sequence(&self) -> Vec<&ProcessSpec> {
        match &self.stop_order {
            Some(order) => order.iter().filter_map(|name| self.find(name)).collect(),
            None => self.processes.iter().rev().collect(),
        }
    }

    /// Look up a process by name.
    pub fn find(&self, name: &str) -> Option<&ProcessSpec> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// All process names in declared start order.
    pub fn names(&self) -> Vec<&str> {
        self.processes.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Named settle durations, in milliseconds, applied between issuing a
/// control command and re-checking liveness.
///
/// Control commands routinely return before the managed process has
/// finished coming up or going down; the recheck only means something
/// after the operation has had time to take effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleConfig {
    /// Delay after a start command.
    pub start_ms: u64,
    /// Delay after a stop command.
    pub stop_ms: u64,
    /// Delay after a hard restart command.
    pub restart_ms: u64,
    /// Delay after a reload command.
    pub reload_ms: u64,
    /// Delay after a graceful-stop command.
    pub graceful_stop_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            start_ms: 1_000,
            stop_ms: 2_000,
            restart_ms: 1_000,
            reload_ms: 1_000,
            graceful_stop_ms: 2_000,
        }
    }
}

/// Bind settings for the control API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Address to listen on.
    pub address: String,

    /// Port to listen on.
    pub port: u16,

    /// Number of Actix Web workers. Defaults to [`DEFAULT_WORKERS`].
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8081,
            workers: None,
        }
    }
}

/// Paths to the managed server's log files, served by `/get-server-logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsConfig {
    /// Error log path.
    #[serde(default)]
    pub error: Option<PathBuf>,

    /// Access log path.
    #[serde(default)]
    pub access: Option<PathBuf>,
}

/// The managed server's configuration self-check command, served by
/// `/config-test`.
///
/// Some self-check tools (notably `apachectl configtest`) write their
/// verdict to stderr and can exit non-zero even when the configuration is
/// fine, so validity is exit code zero *or* `successPattern` appearing in
/// the combined output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTestSpec {
    /// The self-check command.
    pub command: CommandSpec,

    /// Substring of the combined output that marks success, e.g. `Syntax OK`.
    #[serde(default)]
    pub success_pattern: Option<String>,

    /// Bound on how long the self-check may run, in seconds.
    #[serde(default = "default_config_test_timeout")]
    pub timeout_secs: u64,
}

/// Main configuration for the control plane.
///
/// # JSON Schema
///
/// The configuration follows this JSON schema:
///
/// ```json
/// {
///   "service": "httpd-fpm-control",
///   "processes": [
///     {
///       "name": "fpm",
///       "pidFile": "/run/php/php-fpm.pid",
///       "match": { "cmdline": "php-fpm: master" },
///       "commandTimeoutSecs": 50,
///       "commands": {
///         "start": { "command": "service", "args": ["php8.2-fpm", "start"] },
///         "stop": { "command": "service", "args": ["php8.2-fpm", "stop"] },
///         "restart": { "command": "service", "args": ["php8.2-fpm", "restart"] },
///         "reload": { "command": "service", "args": ["php8.2-fpm", "reload"] }
///       }
///     },
///     {
///       "name": "httpd",
///       "pidFile": "/var/run/apache2/apache2.pid",
///       "match": { "exe": "apache2" },
///       "commands": {
///         "start": { "command": "apachectl", "args": ["-k", "start"] },
///         "stop": { "command": "apachectl", "args": ["-k", "stop"] },
///         "restart": { "command": "apachectl", "args": ["-k", "restart"] },
///         "reload": { "command": "apachectl", "args": ["-k", "graceful"] },
///         "gracefulStop": { "command": "apachectl", "args": ["-k", "graceful-stop"] }
///       }
///     }
///   ],
///   "settle": { "startMs": 1000, "stopMs": 2000, "restartMs": 1000, "reloadMs": 1000, "gracefulStopMs": 2000 },
///   "api": { "address": "0.0.0.0", "port": 8081 },
///   "logs": { "error": "/var/log/apache2/error.log", "access": "/var/log/apache2/access.log" },
///   "configTest": { "command": { "command": "apachectl", "args": ["configtest"] }, "successPattern": "Syntax OK" }
/// }
/// ```
///
/// # Examples
///
/// Loading a configuration from a file:
///
/// ```no_run
/// use stack_control::config::Config;
///
/// let config = Config::from_file("control.json").unwrap();
/// println!("Managing {} processes", config.group.processes.len());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Service name reported by `/health`.
    #[serde(default = "default_service_name")]
    pub service: String,

    /// The managed process group.
    #[serde(flatten)]
    pub group: ProcessGroup,

    /// Settle durations between command and recheck.
    #[serde(default)]
    pub settle: SettleConfig,

    /// Control API bind settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Log file paths for `/get-server-logs`.
    #[serde(default)]
    pub logs: LogsConfig,

    /// Configuration self-check command for `/config-test`.
    #[serde(default)]
    pub config_test: Option<ConfigTestSpec>,

    /// Bound on the managed-process drain at control-server shutdown,
    /// in seconds.
    #[serde(default = "default_drain_secs")]
    pub shutdown_drain_secs: u64,
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or does not
    /// conform to the expected schema.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }
}
