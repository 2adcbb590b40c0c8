//! Configuration module for stack-control.
//!
//! This module handles parsing, validation, and access to configuration
//! settings for the managed process group and the control API. It supports
//! loading configurations from files or strings in JSON format.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use stack_control::config::Config;
//!
//! let config = Config::from_file("control.json").unwrap();
//! println!("Loaded configuration with {} processes", config.group.processes.len());
//! ```
mod parser;
pub mod validator;

pub use parser::{
    ApiConfig, CommandSet, CommandSpec, Config, ConfigTestSpec, DEFAULT_WORKERS, LogsConfig,
    MatchSpec, ProcessGroup, ProcessSpec, SettleConfig,
};
pub use validator::validate_config;
