use crate::config::{CommandSpec, ProcessGroup, ProcessSpec};
use crate::error::{Error, Result};
use std::collections::HashSet;

fn validate_command(owner: &str, what: &str, spec: &CommandSpec) -> Result<()> {
    if spec.command.is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Process '{}' has an empty {} command",
            owner, what
        )));
    }

    Ok(())
}

/// Validates a single managed-process entry.
pub fn validate_process_spec(spec: &ProcessSpec) -> Result<()> {
    if spec.name.is_empty() {
        return Err(Error::ConfigInvalid("Process with empty name".to_string()));
    }

    if spec.r#match.pattern().is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Process '{}' has an empty match pattern",
            spec.name
        )));
    }

    validate_command(&spec.name, "start", &spec.commands.start)?;
    validate_command(&spec.name, "stop", &spec.commands.stop)?;
    validate_command(&spec.name, "restart", &spec.commands.restart)?;
    if let Some(reload) = &spec.commands.reload {
        validate_command(&spec.name, "reload", reload)?;
    }
    if let Some(graceful) = &spec.commands.graceful_stop {
        validate_command(&spec.name, "graceful-stop", graceful)?;
    }

    if spec.command_timeout_secs == 0 {
        return Err(Error::ConfigInvalid(format!(
            "Process '{}' has a zero command timeout",
            spec.name
        )));
    }

    Ok(())
}

/// Validates the managed process group.
///
/// The orchestrator operates on exactly one group of one or two
/// processes; anything else is a configuration mistake.
pub fn validate_group(group: &ProcessGroup) -> Result<()> {
    if group.processes.is_empty() {
        return Err(Error::ConfigInvalid("No processes configured".to_string()));
    }

    if group.processes.len() > 2 {
        return Err(Error::ConfigInvalid(format!(
            "A process group holds at most two processes, got {}",
            group.processes.len()
        )));
    }

    let mut seen = HashSet::new();
    for spec in &group.processes {
        validate_process_spec(spec)?;
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::ConfigInvalid(format!(
                "Duplicate process name '{}'",
                spec.name
            )));
        }
    }

    if let Some(order) = &group.stop_order {
        if order.len() != group.processes.len() {
            return Err(Error::ConfigInvalid(format!(
                "stopOrder names {} processes, the group has {}",
                order.len(),
                group.processes.len()
            )));
        }
        for name in order {
            if group.find(name).is_none() {
                return Err(Error::ConfigInvalid(format!(
                    "stopOrder references unknown process '{}'",
                    name
                )));
            }
        }
        let distinct: HashSet<&str> = order.iter().map(String::as_str).collect();
        if distinct.len() != order.len() {
            return Err(Error::ConfigInvalid(
                "stopOrder repeats a process name".to_string(),
            ));
        }
    }

    Ok(())
}

/// Full configuration validation.
pub fn validate_config(config: &crate::config::Config) -> Result<()> {
    validate_group(&config.group)?;

    if let Some(test) = &config.config_test {
        if test.command.command.is_empty() {
            return Err(Error::ConfigInvalid(
                "configTest has an empty command".to_string(),
            ));
        }
    }

    Ok(())
}
