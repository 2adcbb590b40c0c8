//! HTTP request handlers for the control API.
//!
//! Operation handlers dispatch into the control plane (which serializes
//! lifecycle operations per group) and render the per-process breakdown;
//! status handlers run fresh liveness probes without taking the
//! operation lock.

use crate::ControlPlane;
use crate::api::actix_error::ApiError;
use crate::api::logs;
use crate::orchestrator::{AggregateStatus, GroupState, LifecycleAction, OperationReport, OutcomeStatus};

use actix_web::{HttpResponse, Responder, web::Data, web::Query};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Default number of log lines returned by `/get-server-logs`.
const DEFAULT_LOG_LINES: usize = 100;

/// Health check endpoint.
///
/// Reports control-server liveness plus a fresh per-process running flag.
pub async fn health(plane: Data<ControlPlane>) -> impl Responder {
    let statuses = plane.probe_group();

    let mut body = Map::new();
    body.insert("status".to_string(), json!("healthy"));
    body.insert("service".to_string(), json!(plane.config().service));
    for (name, status) in &statuses {
        body.insert(format!("{}_running", name), json!(status.alive));
    }
    body.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

    HttpResponse::Ok().json(Value::Object(body))
}

/// Current status snapshot.
///
/// Per-process liveness is derived fresh; the last-action record comes
/// from the orchestrator's snapshot.
pub async fn status(plane: Data<ControlPlane>) -> impl Responder {
    let statuses = plane.probe_group();
    let snapshot = plane.state_snapshot();

    let mut body = Map::new();
    for (name, status) in &statuses {
        body.insert(format!("{}_status", name), json!(status.state_str()));
        body.insert(format!("{}_pid", name), json!(status.pid));
    }
    body.insert(
        "group_state".to_string(),
        json!(GroupState::derive(statuses.iter().map(|(_, s)| s)).as_str()),
    );
    body.insert("last_action".to_string(), json!(snapshot.last_action));
    body.insert(
        "last_action_time".to_string(),
        json!(snapshot.last_action_time.map(|t| t.to_rfc3339())),
    );
    body.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

    HttpResponse::Ok().json(Value::Object(body))
}

/// Orchestrated start of the whole group.
pub async fn start_server(plane: Data<ControlPlane>) -> impl Responder {
    run_operation(&plane, LifecycleAction::Start).await
}

/// Orchestrated stop of the whole group.
pub async fn stop_server(plane: Data<ControlPlane>) -> impl Responder {
    run_operation(&plane, LifecycleAction::Stop).await
}

/// Hard restart of the whole group.
pub async fn restart(plane: Data<ControlPlane>) -> impl Responder {
    run_operation(&plane, LifecycleAction::Restart).await
}

/// Graceful restart: reload running processes, boot dead ones.
pub async fn graceful_restart(plane: Data<ControlPlane>) -> impl Responder {
    run_operation(&plane, LifecycleAction::GracefulRestart).await
}

/// Orderly shutdown of the whole group.
pub async fn graceful_stop(plane: Data<ControlPlane>) -> impl Responder {
    run_operation(&plane, LifecycleAction::GracefulStop).await
}

async fn run_operation(plane: &ControlPlane, action: LifecycleAction) -> HttpResponse {
    let report = plane.dispatch(action).await;
    HttpResponse::Ok().json(render_operation(&report))
}

/// Render an operation report into the wire shape shared by every
/// lifecycle endpoint.
fn render_operation(report: &OperationReport) -> Value {
    let desired_alive = report.action.desired_alive();

    let status_str = match report.status {
        AggregateStatus::Success => "success",
        AggregateStatus::Partial => "partial",
        AggregateStatus::AlreadyInDesiredState => {
            if desired_alive {
                "already_running"
            } else {
                "already_stopped"
            }
        }
    };

    let message = report
        .statuses
        .iter()
        .map(|(name, status)| format!("{}: {}", name, status.state_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut results = Map::new();
    for outcome in &report.outcomes {
        let mut entry = Map::new();
        entry.insert(
            "status".to_string(),
            json!(outcome_str(outcome.status, desired_alive)),
        );
        entry.insert("pid".to_string(), json!(outcome.pid));
        if let Some(stdout) = &outcome.stdout {
            entry.insert("stdout".to_string(), json!(stdout));
        }
        if let Some(stderr) = &outcome.stderr {
            entry.insert("stderr".to_string(), json!(stderr));
        }
        results.insert(outcome.process.clone(), Value::Object(entry));
    }

    let mut body = Map::new();
    body.insert("status".to_string(), json!(status_str));
    body.insert("message".to_string(), json!(message));
    for (name, status) in &report.statuses {
        body.insert(format!("{}_running", name), json!(status.alive));
    }
    body.insert("results".to_string(), Value::Object(results));
    // All alive for start-directed operations, any alive for stop-directed.
    body.insert(
        "is_running".to_string(),
        json!(if desired_alive {
            report.all_alive()
        } else {
            report.any_alive()
        }),
    );
    body.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

    Value::Object(body)
}

fn outcome_str(status: OutcomeStatus, desired_alive: bool) -> &'static str {
    match status {
        OutcomeStatus::Success => "success",
        OutcomeStatus::Error => "error",
        OutcomeStatus::AlreadyInDesiredState => {
            if desired_alive {
                "already_running"
            } else {
                "not_running"
            }
        }
    }
}

/// Query parameters for `/get-server-logs`.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Which logs to return: `error`, `access`, or `all`.
    #[serde(rename = "type")]
    kind: Option<String>,
    /// How many lines to tail. Unparsable values fall back to the default.
    lines: Option<String>,
}

/// Tail the managed server's log files.
pub async fn get_server_logs(
    plane: Data<ControlPlane>,
    query: Query<LogQuery>,
) -> Result<HttpResponse, ApiError> {
    let kind = query.kind.as_deref().unwrap_or("error");
    if !matches!(kind, "error" | "access" | "all") {
        return Err(ApiError::InvalidRequest(format!(
            "unknown log type '{}'",
            kind
        )));
    }

    let lines = query
        .lines
        .as_deref()
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LOG_LINES);

    let paths = &plane.config().logs;
    let mut logs = Map::new();

    if matches!(kind, "error" | "all") {
        let content = match &paths.error {
            Some(path) => logs::tail_file(path, lines).await.map_err(ApiError::Internal)?,
            None => None,
        };
        logs.insert(
            "error".to_string(),
            json!(content.unwrap_or_else(|| "Error log not found".to_string())),
        );
    }

    if matches!(kind, "access" | "all") {
        let content = match &paths.access {
            Some(path) => logs::tail_file(path, lines).await.map_err(ApiError::Internal)?,
            None => None,
        };
        logs.insert(
            "access".to_string(),
            json!(content.unwrap_or_else(|| "Access log not found".to_string())),
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "logs": logs,
        "lines": lines,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Validate the managed server's static configuration via its own
/// self-check command.
pub async fn config_test(plane: Data<ControlPlane>) -> Result<HttpResponse, ApiError> {
    if plane.config().config_test.is_none() {
        return Err(ApiError::UnsupportedOperation(
            "no configuration self-check command configured".to_string(),
        ));
    }

    let report = plane.run_config_test().await.map_err(ApiError::Internal)?;

    let body = json!({
        "status": if report.valid { "success" } else { "error" },
        "message": "Configuration test completed",
        "output": report.output,
        "returncode": report.exit_code,
        "config_valid": report.valid,
    });

    let response = if report.valid {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    };

    Ok(response)
}
