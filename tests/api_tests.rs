use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::Value;
use stack_control::api;
use stack_control::config::Config;
use stack_control::ControlPlane;
use std::io::Write;

/// A single-process group whose match pattern can never find a live
/// process and whose control commands are no-ops, with zero settle
/// delays so operations return immediately.
fn ghost_config(extra: &str) -> Config {
    let config_str = format!(
        r#"{{
            "service": "test-control",
            "processes": [
                {{
                    "name": "web",
                    "match": {{ "cmdline": "no-such-process-marker-8ac41b" }},
                    "commands": {{
                        "start": {{ "command": "true" }},
                        "stop": {{ "command": "true" }},
                        "restart": {{ "command": "true" }}
                    }}
                }}
            ],
            "settle": {{ "startMs": 0, "stopMs": 0, "restartMs": 0, "reloadMs": 0, "gracefulStopMs": 0 }}
            {}
        }}"#,
        extra
    );
    Config::parse_from_str(&config_str).unwrap()
}

fn plane(config: Config) -> Data<ControlPlane> {
    Data::new(ControlPlane::new(config))
}

macro_rules! init_app {
    ($plane:expr) => {
        test::init_service(
            App::new()
                .app_data($plane.clone())
                .configure(api::routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_service_and_liveness() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "test-control");
    assert_eq!(body["web_running"], false);
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_status_before_any_action() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::get().uri("/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["web_status"], "stopped");
    assert_eq!(body["web_pid"], Value::Null);
    assert_eq!(body["group_state"], "stopped");
    assert_eq!(body["last_action"], Value::Null);
    assert_eq!(body["last_action_time"], Value::Null);
}

#[actix_web::test]
async fn test_start_server_reports_error_when_process_never_appears() {
    let plane = plane(ghost_config(""));
    let app = init_app!(plane);

    let req = test::TestRequest::post().uri("/start_server").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // The start command exits zero, but the recheck still finds no live
    // process, so the exit code must not be trusted.
    assert_eq!(body["status"], "partial");
    assert_eq!(body["web_running"], false);
    assert_eq!(body["is_running"], false);
    assert_eq!(body["results"]["web"]["status"], "error");

    // The failed start is now the last recorded action.
    let req = test::TestRequest::get().uri("/status").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["last_action"], "start_server");
    assert!(status["last_action_time"].is_string());
}

#[actix_web::test]
async fn test_stop_server_when_already_stopped() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::post().uri("/stop_server").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "already_stopped");
    assert_eq!(body["results"]["web"]["status"], "not_running");
    assert_eq!(body["is_running"], false);
}

#[actix_web::test]
async fn test_get_server_logs_tails_configured_files() {
    let mut error_log = tempfile::NamedTempFile::new().unwrap();
    for i in 1..=5 {
        writeln!(error_log, "error line {}", i).unwrap();
    }

    let extra = format!(
        r#", "logs": {{ "error": "{}" }}"#,
        error_log.path().display()
    );
    let app = init_app!(plane(ghost_config(&extra)));

    let req = test::TestRequest::get()
        .uri("/get-server-logs?type=all&lines=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["lines"], 2);
    assert_eq!(body["logs"]["error"], "error line 4\nerror line 5");
    // No access log is configured.
    assert_eq!(body["logs"]["access"], "Access log not found");
}

#[actix_web::test]
async fn test_get_server_logs_falls_back_on_bad_lines_param() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::get()
        .uri("/get-server-logs?lines=bogus")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["lines"], 100);
    assert_eq!(body["logs"]["error"], "Error log not found");
}

#[actix_web::test]
async fn test_get_server_logs_rejects_unknown_type() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::get()
        .uri("/get-server-logs?type=syslog")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_config_test_valid() {
    let extra = r#", "configTest": { "command": { "command": "true" } }"#;
    let app = init_app!(plane(ghost_config(extra)));

    let req = test::TestRequest::get().uri("/config-test").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["config_valid"], true);
    assert_eq!(body["status"], "success");
    assert_eq!(body["returncode"], 0);
}

#[actix_web::test]
async fn test_config_test_invalid() {
    let extra = r#", "configTest": { "command": { "command": "false" } }"#;
    let app = init_app!(plane(ghost_config(extra)));

    let req = test::TestRequest::get().uri("/config-test").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["config_valid"], false);
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn test_config_test_success_pattern_overrides_exit_code() {
    let extra = r#", "configTest": {
        "command": { "command": "sh", "args": ["-c", "echo 'Syntax OK' >&2; exit 1"] },
        "successPattern": "Syntax OK"
    }"#;
    let app = init_app!(plane(ghost_config(extra)));

    let req = test::TestRequest::get().uri("/config-test").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["config_valid"], true);
    assert!(body["output"].as_str().unwrap().contains("Syntax OK"));
}

#[actix_web::test]
async fn test_config_test_unconfigured_is_not_implemented() {
    let app = init_app!(plane(ghost_config("")));

    let req = test::TestRequest::get().uri("/config-test").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 501);
}
