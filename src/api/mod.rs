//! Control API for stack-control, built on Actix Web.
//!
//! This module exposes the lifecycle and status surface of the control
//! plane over HTTP with JSON payloads:
//!
//! - `GET /health` and `GET /status` for liveness and status queries
//! - `POST /start_server`, `/stop_server`, `/restart`,
//!   `/graceful-restart`, `/graceful-stop` for orchestrated operations
//! - `GET /get-server-logs` and `GET /config-test` for the log-tail and
//!   configuration self-check collaborators
//!
//! The HTTP layer is deliberately thin: handlers translate between the
//! wire shapes and the control plane, which owns all sequencing and
//! state.

pub mod actix_error;
pub mod handlers;
pub mod logs;

pub use actix_error::ApiError;

use crate::ControlPlane;
use crate::config::DEFAULT_WORKERS;
use crate::error::{Error, Result};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use std::net::ToSocketAddrs;

/// Register every control API route.
///
/// Split out from [`serve`] so endpoint tests can mount the same routes
/// on an in-memory service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/status", web::get().to(handlers::status))
        .route("/start_server", web::post().to(handlers::start_server))
        .route("/stop_server", web::post().to(handlers::stop_server))
        .route("/restart", web::post().to(handlers::restart))
        .route("/graceful-restart", web::post().to(handlers::graceful_restart))
        .route("/graceful-stop", web::post().to(handlers::graceful_stop))
        .route("/get-server-logs", web::get().to(handlers::get_server_logs))
        .route("/config-test", web::get().to(handlers::config_test));
}

/// Run the control API until the hosting process is asked to stop.
///
/// Binds the configured address, applies permissive CORS and request
/// logging, and serves with the configured worker count.
pub async fn serve(plane: web::Data<ControlPlane>) -> Result<()> {
    let api_config = plane.config().api.clone();

    let addr_str = format!("{}:{}", api_config.address, api_config.port);
    let addr = match addr_str.to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                return Err(Error::ApiServer(format!(
                    "Could not parse socket address: {}",
                    addr_str
                )));
            }
        },
        Err(e) => {
            return Err(Error::ApiServer(format!(
                "Failed to parse socket address: {}",
                e
            )));
        }
    };

    let workers = api_config.workers.unwrap_or(DEFAULT_WORKERS);
    tracing::info!(address = %addr_str, workers = workers, "Starting control API");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(plane.clone())
            .configure(routes)
    })
    .workers(workers)
    .bind(addr)
    .map_err(|e| Error::ApiServer(format!("Failed to bind {}: {}", addr_str, e)))?
    .run()
    .await
    .map_err(|e| Error::ApiServer(format!("Control API terminated: {}", e)))
}
