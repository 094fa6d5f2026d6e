//! HTTP front end for cartrack.
//!
//! Serves the JSON API under `/api` and the browser client from the public
//! directory. Requests are handled one at a time on the accept loop; every
//! API call is a single engine operation, so each request reloads the tables
//! it touches.
//!
//! The [`TestServer`] helper starts a server on a random port for integration testing.

pub mod api;
pub mod assets;
pub mod banner;
pub mod config;

pub use assets::Assets;
pub use config::{ConfigError, ServerConfig};

use cartrack_core::{CoreError, Engine};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] CoreError),
}

const API_ROUTES: &[&str] = &[
    "/api/login",
    "/api/vehicles",
    "/api/cartons",
    "/api/cartons/batch",
    "/api/assign",
    "/api/pickup",
    "/api/deliver",
    "/api/health",
];

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A response ready to send.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, value: &impl Serialize) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec()),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }

    fn error(status: u16, msg: &str) -> Self {
        Self::json(status, &json!({ "error": msg }))
    }
}

/// Everything a request handler needs: the engine and the static files.
pub struct Service {
    engine: Engine,
    assets: Assets,
}

impl Service {
    pub fn new(engine: Engine, assets: Assets) -> Self {
        Self { engine, assets }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Engine::new(config.store.clone()),
            Assets::new(&config.public_dir),
        )
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Route one request. `path` excludes the query string.
    pub fn dispatch(&self, method: &Method, path: &str, body: &[u8]) -> Reply {
        let engine = &self.engine;
        let result = match (method, path) {
            (Method::Post, "/api/login") => api::login(engine, body),
            (Method::Get, "/api/vehicles") => Ok(api::list_vehicles(engine)),
            (Method::Post, "/api/vehicles") => api::register_vehicle(engine, body),
            (Method::Get, "/api/cartons") => Ok(api::list_cartons(engine)),
            (Method::Post, "/api/cartons") => api::register_carton(engine, body),
            (Method::Post, "/api/cartons/batch") => api::register_batch(engine, body),
            (Method::Post, "/api/assign") => api::assign(engine, body),
            (Method::Post, "/api/pickup") => api::pickup(engine, body),
            (Method::Post, "/api/deliver") => api::deliver(engine, body),
            (Method::Get, "/api/health") => Ok(api::health(engine)),
            (Method::Options, _) => Ok(Reply::empty(204)),
            (_, p) if API_ROUTES.contains(&p) => Ok(Reply::error(405, "method not allowed")),
            (_, p) if p == "/api" || p.starts_with("/api/") => Ok(Reply::error(404, "not found")),
            (Method::Get | Method::Head, p) => Ok(self.asset(p)),
            _ => Ok(Reply::error(405, "method not allowed")),
        };
        result.unwrap_or_else(|e| api::error_reply(&e))
    }

    fn asset(&self, path: &str) -> Reply {
        match self.assets.load(path) {
            Some((body, content_type)) => Reply {
                status: 200,
                content_type,
                body,
            },
            None => Reply::error(404, "not found"),
        }
    }
}

fn read_body(req: &mut tiny_http::Request) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    if req.as_reader().read_to_end(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

fn respond(req: tiny_http::Request, reply: Reply) {
    let mut response =
        Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    let headers = std::iter::once(("Content-Type", reply.content_type)).chain(CORS_HEADERS);
    for (name, value) in headers {
        if let Ok(header) = Header::from_bytes(name, value) {
            response.add_header(header);
        }
    }
    if let Err(e) = req.respond(response) {
        debug!("failed to send response: {e}");
    }
}

/// Handle a single HTTP request and log it with its status and latency.
pub fn handle_request(service: &Service, mut req: tiny_http::Request) {
    let started = Instant::now();
    let method = req.method().clone();
    let url = req.url().to_owned();
    let path = url.split_once('?').map_or(url.as_str(), |(p, _)| p);

    let reply = match read_body(&mut req) {
        Some(body) => service.dispatch(&method, path, &body),
        None => Reply::error(400, "failed to read request body"),
    };
    let status = reply.status;
    respond(req, reply);
    info!("{method} {url} {status} {:.1?}", started.elapsed());
}

pub fn bind(addr: &str) -> Result<Server, ServerError> {
    Server::http(addr).map_err(|source| ServerError::Bind {
        addr: addr.to_owned(),
        source,
    })
}

/// Serve requests until the server is unblocked.
pub fn run_server(service: &Service, server: &Server) {
    for request in server.incoming_requests() {
        handle_request(service, request);
    }
    info!("server stopped");
}

/// A test helper that starts a cartrack server on a random port in a background thread.
///
/// Tables are bootstrapped in `data_dir` before the first request. Dropping
/// the `TestServer` stops the accept loop.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    pub config: ServerConfig,
    server: Arc<Server>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl TestServer {
    pub fn start(data_dir: PathBuf, public_dir: PathBuf) -> Result<Self, ServerError> {
        let config = ServerConfig {
            bind: "127.0.0.1".to_owned(),
            port: 0,
            public_dir,
            store: cartrack_store::StoreConfig::new(data_dir),
            ..ServerConfig::default()
        };
        let service = Service::from_config(&config);
        service.engine().bootstrap()?;

        let server = Arc::new(bind(&config.listen_addr())?);
        let port = server.server_addr().to_ip().map_or(0, |a| a.port());
        let url = format!("http://127.0.0.1:{port}");

        let srv = Arc::clone(&server);
        let handle = std::thread::spawn(move || run_server(&service, &srv));

        Ok(Self {
            url,
            port,
            config,
            server,
            handle: Some(handle),
        })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartrack_store::StoreConfig;
    use serde_json::Value;

    fn service() -> (tempfile::TempDir, Service) {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir(&public).unwrap();
        std::fs::write(public.join("index.html"), "<html></html>").unwrap();
        let service = Service::new(
            Engine::new(StoreConfig::new(dir.path().join("data"))),
            Assets::new(public),
        );
        service.engine().bootstrap().unwrap();
        (dir, service)
    }

    fn json_of(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn login_with_numeric_pin() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Post, "/api/login", br#"{"pin": 1234}"#);
        assert_eq!(reply.status, 200);
        assert_eq!(json_of(&reply)["success"], true);

        let reply = svc.dispatch(&Method::Post, "/api/login", br#"{"pin": "9999"}"#);
        assert_eq!(reply.status, 401);
    }

    #[test]
    fn login_without_pin_is_bad_request() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Post, "/api/login", b"");
        assert_eq!(reply.status, 400);
        assert_eq!(json_of(&reply)["error"], "PIN is required");
    }

    #[test]
    fn register_carton_rejects_unknown_status() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(
            &Method::Post,
            "/api/cartons",
            br#"{"id": "A", "status": "lost"}"#,
        );
        assert_eq!(reply.status, 400);
        assert!(svc.engine().cartons().list().is_empty());
    }

    #[test]
    fn wrong_method_on_api_route() {
        let (_dir, svc) = service();
        assert_eq!(svc.dispatch(&Method::Get, "/api/assign", b"").status, 405);
        assert_eq!(svc.dispatch(&Method::Delete, "/api/cartons", b"").status, 405);
    }

    #[test]
    fn unknown_api_route_is_not_found() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Get, "/api/trucks", b"");
        assert_eq!(reply.status, 404);
        assert_eq!(reply.content_type, "application/json");
    }

    #[test]
    fn preflight_is_accepted() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Options, "/api/cartons", b"");
        assert_eq!(reply.status, 204);
        assert!(reply.body.is_empty());
    }

    #[test]
    fn client_routes_serve_index() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Get, "/scan", b"");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"<html></html>");
    }

    #[test]
    fn climbing_paths_are_not_served() {
        let (_dir, svc) = service();
        let reply = svc.dispatch(&Method::Get, "/../data/settings.csv", b"");
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn rejected_requests_are_bad_request_unless_carton_missing() {
        let (_dir, svc) = service();
        let post = |path: &str, body: &str| svc.dispatch(&Method::Post, path, body.as_bytes());

        assert_eq!(post("/api/cartons", r#"{"id": "A"}"#).status, 201);
        assert_eq!(post("/api/cartons", r#"{"id": "A"}"#).status, 400);
        assert_eq!(
            post("/api/vehicles", r#"{"id": "TRUCK-001", "name": "Van"}"#).status,
            400
        );
        assert_eq!(
            post("/api/assign", r#"{"cartonIds": ["A"], "vehicleId": "TRUCK-009"}"#).status,
            400
        );
        assert_eq!(
            post("/api/assign", r#"{"cartonIds": ["A"], "vehicleId": "TRUCK-001"}"#).status,
            200
        );
        let wrong = post("/api/pickup", r#"{"cartonId": "A", "vehicleId": "TRUCK-002"}"#);
        assert_eq!(wrong.status, 400);
        assert_eq!(json_of(&wrong)["assignedTo"], "TRUCK-001");

        assert_eq!(post("/api/pickup", r#"{"cartonId": "B"}"#).status, 404);
        assert_eq!(post("/api/deliver", r#"{"cartonId": "B"}"#).status, 404);
    }

    #[test]
    fn batch_metadata_uses_first_entry_per_id() {
        let (_dir, svc) = service();
        let body = br#"{
            "cartons": ["A"],
            "cartonsData": [
                {"id": "A", "additionalData": {"v": 1}},
                {"id": "A", "additionalData": {"v": 2}}
            ]
        }"#;
        let reply = svc.dispatch(&Method::Post, "/api/cartons/batch", body);
        assert_eq!(reply.status, 201);

        let carton = svc.engine().cartons().get("A").unwrap();
        assert_eq!(carton.additional_data.value(), Some(json!({"v": 1})));
    }
}
