//! Blocking HTTP transport for the classification API.
//!
//! A fixed pool of worker threads pulls requests from one listening socket.
//! Each worker reads the body, hands it to `handler::route`, and writes the
//! JSON reply. All responses carry permissive CORS headers so browser
//! dashboards on other origins can call the API directly.

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::handler::{ClassifierService, HttpReply, route};
use crate::logging::{self, Component};

/// Largest request body accepted. A `/classify` body is a few dozen bytes.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A bound, not yet running, HTTP server.
pub struct HttpServer {
    server: Arc<Server>,
}

impl HttpServer {
    /// Binds the listening socket. Port 0 picks a free port.
    pub fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let server = Server::http(addr)?;
        Ok(Self {
            server: Arc::new(server),
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests on `workers` threads until the socket fails.
    pub fn run(self, workers: usize, service: Arc<ClassifierService>) {
        let handles: Vec<_> = (0..workers.max(1))
            .map(|worker| {
                let server = Arc::clone(&self.server);
                let service = Arc::clone(&service);
                thread::spawn(move || worker_loop(worker, &server, &service))
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                logging::error(Component::Http, None, "worker thread panicked");
            }
        }
    }
}

fn worker_loop(worker: usize, server: &Server, service: &ClassifierService) {
    loop {
        match server.recv() {
            Ok(request) => handle_request(service, request),
            Err(e) => {
                logging::error(
                    Component::Http,
                    Some(&format!("worker {}", worker)),
                    &format!("accept failed, stopping: {}", e),
                );
                return;
            }
        }
    }
}

fn handle_request(service: &ClassifierService, mut request: Request) {
    let method = request.method().to_string();
    let url = request.url().to_string();

    let reply = match read_body(request.as_reader()) {
        Ok(body) => route(service, &method, &url, &body),
        Err(reply) => reply,
    };

    logging::info(
        Component::Http,
        None,
        &format!("{} {} -> {}", method, url, reply.status),
    );

    if let Err(e) = request.respond(build_response(&reply)) {
        logging::warn(Component::Http, Some(&url), &format!("failed to send response: {}", e));
    }
}

/// Reads at most [`MAX_BODY_BYTES`]; anything longer is rejected with 413.
fn read_body<R: Read>(reader: R) -> Result<String, HttpReply> {
    let mut body = String::new();
    reader
        .take(MAX_BODY_BYTES + 1)
        .read_to_string(&mut body)
        .map_err(|e| HttpReply::error(400, &format!("Invalid input values: body: {}", e)))?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(HttpReply::error(413, "Request body too large"));
    }
    Ok(body)
}

fn build_response(reply: &HttpReply) -> Response<std::io::Cursor<Vec<u8>>> {
    let bytes = match &reply.body {
        Some(value) => serde_json::to_vec(value).unwrap_or_default(),
        None => Vec::new(),
    };

    let mut response = Response::from_data(bytes).with_status_code(StatusCode(reply.status));
    if reply.body.is_some() {
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            response = response.with_header(header);
        }
    }
    for (name, value) in CORS_HEADERS {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            response = response.with_header(header);
        }
    }
    response
}
