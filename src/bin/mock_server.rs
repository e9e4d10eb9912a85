//! Mock API server binary for integration testing
//!
//! A minimal synchronous HTTP responder standing in for a real server under
//! test. Binds 127.0.0.1 on `MOCK_SERVER_PORT` (default 8080; 0 picks a free
//! port) and prints the bound address on startup so callers can find it.
//!
//! Endpoints:
//! - `GET /health` -> 200 with the active `DATABASE_NAME`
//! - `POST /transaction` -> 201 for a JSON object carrying `amount`,
//!   400 otherwise
//! - anything else -> 404

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

use serde_json::json;

fn main() {
    let port = std::env::var("MOCK_SERVER_PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(8080);
    let database = std::env::var("DATABASE_NAME").unwrap_or_else(|_| "test".to_string());

    let listener = match TcpListener::bind(("127.0.0.1", port)) {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("mock_server: failed to bind port {}: {}", port, error);
            std::process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(addr) => println!("listening on {}", addr),
        Err(error) => {
            eprintln!("mock_server: no local address: {}", error);
            std::process::exit(1);
        }
    }

    for stream in listener.incoming() {
        let Ok(stream) = stream else { continue };
        let database = database.clone();
        std::thread::spawn(move || handle_connection(stream, &database));
    }
}

struct Request {
    method: String,
    path: String,
    body: Vec<u8>,
}

fn handle_connection(stream: TcpStream, database: &str) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut writer = stream;

    while let Some(request) = read_request(&mut reader) {
        let (status, body) = respond(&request, database);
        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        if writer.write_all(reply.as_bytes()).is_err() {
            return;
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<Request> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).ok()? == 0 {
        return None;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).ok()?;
    }
    Some(Request { method, path, body })
}

fn respond(request: &Request, database: &str) -> (&'static str, String) {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/health") => (
            "200 OK",
            json!({ "ok": true, "database": database }).to_string(),
        ),
        ("POST", "/transaction") => {
            let parsed = serde_json::from_slice::<serde_json::Value>(&request.body).ok();
            let has_amount = parsed
                .as_ref()
                .and_then(|body| body.get("amount"))
                .is_some();
            if has_amount {
                ("201 Created", json!({ "accepted": true }).to_string())
            } else {
                ("400 Bad Request", json!({ "error": "invalid body" }).to_string())
            }
        }
        _ => ("404 Not Found", json!({ "error": "not found" }).to_string()),
    }
}
