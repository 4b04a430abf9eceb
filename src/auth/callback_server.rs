//! Single-shot loopback listener for the OAuth redirect.
//!
//! Accepts connections on `127.0.0.1:<port>` until one carries the
//! `/callback` request or the deadline passes.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::AuthError;

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"UTF-8\">\
<title>Signed in</title></head><body><h1>Signed in</h1>\
<p>entra-role-report is building your report. You can close this tab.</p></body></html>";

/// A bound listener waiting for the redirect.
pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    /// Bind the listener. Done before the browser opens so the redirect can't race it.
    pub fn bind(port: u16) -> Result<Self, AuthError> {
        let addr = format!("127.0.0.1:{}", port);
        let listener = TcpListener::bind(&addr)
            .map_err(|e| AuthError::CallbackServer(format!("bind {}: {}", addr, e)))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| AuthError::CallbackServer(e.to_string()))?;

        let port = listener
            .local_addr()
            .map_err(|e| AuthError::CallbackServer(e.to_string()))?
            .port();

        info!("OAuth callback listener on 127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Block until the redirect arrives and return the full callback URL.
    pub fn wait_for_callback(self, timeout: Duration) -> Result<String, AuthError> {
        let deadline = Instant::now() + timeout;

        loop {
            if Instant::now() >= deadline {
                return Err(AuthError::CallbackTimeout);
            }

            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("Connection from {}", peer);
                    if let Some(path) = handle_connection(stream) {
                        info!("OAuth callback received");
                        return Ok(format!("http://localhost:{}{}", self.port, path));
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => return Err(AuthError::CallbackServer(e.to_string())),
            }
        }
    }
}

/// Returns the request path when this was the OAuth callback.
fn handle_connection(mut stream: TcpStream) -> Option<String> {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut buffer = [0; 4096];
    let bytes_read = stream.read(&mut buffer).ok()?;
    let request = String::from_utf8_lossy(&buffer[..bytes_read]);

    let path = match callback_path(&request) {
        Ok(path) => path,
        Err((status, reason)) => {
            send_response(&mut stream, status, reason, "text/plain", reason);
            return None;
        }
    };

    if path.contains("error=") {
        let message = error_description(&path);
        send_response(&mut stream, 200, "OK", "text/plain; charset=utf-8", &message);
    } else {
        send_response(&mut stream, 200, "OK", "text/html; charset=utf-8", SUCCESS_PAGE);
    }

    Some(path)
}

/// Validate the request line and return the callback path.
fn callback_path(request: &str) -> Result<String, (u16, &'static str)> {
    let request_line = request.lines().next().ok_or((400, "Bad Request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or((400, "Bad Request"))?;
    let path = parts.next().ok_or((400, "Bad Request"))?;

    if method != "GET" {
        return Err((405, "Method Not Allowed"));
    }
    if !path.starts_with("/callback") {
        return Err((404, "Not Found"));
    }
    if !path.contains("code=") && !path.contains("error=") {
        return Err((400, "Missing authorization code"));
    }

    Ok(path.to_string())
}

fn error_description(path: &str) -> String {
    match path.find("error_description=") {
        Some(start) => {
            let start = start + "error_description=".len();
            let end = path[start..]
                .find('&')
                .map(|i| start + i)
                .unwrap_or(path.len());
            urlencoding::decode(&path[start..end])
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| "Authentication failed".to_string())
        }
        None => "Authentication was cancelled or failed.".to_string(),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, reason: &str, content_type: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    );

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
