//! Mock CapBank API server for testing
//!
//! A tiny blocking HTTP server on a random local port that answers the
//! endpoints the client uses, with canned data:
//! - POST /api/user/validate accepts password "secret"
//! - POST /api/user/register, /accounts/send-verification, /accounts/verify-code
//! - GET /api/bankaccount/userId/user-1 and /api/bankaccount/number/{n}
//! - POST /api/transaction/{deposit,withdrawal,transfer}
//! - GET /api/transaction/account/{id} and /api/transaction-history/account/{id}
//!
//! Every request is recorded so tests can assert on headers and bodies.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value as JsonValue};

/// Token the mock hands out and accepts
pub const MOCK_TOKEN: &str = "token-123";

/// Verification code the mock accepts
pub const MOCK_VERIFICATION_CODE: &str = "123456";

#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Balance of the logged-in user's account
    pub balance: f64,
    /// Number of statement lines for the history endpoint
    pub history_records: usize,
    /// Answer 401 to every authenticated call
    pub reject_tokens: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            balance: 1500.0,
            history_records: 12,
            reject_tokens: false,
        }
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct MockBankServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBankServer {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBankServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers, then as much body as Content-Length announces
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((head, body))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, log: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_nonblocking(false);

    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    }

    let method = parts[0].to_string();
    let target = parts[1];
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let authorization = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.trim().to_string());

    if let Ok(mut requests) = log.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.to_string(),
            authorization: authorization.clone(),
            body: body.clone(),
        });
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let payload: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);

    let public = matches!(
        segments.as_slice(),
        ["api", "user", "validate"] | ["api", "user", "register"] | ["accounts", _]
    );
    if !public {
        let expected = format!("Bearer {}", MOCK_TOKEN);
        if config.reject_tokens || authorization.as_deref() != Some(expected.as_str()) {
            send_response(
                &mut stream,
                401,
                "Unauthorized",
                r#"{"error": {"message": "Token expired"}}"#,
            );
            return;
        }
    }

    let (status, json) = route(&method, &segments, query, &payload, config);
    let text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        _ => "Error",
    };
    send_response(&mut stream, status, text, &json.to_string());
}

fn route(
    method: &str,
    segments: &[&str],
    query: &str,
    payload: &JsonValue,
    config: &MockConfig,
) -> (u16, JsonValue) {
    match (method, segments) {
        ("POST", ["api", "user", "validate"]) => {
            if payload["password"] == "secret" {
                (
                    200,
                    json!({
                        "user": {"id": "user-1", "fullName": "Maria Silva"},
                        "token": {"accessToken": MOCK_TOKEN, "expiresIn": 3600}
                    }),
                )
            } else {
                (401, json!({"error": {"message": "Invalid credentials"}}))
            }
        }
        ("POST", ["api", "user", "register"]) => {
            if payload["email"] == "taken@capbank.com" {
                (409, json!({"message": "Email already registered"}))
            } else {
                (201, json!({"userId": "user-2", "status": "PENDING"}))
            }
        }
        ("POST", ["accounts", "send-verification"]) => (200, json!({"sent": true})),
        ("POST", ["accounts", "verify-code"]) => {
            if payload["code"] == MOCK_VERIFICATION_CODE {
                (200, json!({"verified": true}))
            } else {
                (400, json!({"error": "Invalid verification code"}))
            }
        }
        ("GET", ["api", "bankaccount", "userId", "user-1"]) => {
            (200, account_json("acc-1", "12345-678", config.balance))
        }
        ("GET", ["api", "bankaccount", "number", "12345-678"]) => {
            (200, account_json("acc-1", "12345-678", config.balance))
        }
        ("GET", ["api", "bankaccount", "number", "98765-432"]) => {
            (200, account_json("acc-2", "98765-432", 300.0))
        }
        ("GET", ["api", "bankaccount", ..]) => (404, json!({"message": "Account not found"})),
        ("POST", ["api", "transaction", kind]) => {
            let amount = payload["amount"].as_f64().unwrap_or(0.0);
            if amount <= 0.0 {
                return (400, json!({"error": {"message": "Amount must be positive"}}));
            }
            if *kind != "deposit" && amount > config.balance {
                return (422, json!({"error": {"message": "Insufficient funds"}}));
            }
            let transaction_type = match *kind {
                "deposit" => "DEPOSIT",
                "withdrawal" => "WITHDRAWAL",
                _ => "TRANSFER",
            };
            (
                201,
                json!({
                    "transaction": {
                        "id": "txn-1",
                        "source_account_id": payload.get("source_account_id"),
                        "target_account_id": payload.get("target_account_id"),
                        "transaction_type": transaction_type,
                        "amount": amount,
                        "description": payload.get("description"),
                        "status": "COMPLETED",
                        "transaction_date": "2025-10-27T18:05:45"
                    },
                    "message": "Transaction completed",
                    "notification_sent": true
                }),
            )
        }
        ("GET", ["api", "transaction", "account", account_id]) => {
            let content: Vec<JsonValue> = (0..3)
                .map(|i| {
                    json!({
                        "id": format!("txn-{}", i),
                        "source_account_id": account_id,
                        "target_account_id": "acc-2",
                        "transaction_type": "TRANSFER",
                        "amount": 10.0 * (i + 1) as f64,
                        "status": "COMPLETED",
                        "transaction_date": "2025-10-20T12:00:00"
                    })
                })
                .collect();
            (200, page_json(content, 0, 20, 3))
        }
        ("GET", ["api", "transaction-history", "account", account_id]) => {
            let page = query_param(query, "page").unwrap_or(0);
            let size = query_param(query, "size").unwrap_or(20).clamp(1, 100);
            let all = history_json(account_id, config.history_records);
            let content: Vec<JsonValue> = all
                .into_iter()
                .skip(page * size)
                .take(size)
                .collect();
            (200, page_json(content, page, size, config.history_records))
        }
        _ => (404, json!({"error": "Endpoint not found"})),
    }
}

fn query_param(query: &str, name: &str) -> Option<usize> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}

fn account_json(id: &str, number: &str, balance: f64) -> JsonValue {
    json!({
        "id": id,
        "accountNumber": number,
        "agency": "0001",
        "balance": balance,
        "accountType": "CHECKING",
        "status": "ACTIVE",
        "userId": "user-1",
        "createdAt": "2025-01-15T10:00:00"
    })
}

fn page_json(content: Vec<JsonValue>, page: usize, size: usize, total: usize) -> JsonValue {
    let total_pages = total.div_ceil(size.max(1));
    json!({
        "content": content,
        "page_number": page,
        "page_size": size,
        "total_elements": total,
        "total_pages": total_pages,
        "first": page == 0,
        "last": page + 1 >= total_pages
    })
}

/// One statement line per day going back from 2025-10-25, newest first
fn history_json(account_id: &str, count: usize) -> Vec<JsonValue> {
    let start = NaiveDate::from_ymd_opt(2025, 10, 25)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap_or_default();
    let mut balance = 5000.0;

    (0..count)
        .map(|i| {
            let (kind, description) = match i % 3 {
                0 => ("DEPOSIT", "Salary"),
                1 => ("WITHDRAWAL", "Compra Cartão Mercado"),
                _ => ("TRANSFER", "Rent"),
            };
            let amount = 10.0 * (i + 1) as f64;
            let before = balance;
            balance -= amount;
            json!({
                "id": format!("h-{}", i),
                "account_id": account_id,
                "transaction_id": format!("txn-{}", i),
                "balance_before": before,
                "balance_after": balance,
                "transaction_amount": amount,
                "transaction_type": kind,
                "status": "COMPLETED",
                "description": description,
                "record_date": (start - Duration::days(i as i64))
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string()
            })
        })
        .collect()
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockBankServer::start(MockConfig::default()).unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_history_pages_cover_all_records() {
        let all = history_json("acc-1", 7);
        assert_eq!(all.len(), 7);
        assert_eq!(all[0]["record_date"], "2025-10-25T09:30:00");
        assert_eq!(all[1]["transaction_type"], "WITHDRAWAL");

        let page = page_json(all, 0, 5, 7);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["last"], false);
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("page=2&size=50", "size"), Some(50));
        assert_eq!(query_param("page=2", "size"), None);
    }
}
