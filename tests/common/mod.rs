#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;
use tempfile::TempDir;

/// A self-contained test environment with an isolated config directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        TestEnv {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment whose config file has the given contents.
    pub fn with_config(toml: &str) -> Self {
        let env = Self::new();
        let path = env.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, toml).unwrap();
        env
    }

    /// Where subsync will look for `config.toml` in this environment.
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("subsync").join("config.toml")
    }

    /// Get a Command configured to run subsync with this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = assert_cmd::cargo_bin_cmd!("subsync");
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"));
        cmd.env_remove("SUBMITTABLE_API_KEY");
        cmd.env_remove("SUBSYNC_LOG");
        // Ensure no color codes pollute test output
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Get a Command with --json flag.
    pub fn cmd_json(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--json");
        cmd
    }
}

/// Minimal HTTP server answering GETs with canned JSON bodies by path.
///
/// Paths without a route get a 404. Every request target (query included) is
/// recorded as sent, percent-encoding intact.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        Self::start_inner(routes, None)
    }

    /// Like [`start`](Self::start), but the response for `path` announces a
    /// longer body than it sends and then closes the connection.
    pub fn start_truncating(routes: &[(&str, u16, &str)], path: &str) -> Self {
        Self::start_inner(routes, Some(path.to_string()))
    }

    fn start_inner(routes: &[(&str, u16, &str)], truncated: Option<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let target = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
                let path = target.split('?').next().unwrap_or("/").to_string();
                seen.lock().unwrap().push(target);

                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, r#"{"message":"not found"}"#.to_string()));
                let announced = if truncated.as_deref() == Some(path.as_str()) {
                    body.len() + 64
                } else {
                    body.len()
                };
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    announced,
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        StubServer { base_url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Routes for a small account: two submissions, one payment form.
pub fn fixture_routes() -> Vec<(&'static str, u16, &'static str)> {
    vec![
        (
            "/v4/submissions",
            200,
            r#"{"items": [
                {"submissionId": "s-old", "submissionTitle": "Older Essay", "submissionDate": "2024-01-05T10:00:00Z",
                 "submitterFirstName": "Ada", "submitterLastName": "Lovelace", "publicOrgName": "Quarterly"},
                {"submissionId": "s-new", "submissionTitle": "Newer Poems", "submissionDate": "2024-03-01T10:00:00Z",
                 "submissionStatus": "in_progress", "publicOrgName": "Review Press"}
            ]}"#,
        ),
        (
            "/v4/entries/submissions/s-old",
            200,
            r#"{"formEntries": [
                {"formType": "initial_form", "entry": {"entryId": "e-1", "submissionId": "s-old",
                 "fieldData": [{"formFieldId": "wc", "fieldType": "word_count", "value": 1200}]}}
            ]}"#,
        ),
        ("/v4/entries/submissions/s-new", 200, r#"{"formEntries": []}"#),
        (
            "/v4/forms",
            200,
            r#"{"items": [
                {"formId": "f-gen", "name": "General", "formType": "general"},
                {"formId": "f-pay", "name": "Payouts", "formType": "payment_form"}
            ]}"#,
        ),
        (
            "/v4/entries/forms/f-pay",
            200,
            r#"{"items": [
                {"formType": "payment_form", "entry": {"entryId": "p-1", "submissionId": "s-old",
                 "fieldData": [{"fieldType": "bank_account", "routingNumber": "021000021", "accountNumber": "987654321"}]}}
            ]}"#,
        ),
        (
            "/v4/entries/forms/f-gen",
            200,
            r#"{"items": [{"formType": "general", "entry": {"entryId": "g-1"}}]}"#,
        ),
        (
            "/v4/reviews",
            200,
            r#"{"items": [{"reviewId": "r-1", "score": 4.5, "status": "completed"}]}"#,
        ),
        (
            "/v4/team-members",
            200,
            r#"{"items": [{"userId": "u-1", "firstName": "Grace", "lastName": "Hopper", "role": "admin"}]}"#,
        ),
    ]
}

/// Config pointing at `server` with a key already set.
pub fn config_for(server: &StubServer) -> String {
    format!("api_key = \"test-key\"\nbase_url = \"{}\"\n", server.base_url)
}
