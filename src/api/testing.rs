//! In-memory [`Transport`] for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use serde_json::{Value, json};

use super::client::{ApiError, Request, Response, Transport};

/// Serves queued responses per path and records every request it sees.
///
/// A path with nothing queued answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Response, ApiError>>>>,
    requests: Mutex<Vec<Request>>,
    gates: Mutex<HashMap<String, (Sender<()>, Receiver<()>)>>,
}

/// Handle for a request held at a gate.
pub struct Gate {
    /// Receives once the request has reached the transport
    pub entered: Receiver<()>,
    /// Send to let the request continue
    pub release: Sender<()>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, path: &str, response: Result<Response, ApiError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn push_ok(&self, path: &str, body: String) {
        self.push(path, Ok(Response { status: 200, body }));
    }

    pub fn push_status(&self, path: &str, status: u16, body: &str) {
        self.push(
            path,
            Ok(Response {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn push_err(&self, path: &str, err: ApiError) {
        self.push(path, Err(err));
    }

    /// Hold the next request to `path` until released.
    pub fn gate(&self, path: &str) -> Gate {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(path.to_string(), (entered_tx, release_rx));
        Gate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &Request) -> Result<Response, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gates.lock().unwrap().remove(&request.path);
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.recv();
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Ok(Response {
                    status: 404,
                    body: format!("no scripted response for {}", request.path),
                })
            })
    }
}

/// `{"continuationToken": token, "items": items}`
pub fn page_body(items: Value, token: Option<&str>) -> String {
    json!({ "continuationToken": token, "items": items }).to_string()
}
