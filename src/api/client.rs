use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::auth::Credential;
use super::endpoint::Endpoint;
use super::paginate::fetch_all;
use super::types::{
    FormCatalogResponse, FormEntriesResponse, PaymentDetailListResponse, ReviewListResponse,
    SubmissionListResponse, TeamMemberListResponse,
};
use crate::models::{FormSummary, PaymentDetail, Review, Submission, SubmissionEntry, TeamMember};

pub const DEFAULT_BASE_URL: &str = "https://submittable-api.submittable.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Code reported for failures that never produced an HTTP status.
pub const TRANSPORT_FAILURE_CODE: i32 = -1;

/// Safely slice a string at UTF-8 character boundaries.
/// Returns a substring from `start` to `end` byte positions, adjusted to valid char boundaries.
fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = s.floor_char_boundary(start);
    let end = s.ceil_char_boundary(end.min(s.len()));
    &s[start..end]
}

/// Truncate a string for log output, appending "..." if truncated.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", safe_slice(s, 0, max_len))
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Add a Submittable API key to start syncing.")]
    MissingCredential,

    #[error("Server error ({code}): {message}")]
    Server { code: u16, message: String },

    #[error("Server error (-1): network error: {0}")]
    Network(String),

    #[error("Server error (-1): invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status for server errors, [`TRANSPORT_FAILURE_CODE`] for failures
    /// below HTTP, `None` when no request was attempted.
    pub fn code(&self) -> Option<i32> {
        match self {
            ApiError::MissingCredential => None,
            ApiError::Server { code, .. } => Some(i32::from(*code)),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => Some(TRANSPORT_FAILURE_CODE),
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// A fully built GET request, relative to the API origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: String,
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Sends one request and hands back whatever the server answered.
///
/// Status validation and decoding happen in [`ApiClient`], so implementations
/// only fail for errors below HTTP.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Request) -> Result<Response, ApiError>;
}

/// [`Transport`] over a blocking reqwest client.
pub struct HttpTransport {
    base_url: reqwest::Url,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {}", base_url, e))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { base_url, client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> Result<Response, ApiError> {
        let url = endpoint_url(&self.base_url, &request.path)?;
        debug!("GET {} (query: {:?})", url, request.query);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .query(&request.query)
            .header("Authorization", request.authorization.as_str())
            .header("Content-Type", "application/json")
            .send()
            .map_err(|e| {
                debug!("  network error after {:?}: {}", start.elapsed(), e);
                ApiError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        debug!("  response: {} in {:?}", status, start.elapsed());

        let body = match response.text() {
            Ok(body) => body,
            Err(e) if (200..=299).contains(&status) => {
                debug!("  failed to read body after {:?}: {}", start.elapsed(), e);
                return Err(ApiError::Network(format!("failed to read response body: {}", e)));
            }
            Err(e) => {
                debug!("  failed to read error body: {}", e);
                "Unknown error".to_string()
            }
        };
        Ok(Response { status, body })
    }
}

/// Append `path` to the base URL's own path, so a base such as
/// `https://proxy.example/submittable/` keeps its prefix.
fn endpoint_url(base: &reqwest::Url, path: &str) -> Result<reqwest::Url, ApiError> {
    let full_path = format!("{}{}", base.path().trim_end_matches('/'), path);
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.set_path(&full_path);

    // Dot segments are resolved by the URL parser, which would move the request
    if url.path() != full_path {
        return Err(ApiError::Network(format!("invalid request path {}", path)));
    }
    Ok(url)
}

// ============================================================================
// Client
// ============================================================================

/// Authenticated Submittable client.
///
/// Cheap to clone: clones share the transport and the credential.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credential: Credential,
    page_size: usize,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, credential: Credential) -> Self {
        Self {
            transport,
            credential,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// GET `path` and return the body of a 2xx response.
    pub fn request(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let authorization = self
            .credential
            .authorization()
            .ok_or(ApiError::MissingCredential)?;
        let request = Request {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            authorization,
        };

        let response = self.transport.execute(&request)?;
        if !(200..=299).contains(&response.status) {
            debug!(
                "  server error ({}): {}",
                response.status,
                truncate_for_log(&response.body, 500)
            );
            return Err(ApiError::Server {
                code: response.status,
                message: response.body,
            });
        }

        debug!("  response body: {} bytes", response.body.len());
        debug!("  response preview: {}", truncate_for_log(&response.body, 200));
        Ok(response.body)
    }

    /// GET `path` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.request(path, query)?;
        serde_json::from_str(&body).map_err(|e| {
            debug!("  deserialization error: {}", e);
            ApiError::InvalidResponse(describe_decode_error(&e, &body))
        })
    }

    // ========================================================================
    // Submission Methods
    // ========================================================================

    /// Fetch every submission visible to the API key
    pub fn get_submissions(&self) -> Result<Vec<Submission>, ApiError> {
        fetch_all::<SubmissionListResponse>(self, &Endpoint::Submissions, self.page_size)
    }

    /// Fetch the form entries attached to one submission
    pub fn get_submission_entries(
        &self,
        submission_id: &str,
    ) -> Result<Vec<SubmissionEntry>, ApiError> {
        let endpoint = Endpoint::SubmissionEntries {
            submission_id: submission_id.to_string(),
        };
        fetch_all::<FormEntriesResponse>(self, &endpoint, self.page_size)
    }

    // ========================================================================
    // Form Methods
    // ========================================================================

    /// Fetch the form catalog
    pub fn get_forms(&self) -> Result<Vec<FormSummary>, ApiError> {
        fetch_all::<FormCatalogResponse>(self, &Endpoint::Forms, self.page_size)
    }

    /// Fetch every entry submitted against one form (used for payment forms)
    pub fn get_form_entries(&self, form_id: &str) -> Result<Vec<PaymentDetail>, ApiError> {
        let endpoint = Endpoint::FormEntries {
            form_id: form_id.to_string(),
        };
        fetch_all::<PaymentDetailListResponse>(self, &endpoint, self.page_size)
    }

    // ========================================================================
    // Review and Team Methods
    // ========================================================================

    pub fn get_reviews(&self) -> Result<Vec<Review>, ApiError> {
        fetch_all::<ReviewListResponse>(self, &Endpoint::Reviews, self.page_size)
    }

    pub fn get_team_members(&self) -> Result<Vec<TeamMember>, ApiError> {
        fetch_all::<TeamMemberListResponse>(self, &Endpoint::TeamMembers, self.page_size)
    }
}

/// Serde error plus the slice of body around the column it points at.
fn describe_decode_error(err: &serde_json::Error, body: &str) -> String {
    let preview = |body: &str| {
        if body.len() > 500 {
            format!("Response body:\n{}...", safe_slice(body, 0, 500))
        } else {
            format!("Response body:\n{}", body)
        }
    };

    let col = err.column();
    let context = if col == 0 {
        preview(body)
    } else if col.saturating_sub(100) < body.len() {
        let start = col.saturating_sub(100);
        let end = col + 100;
        format!(
            "Context around column {} (chars {}-{}):\n...{}...",
            col,
            start,
            end,
            safe_slice(body, start, end)
        )
    } else {
        format!("Column {} is beyond body length {}", col, body.len())
    };

    format!("{}\n\n{}", err, context)
}
