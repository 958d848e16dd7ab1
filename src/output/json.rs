use serde::Serialize;

use crate::api::ApiError;
use crate::models::{PaymentDetail, Submission, SubmissionEntry};
use crate::store::Snapshot;

/// Serialize any serializable value to pretty JSON string.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Counts reported by `subsync sync`.
#[derive(Debug, Serialize, PartialEq)]
pub struct SyncSummary {
    pub submissions: usize,
    pub submissions_with_entries: usize,
    pub entries: usize,
    pub forms: usize,
    pub reviews: usize,
    pub team_members: usize,
    pub payment_details: usize,
    pub elapsed_ms: u128,
    /// Set when the sync stopped early; the counts are what was loaded by then
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SyncError>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SyncError {
    pub code: Option<i32>,
    pub message: String,
}

impl From<&ApiError> for SyncError {
    fn from(err: &ApiError) -> Self {
        SyncError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl SyncSummary {
    pub fn from_snapshot(snapshot: &Snapshot, elapsed_ms: u128) -> Self {
        SyncSummary {
            submissions: snapshot.submissions.len(),
            submissions_with_entries: snapshot.submission_entries.len(),
            entries: snapshot.submission_entries.values().map(Vec::len).sum(),
            forms: snapshot.forms.len(),
            reviews: snapshot.reviews.len(),
            team_members: snapshot.team_members.len(),
            payment_details: snapshot.payment_details.len(),
            elapsed_ms,
            error: None,
        }
    }

    pub fn with_error(mut self, error: Option<&ApiError>) -> Self {
        self.error = error.map(SyncError::from);
        self
    }
}

/// A submission together with what was loaded for it.
#[derive(Debug, Serialize)]
pub struct SubmissionDetailJson<'a> {
    pub submission: &'a Submission,
    pub entries: &'a [SubmissionEntry],
    pub payments: &'a [PaymentDetail],
}
