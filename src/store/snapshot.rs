use std::collections::HashMap;

use serde::Serialize;

use crate::models::{FormSummary, PaymentDetail, Review, Submission, SubmissionEntry, TeamMember};

/// Everything fetched by the last refresh, as of one point in time.
///
/// Published as `Arc<Snapshot>` and never mutated once published; the store
/// builds a new one for every change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Newest first, by submission date string
    pub submissions: Vec<Submission>,
    /// Entries keyed by submission id
    pub submission_entries: HashMap<String, Vec<SubmissionEntry>>,
    pub forms: Vec<FormSummary>,
    pub reviews: Vec<Review>,
    pub team_members: Vec<TeamMember>,
    pub payment_details: Vec<PaymentDetail>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn submissions_for_organization(&self, organization: &str) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.public_org_name.as_deref() == Some(organization))
            .collect()
    }

    pub fn submission(&self, submission_id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id() == submission_id)
    }

    pub fn entries_for(&self, submission_id: &str) -> &[SubmissionEntry] {
        self.submission_entries
            .get(submission_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Payment entries whose embedded submission id matches.
    pub fn payments_for(&self, submission_id: &str) -> Vec<&PaymentDetail> {
        self.payment_details
            .iter()
            .filter(|p| p.entry.submission_id.as_deref() == Some(submission_id))
            .collect()
    }
}
