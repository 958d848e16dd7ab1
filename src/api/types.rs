use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{FormSummary, Review, Submission, SubmissionEntry, TeamMember};

// ============================================================================
// Pages
// ============================================================================

/// One decoded page of a continuation-token list endpoint.
///
/// Lives only for the duration of a paginated fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Present iff the server says more pages remain
    pub continuation_token: Option<String>,
    pub items: Vec<T>,
}

/// A list response body that can be turned into a [`Page`].
///
/// Submittable wraps most lists in `items`, but the submission-entries
/// endpoint uses `formEntries`; each envelope below maps its own shape.
pub trait PageEnvelope: DeserializeOwned {
    type Item;

    fn into_page(self) -> Page<Self::Item>;
}

/// An empty token is treated the same as a missing one.
fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

// ============================================================================
// Envelopes
// ============================================================================

/// `{ "continuationToken": ..., "items": [...] }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse<T> {
    #[serde(default)]
    pub continuation_token: Option<String>,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T: DeserializeOwned> PageEnvelope for ItemsResponse<T> {
    type Item = T;

    fn into_page(self) -> Page<T> {
        Page {
            continuation_token: normalize_token(self.continuation_token),
            items: self.items,
        }
    }
}

/// `{ "continuationToken": ..., "formEntries": [...] }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEntriesResponse {
    #[serde(default)]
    pub continuation_token: Option<String>,
    #[serde(default)]
    pub form_entries: Vec<SubmissionEntry>,
}

impl PageEnvelope for FormEntriesResponse {
    type Item = SubmissionEntry;

    fn into_page(self) -> Page<SubmissionEntry> {
        Page {
            continuation_token: normalize_token(self.continuation_token),
            items: self.form_entries,
        }
    }
}

pub type SubmissionListResponse = ItemsResponse<Submission>;
pub type FormCatalogResponse = ItemsResponse<FormSummary>;
pub type PaymentDetailListResponse = ItemsResponse<SubmissionEntry>;
pub type ReviewListResponse = ItemsResponse<Review>;
pub type TeamMemberListResponse = ItemsResponse<TeamMember>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_response_with_token() {
        let json = r#"{
            "continuationToken": "abc",
            "items": [{"submissionId": "s-1"}, {"submissionId": "s-2"}]
        }"#;
        let page = serde_json::from_str::<SubmissionListResponse>(json)
            .unwrap()
            .into_page();
        assert_eq!(page.continuation_token.as_deref(), Some("abc"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].id(), "s-2");
    }

    #[test]
    fn test_items_response_missing_fields() {
        let page = serde_json::from_str::<ReviewListResponse>("{}")
            .unwrap()
            .into_page();
        assert!(page.continuation_token.is_none());
        assert!(page.items.is_empty());

        let page = serde_json::from_str::<TeamMemberListResponse>(
            r#"{"continuationToken": null, "items": [{"userId": "u1"}]}"#,
        )
        .unwrap()
        .into_page();
        assert!(page.continuation_token.is_none());
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_empty_token_means_no_more_pages() {
        let page = serde_json::from_str::<FormCatalogResponse>(r#"{"continuationToken": "", "items": []}"#)
            .unwrap()
            .into_page();
        assert!(page.continuation_token.is_none());
    }

    #[test]
    fn test_form_entries_response() {
        let json = r#"{
            "continuationToken": "next",
            "formEntries": [
                {"formType": "general", "entry": {"entryId": "e-1", "submissionId": "s-1"}}
            ]
        }"#;
        let page = serde_json::from_str::<FormEntriesResponse>(json)
            .unwrap()
            .into_page();
        assert_eq!(page.continuation_token.as_deref(), Some("next"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].entry.submission_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_form_entries_response_ignores_items_key() {
        // The submission-entries endpoint only reads formEntries
        let json = r#"{"items": [{"entry": {"entryId": "e-1"}}]}"#;
        let page = serde_json::from_str::<FormEntriesResponse>(json)
            .unwrap()
            .into_page();
        assert!(page.items.is_empty());
    }
}
