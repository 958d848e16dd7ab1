//! Continuation-token pagination.
//!
//! Every Submittable list endpoint takes `size` and an optional
//! `continuationToken` and answers with the next token (if any) plus a batch.
//! [`fetch_all`] walks those pages and concatenates the batches in the order the
//! server delivered them.

use log::{debug, warn};

use super::client::{ApiClient, ApiError};
use super::endpoint::Endpoint;
use super::types::PageEnvelope;

/// Fetch every item behind `endpoint`.
///
/// Stops when the server sends no token, or when a page comes back shorter than
/// `page_size`. The short-page rule is a heuristic: a token on a short page is
/// ignored. A token repeated verbatim also ends the walk.
pub fn fetch_all<P: PageEnvelope>(
    client: &ApiClient,
    endpoint: &Endpoint,
    page_size: usize,
) -> Result<Vec<P::Item>, ApiError> {
    let page_size = page_size.max(1);
    let path = endpoint.path();
    let mut results = Vec::new();
    let mut continuation: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut query = vec![("size", page_size.to_string())];
        if let Some(token) = &continuation {
            query.push(("continuationToken", token.clone()));
        }

        let page = client.get_json::<P>(&path, &query)?.into_page();
        pages += 1;
        let batch_len = page.items.len();
        results.extend(page.items);
        debug!(
            "{} page {}: {} items (total {})",
            endpoint,
            pages,
            batch_len,
            results.len()
        );

        let Some(token) = page.continuation_token else {
            break;
        };
        if batch_len < page_size {
            debug!(
                "{}: short page ({} < {}) with a continuation token, treating as end of data",
                endpoint, batch_len, page_size
            );
            break;
        }
        if continuation.as_deref() == Some(token.as_str()) {
            warn!("{}: server repeated continuation token, stopping", endpoint);
            break;
        }
        continuation = Some(token);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::api::auth::Credential;
    use crate::api::testing::{ScriptedTransport, page_body};
    use crate::api::types::{FormEntriesResponse, SubmissionListResponse};
    use crate::models::Submission;

    fn submissions(ids: &[&str]) -> serde_json::Value {
        json!(ids.iter().map(|id| json!({"submissionId": id})).collect::<Vec<_>>())
    }

    fn ids(items: &[Submission]) -> Vec<&str> {
        items.iter().map(|s| s.id()).collect()
    }

    fn client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::new(transport.clone(), Credential::new("key"))
    }

    #[test]
    fn test_full_pages_then_short_final_page() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(submissions(&["a", "b"]), Some("t1")));
        transport.push_ok("/v4/submissions", page_body(submissions(&["c", "d"]), Some("t2")));
        transport.push_ok("/v4/submissions", page_body(submissions(&["e"]), None));

        let items =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 2)
                .unwrap();

        assert_eq!(ids(&items), vec!["a", "b", "c", "d", "e"]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].query, vec![("size".to_string(), "2".to_string())]);
        assert_eq!(
            requests[1].query,
            vec![
                ("size".to_string(), "2".to_string()),
                ("continuationToken".to_string(), "t1".to_string())
            ]
        );
        assert_eq!(requests[2].query[1].1, "t2");
    }

    #[test]
    fn test_no_token_means_single_request() {
        // Full page, but no token: done
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(submissions(&["a", "b"]), None));

        let items =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 2)
                .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(transport.request_count(), 1);

        // Empty first page, no token
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(json!([]), None));
        let items =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 200)
                .unwrap();
        assert!(items.is_empty());
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_short_page_with_token_stops() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(submissions(&["a"]), Some("more")));
        transport.push_ok("/v4/submissions", page_body(submissions(&["never"]), None));

        let items =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 2)
                .unwrap();
        assert_eq!(ids(&items), vec!["a"]);
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_repeated_token_stops() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(submissions(&["a"]), Some("same")));
        transport.push_ok("/v4/submissions", page_body(submissions(&["b"]), Some("same")));
        transport.push_ok("/v4/submissions", page_body(submissions(&["c"]), None));

        let items =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 1)
                .unwrap();
        assert_eq!(ids(&items), vec!["a", "b"]);
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_error_on_later_page_propagates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("/v4/submissions", page_body(submissions(&["a"]), Some("t1")));
        transport.push_status("/v4/submissions", 503, "unavailable");

        let err =
            fetch_all::<SubmissionListResponse>(&client(&transport), &Endpoint::Submissions, 1)
                .unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                code: 503,
                message: "unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_form_entries_shape() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            "/v4/entries/submissions/s-1",
            json!({
                "continuationToken": "t1",
                "formEntries": [{"entry": {"entryId": "e-1"}}]
            })
            .to_string(),
        );
        transport.push_ok(
            "/v4/entries/submissions/s-1",
            json!({"formEntries": [{"entry": {"entryId": "e-2"}}]}).to_string(),
        );

        let endpoint = Endpoint::SubmissionEntries {
            submission_id: "s-1".to_string(),
        };
        let entries = fetch_all::<FormEntriesResponse>(&client(&transport), &endpoint, 1).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["e-1", "e-2"]);
    }
}
