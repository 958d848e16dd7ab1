//! Domain types for subsync.
//!
//! These types mirror the Submittable v4 JSON records and are used both for API
//! deserialization and for output. Every wire field is optional: an absent,
//! `null`, or mistyped value decodes to `None` (or an empty list) instead of
//! failing the whole page. API-specific page envelopes live in `api::types`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a field, discarding values of the wrong JSON type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], falling back to the type's default.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

/// Decode a field value that may arrive as either a string or a number.
///
/// Integral numbers render without a fractional part (`42` and `42.0` both
/// become `"42"`); anything else that is not a string becomes `None`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireValue {
        Text(String),
        Number(serde_json::Number),
        Other(Value),
    }

    Ok(match Option::<WireValue>::deserialize(deserializer)? {
        Some(WireValue::Text(s)) => Some(s),
        Some(WireValue::Number(n)) => Some(normalize_number(&n)),
        Some(WireValue::Other(_)) | None => None,
    })
}

fn normalize_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // Below 2^53 the integral part is exact.
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Client-side identity for a record the server returned without an id.
///
/// Generated once when the record is decoded, so the same item keeps the same
/// placeholder for as long as the snapshot holding it lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalId(String);

impl Default for LocalId {
    fn default() -> Self {
        Self(format!("local-{:016x}", rand::random::<u64>()))
    }
}

impl LocalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Server id if present and non-empty, otherwise the placeholder.
fn id_or_local<'a>(id: &'a Option<String>, local: &'a LocalId) -> &'a str {
    id.as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(local.as_str())
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    let name = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    name.trim().to_string()
}

// ============================================================================
// Submission Types
// ============================================================================

/// A submission as listed by `/v4/submissions`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, deserialize_with = "lenient")]
    pub submission_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submission_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub project_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submission_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submission_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub review_stage_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submitter_first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submitter_last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submitter_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub public_org_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub public_org_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submission_url: Option<String>,
    #[serde(skip)]
    pub local_id: LocalId,
}

impl Submission {
    pub fn id(&self) -> &str {
        id_or_local(&self.submission_id, &self.local_id)
    }

    /// "First Last", or empty if the submitter is unnamed.
    pub fn submitter_name(&self) -> String {
        join_name(
            self.submitter_first_name.as_deref(),
            self.submitter_last_name.as_deref(),
        )
    }
}

// ============================================================================
// Entry Types
// ============================================================================

/// One filled-in form attached to a submission.
///
/// Both `/v4/entries/submissions/{id}` and `/v4/entries/forms/{id}` return
/// entries in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub form_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub entry: FormEntry,
}

/// Entries loaded from the payment form.
pub type PaymentDetail = SubmissionEntry;

impl SubmissionEntry {
    pub fn id(&self) -> &str {
        self.entry.id()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub submission_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub entry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub form_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub completed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub entry_version_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub field_data: Vec<FieldData>,
    #[serde(skip)]
    pub local_id: LocalId,
}

impl FormEntry {
    pub fn id(&self) -> &str {
        id_or_local(&self.entry_id, &self.local_id)
    }
}

/// One answer inside a form entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    #[serde(default, deserialize_with = "lenient")]
    pub form_field_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub field_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub options: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub routing_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confirm_routing_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confirm_account_number: Option<String>,
}

/// File uploaded as a field answer
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment<'a> {
    pub url: &'a str,
    pub name: Option<&'a str>,
}

/// Bank details captured by a payment field
#[derive(Debug, Clone, PartialEq)]
pub struct BankDetails<'a> {
    pub routing_number: Option<&'a str>,
    pub account_number: Option<&'a str>,
}

impl FieldData {
    pub fn attachment(&self) -> Option<Attachment<'_>> {
        let url = self.file_url.as_deref().filter(|u| !u.is_empty())?;
        Some(Attachment {
            url,
            name: self.file_name.as_deref(),
        })
    }

    pub fn bank_details(&self) -> Option<BankDetails<'_>> {
        if self.routing_number.is_none() && self.account_number.is_none() {
            return None;
        }
        Some(BankDetails {
            routing_number: self.routing_number.as_deref(),
            account_number: self.account_number.as_deref(),
        })
    }
}

/// Value of the field at `index`, or `"N/A"` if there is none.
pub fn field_value_at(fields: &[FieldData], index: usize) -> &str {
    fields
        .get(index)
        .and_then(|f| f.value.as_deref())
        .unwrap_or("N/A")
}

// ============================================================================
// Form Types
// ============================================================================

/// Form catalog metadata from `/v4/forms`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub form_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub form_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(skip)]
    pub local_id: LocalId,
}

impl FormSummary {
    pub fn id(&self) -> &str {
        id_or_local(&self.form_id, &self.local_id)
    }
}

// ============================================================================
// Review Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, deserialize_with = "lenient")]
    pub review_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub entry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub review_stage_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reviewer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub submitted_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub comments: Vec<ReviewComment>,
    #[serde(skip)]
    pub local_id: LocalId,
}

impl Review {
    pub fn id(&self) -> &str {
        id_or_local(&self.review_id, &self.local_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub question_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
}

// ============================================================================
// Team Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(skip)]
    pub local_id: LocalId,
}

impl TeamMember {
    pub fn id(&self) -> &str {
        id_or_local(&self.user_id, &self.local_id)
    }

    pub fn name(&self) -> String {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Turn an API label such as `"payment_form"` into `"Payment Form"`.
pub fn prettify(label: &str) -> String {
    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
