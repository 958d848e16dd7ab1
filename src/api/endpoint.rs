use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in a single path segment. `/`, `?`, `#` and `%` must
/// never reach the URL raw or the id would change the request target.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

/// The Submittable list endpoints this client reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Submissions,
    SubmissionEntries { submission_id: String },
    Forms,
    FormEntries { form_id: String },
    Reviews,
    TeamMembers,
}

impl Endpoint {
    /// Path below the API base URL, ids percent-encoded
    pub fn path(&self) -> String {
        match self {
            Endpoint::Submissions => "/v4/submissions".to_string(),
            Endpoint::SubmissionEntries { submission_id } => {
                format!("/v4/entries/submissions/{}", segment(submission_id))
            }
            Endpoint::Forms => "/v4/forms".to_string(),
            Endpoint::FormEntries { form_id } => format!("/v4/entries/forms/{}", segment(form_id)),
            Endpoint::Reviews => "/v4/reviews".to_string(),
            Endpoint::TeamMembers => "/v4/team-members".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
