use chrono::FixedOffset;
use colored::Colorize;

use crate::models::{
    FieldData, FormSummary, PaymentDetail, Review, Submission, SubmissionEntry, TeamMember,
    field_value_at, prettify,
};

/// Format a submission list entry for TTY display.
pub fn format_submission_row(sub: &Submission, tz: &FixedOffset) -> String {
    let title = sub
        .submission_title
        .as_deref()
        .unwrap_or("(untitled)")
        .bold()
        .to_string();
    let date = sub
        .submission_date
        .as_deref()
        .map(|d| format_date_short(d, tz))
        .unwrap_or_default()
        .dimmed()
        .to_string();
    let id = short_id(sub.id()).dimmed().to_string();
    let status = sub
        .submission_status
        .as_deref()
        .map(|s| format!(" [{}]", prettify(s)))
        .unwrap_or_default()
        .yellow()
        .to_string();
    let who = non_empty(sub.submitter_name())
        .map(|n| format!(" by {}", n))
        .unwrap_or_default()
        .dimmed()
        .to_string();

    format!("{} {} {}{}{}", id, date, title, status, who)
}

/// Format a submission with its entries and payments for TTY.
pub fn format_submission_detail(
    sub: &Submission,
    entries: &[SubmissionEntry],
    payments: &[PaymentDetail],
    tz: &FixedOffset,
) -> String {
    let mut lines = Vec::new();

    let title = sub.submission_title.as_deref().unwrap_or("(untitled)");
    lines.push(title.bold().to_string());
    lines.push("─".repeat(title.chars().count()));

    lines.push(format!("{}       {}", "ID:".dimmed(), sub.id()));
    if let Some(project) = &sub.project_title {
        lines.push(format!("{}  {}", "Project:".dimmed(), project));
    }
    if let Some(status) = &sub.submission_status {
        lines.push(format!("{}   {}", "Status:".dimmed(), prettify(status)));
    }
    if let Some(date) = &sub.submission_date {
        lines.push(format!("{}     {}", "Date:".dimmed(), format_date_short(date, tz)));
    }
    let submitter = sub.submitter_name();
    match (non_empty(submitter), sub.submitter_email.as_deref()) {
        (Some(name), Some(email)) => {
            lines.push(format!("{}      {} <{}>", "By:".dimmed(), name, email))
        }
        (Some(name), None) => lines.push(format!("{}      {}", "By:".dimmed(), name)),
        (None, Some(email)) => lines.push(format!("{}      {}", "By:".dimmed(), email)),
        (None, None) => {}
    }
    if let Some(org) = &sub.public_org_name {
        lines.push(format!("{}      {}", "Org:".dimmed(), org));
    }
    if let Some(url) = &sub.submission_url {
        lines.push(format!("{}      {}", "URL:".dimmed(), url));
    }

    if !entries.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} ({})", "Form entries:".dimmed(), entries.len()));
        for entry in entries {
            lines.extend(format_entry(entry, tz));
        }
    }

    if !payments.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} ({})", "Payments:".dimmed(), payments.len()));
        for payment in payments {
            lines.extend(format_entry(payment, tz));
        }
    }

    lines.join("\n")
}

fn format_entry(entry: &SubmissionEntry, tz: &FixedOffset) -> Vec<String> {
    let mut lines = Vec::new();
    let kind = entry
        .form_type
        .as_deref()
        .map(prettify)
        .unwrap_or_else(|| "Form".to_string());
    let status = entry
        .entry
        .status
        .as_deref()
        .map(|s| format!(" [{}]", prettify(s)))
        .unwrap_or_default();
    let completed = entry
        .entry
        .completed_at
        .as_deref()
        .map(|d| format!(" completed {}", format_date_short(d, tz)))
        .unwrap_or_default()
        .dimmed()
        .to_string();
    lines.push(format!(
        "  {} {} {}{}{}",
        "•".dimmed(),
        kind.bold(),
        short_id(entry.id()).dimmed(),
        status,
        completed
    ));
    let fields = &entry.entry.field_data;
    for (index, field) in fields.iter().enumerate() {
        lines.push(format!("      {}", format_field(field, field_value_at(fields, index))));
    }
    lines
}

fn format_field(field: &FieldData, value: &str) -> String {
    let label = field
        .field_type
        .as_deref()
        .map(prettify)
        .unwrap_or_else(|| "Field".to_string());

    let value = if let Some(file) = field.attachment() {
        format!("{} ({})", file.name.unwrap_or("file"), file.url)
    } else if let Some(bank) = field.bank_details() {
        format!(
            "routing {} / account {}",
            bank.routing_number.unwrap_or("?"),
            bank.account_number.map(mask_account).unwrap_or_else(|| "?".to_string())
        )
    } else {
        value.to_string()
    };

    format!("{} {}", format!("{}:", label).dimmed(), value)
}

/// Format a form for TTY list display.
pub fn format_form_row(form: &FormSummary) -> String {
    let name = form.name.as_deref().unwrap_or("(unnamed)").bold().to_string();
    let kind = form
        .form_type
        .as_deref()
        .map(|t| format!(" ({})", prettify(t)))
        .unwrap_or_default()
        .dimmed()
        .to_string();
    let status = form
        .status
        .as_deref()
        .map(|s| format!(" [{}]", prettify(s)))
        .unwrap_or_default();

    format!("{} {}{}{}", short_id(form.id()).dimmed(), name, kind, status)
}

/// Format a review for TTY list display.
pub fn format_review_row(review: &Review, tz: &FixedOffset) -> String {
    let score = review
        .score
        .map(|s| format!("{:>5}", s))
        .unwrap_or_else(|| "    -".to_string())
        .bold()
        .to_string();
    let status = review
        .status
        .as_deref()
        .map(prettify)
        .unwrap_or_default();
    let submitted = review
        .submitted_at
        .as_deref()
        .map(|d| format_date_short(d, tz))
        .unwrap_or_default()
        .dimmed()
        .to_string();
    let comments = match review.comments.len() {
        0 => String::new(),
        1 => " (1 comment)".to_string(),
        n => format!(" ({} comments)", n),
    };

    format!(
        "{} {} {} {}{}",
        short_id(review.id()).dimmed(),
        score,
        submitted,
        status,
        comments.dimmed()
    )
}

/// Format a team member for TTY list display.
pub fn format_team_row(member: &TeamMember) -> String {
    let name = non_empty(member.name())
        .unwrap_or_else(|| "(unknown)".to_string())
        .bold()
        .to_string();
    let email = member.email.as_deref().unwrap_or("").dimmed().to_string();
    let role = member
        .role
        .as_deref()
        .map(|r| format!(" ({})", prettify(r)))
        .unwrap_or_default()
        .dimmed()
        .to_string();

    format!("{} {} {}{}", short_id(member.id()).dimmed(), name, email, role)
}

/// Format a payment detail for TTY list display.
pub fn format_payment_row(payment: &PaymentDetail, tz: &FixedOffset) -> String {
    format_entry(payment, tz).join("\n")
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn mask_account(account: &str) -> String {
    crate::config::mask_key(account)
}

fn format_date_short(s: &str, tz: &FixedOffset) -> String {
    // Try to parse and format nicely, fallback to raw string
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
    } else {
        s.get(..10).unwrap_or(s).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn plain(s: &str) -> String {
        String::from_utf8(strip_ansi_escapes::strip(s)).unwrap()
    }

    #[test]
    fn submission_row_shows_title_date_and_submitter() {
        let sub: Submission = serde_json::from_value(json!({
            "submissionId": "0123456789abcdef",
            "submissionTitle": "Night Poems",
            "submissionStatus": "in_progress",
            "submissionDate": "2024-03-01T12:00:00Z",
            "submitterFirstName": "Ada",
            "submitterLastName": "Lovelace"
        }))
        .unwrap();
        let row = plain(&format_submission_row(&sub, &utc()));
        assert_eq!(row, "01234567 2024-03-01 12:00 Night Poems [In Progress] by Ada Lovelace");
    }

    #[test]
    fn submission_row_untitled() {
        let sub: Submission = serde_json::from_value(json!({"submissionId": "s-1"})).unwrap();
        let row = plain(&format_submission_row(&sub, &utc()));
        assert!(row.contains("(untitled)"));
    }

    #[test]
    fn detail_lists_entries_fields_and_payments() {
        let sub: Submission = serde_json::from_value(json!({
            "submissionId": "s-1",
            "submissionTitle": "Essay",
            "publicOrgName": "Press"
        }))
        .unwrap();
        let entries: Vec<SubmissionEntry> = serde_json::from_value(json!([{
            "formType": "initial_form",
            "entry": {"entryId": "e-1", "fieldData": [
                {"fieldType": "short_text", "value": "Hello"},
                {"fieldType": "number", "value": 42},
                {"fieldType": "file_upload", "fileUrl": "https://f/x.pdf", "fileName": "x.pdf"}
            ]}
        }]))
        .unwrap();
        let payments: Vec<PaymentDetail> = serde_json::from_value(json!([{
            "formType": "payment",
            "entry": {"entryId": "p-1", "submissionId": "s-1", "fieldData": [
                {"fieldType": "bank_account", "routingNumber": "021000021", "accountNumber": "987654321"}
            ]}
        }]))
        .unwrap();
        let out = plain(&format_submission_detail(&sub, &entries, &payments, &utc()));
        assert!(out.contains("Essay"));
        assert!(out.contains("Org:      Press"));
        assert!(out.contains("Form entries: (1)"));
        assert!(out.contains("Initial Form"));
        assert!(out.contains("Short Text: Hello"));
        assert!(out.contains("Number: 42"));
        assert!(out.contains("x.pdf (https://f/x.pdf)"));
        assert!(out.contains("Payments: (1)"));
        assert!(out.contains("routing 021000021 / account *****4321"));
        assert!(!out.contains("987654321"));
    }

    #[test]
    fn review_row_shows_score_and_comment_count() {
        let review: Review = serde_json::from_value(json!({
            "reviewId": "r-1",
            "score": 4.5,
            "status": "completed",
            "comments": [{"commentId": "c1", "value": "good"}, {"commentId": "c2"}]
        }))
        .unwrap();
        let row = plain(&format_review_row(&review, &utc()));
        assert!(row.contains("4.5"));
        assert!(row.contains("Completed"));
        assert!(row.contains("(2 comments)"));
    }

    #[test]
    fn team_and_form_rows() {
        let member: TeamMember = serde_json::from_value(json!({
            "userId": "u-1234567890", "firstName": "Grace", "lastName": "Hopper",
            "email": "g@example.com", "role": "admin"
        }))
        .unwrap();
        assert_eq!(
            plain(&format_team_row(&member)),
            "u-123456 Grace Hopper g@example.com (Admin)"
        );

        let unnamed: TeamMember = serde_json::from_value(json!({"role": "reader"})).unwrap();
        assert!(plain(&format_team_row(&unnamed)).starts_with("local-"));

        let form: FormSummary = serde_json::from_value(json!({
            "formId": "f-1", "name": "Payouts", "formType": "payment_form", "status": "active"
        }))
        .unwrap();
        assert_eq!(plain(&format_form_row(&form)), "f-1 Payouts (Payment Form) [Active]");
    }

    #[test]
    fn format_date_short_variants() {
        assert_eq!(format_date_short("2026-01-22T14:30:00Z", &utc()), "2026-01-22 14:30");
        let utc_minus_5 = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(format_date_short("2026-01-22T00:00:00Z", &utc_minus_5), "2026-01-21 19:00");
        assert_eq!(format_date_short("2024-01-01", &utc()), "2024-01-01");
        assert_eq!(format_date_short("2024-01-01 10:00:00", &utc()), "2024-01-01");
        assert_eq!(format_date_short("soon", &utc()), "soon");
    }
}
