//! Which form's entries count as "payment details".

use crate::models::FormSummary;

pub trait PaymentFormPolicy: Send + Sync {
    /// Pick the payment form out of the catalog, if any.
    fn select<'a>(&self, forms: &'a [FormSummary]) -> Option<&'a FormSummary>;
}

/// First form whose type label contains "payment", ignoring case.
///
/// A guess based on naming only; Submittable has no explicit payment flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPaymentForm;

impl PaymentFormPolicy for HeuristicPaymentForm {
    fn select<'a>(&self, forms: &'a [FormSummary]) -> Option<&'a FormSummary> {
        forms.iter().find(|f| {
            f.form_type
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("payment"))
        })
    }
}

/// A form chosen up front by id.
#[derive(Debug, Clone)]
pub struct FixedPaymentForm(pub String);

impl PaymentFormPolicy for FixedPaymentForm {
    fn select<'a>(&self, forms: &'a [FormSummary]) -> Option<&'a FormSummary> {
        forms
            .iter()
            .find(|f| f.form_id.as_deref() == Some(self.0.as_str()))
    }
}
