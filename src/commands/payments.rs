use anyhow::Result;

use crate::cli::context::RunContext;
use crate::models::PaymentDetail;
use crate::output::format::OutputMode;
use crate::output::json::to_json;
use crate::output::progress::Spinner;
use crate::output::table::format_payment_row;

/// List payment details, from the detected payment form or from `form`.
pub fn run(form: Option<&str>, ctx: &RunContext) -> Result<()> {
    let store = super::open_store(ctx)?;

    let payments: Vec<PaymentDetail> = match form {
        // Only that form's entries are needed; skip the full refresh
        Some(form_id) => {
            let spinner = Spinner::new(&format!("Loading entries for form {}...", form_id));
            let loaded = store.load_payment_details_for_form(form_id);
            spinner.finish();
            loaded?
        }
        None => super::load(&store, false)?.payment_details.clone(),
    };

    match ctx.output_mode {
        OutputMode::Json => println!("{}", to_json(&payments)),
        OutputMode::Tty => {
            if payments.is_empty() {
                println!("No payment details found.");
            }
            for payment in &payments {
                println!("{}", format_payment_row(payment, &ctx.tz));
            }
        }
    }

    Ok(())
}
