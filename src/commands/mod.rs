pub mod catalog;
pub mod config;
pub mod payments;
pub mod submissions;
pub mod sync;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};
use log::debug;

use crate::api::{ApiClient, Credential, HttpTransport, resolve_api_key};
use crate::cli::context::RunContext;
use crate::output::progress::{Spinner, format_duration};
use crate::store::{FixedPaymentForm, RefreshOutcome, Snapshot, SubmittableStore};

const PROGRESS_POLL: Duration = Duration::from_millis(100);

/// Build a store wired to the real API from the run context.
///
/// A missing key is not an error here; the store reports it on first use.
pub fn open_store(ctx: &RunContext) -> Result<SubmittableStore> {
    let transport = HttpTransport::new(ctx.config.base_url(), ctx.config.timeout())?;
    let client = ApiClient::new(Arc::new(transport), Credential::default())
        .with_page_size(ctx.config.page_size());

    let store = match ctx.config.payment_form_id() {
        Some(form_id) => {
            debug!("using configured payment form {}", form_id);
            SubmittableStore::with_policy(client, Box::new(FixedPaymentForm(form_id.to_string())))
        }
        None => SubmittableStore::new(client),
    };

    let key = resolve_api_key(ctx.api_key_override.as_deref(), ctx.config.api_key.as_deref());
    if let Some(key) = key {
        store.set_api_key(&key);
    }
    Ok(store)
}

/// Run a refresh behind a spinner that follows each published snapshot.
pub fn refresh(store: &SubmittableStore, force: bool) -> Result<RefreshOutcome> {
    let start = Instant::now();
    let spinner = Spinner::new("Fetching from Submittable...");
    let updates = store.subscribe();

    let outcome = thread::scope(|scope| {
        let worker = scope.spawn(|| store.refresh_all(force));
        while !worker.is_finished() {
            if let Ok(snapshot) = updates.recv_timeout(PROGRESS_POLL) {
                spinner.set_message(&progress_message(&snapshot));
            }
        }
        worker.join()
    })
    .map_err(|_| anyhow!("Refresh thread panicked"))?;
    spinner.finish();

    debug!("refresh finished in {}: {:?}", format_duration(start.elapsed()), outcome);
    Ok(outcome)
}

/// Refresh if needed and return the resulting snapshot.
pub fn load(store: &SubmittableStore, force: bool) -> Result<Arc<Snapshot>> {
    match refresh(store, force)? {
        RefreshOutcome::Refreshed | RefreshOutcome::UpToDate => Ok(store.snapshot()),
        RefreshOutcome::AlreadyRefreshing => bail!("A refresh is already running"),
        RefreshOutcome::Failed(e) => Err(e.into()),
    }
}

fn progress_message(snapshot: &Snapshot) -> String {
    format!(
        "Fetching from Submittable... {} submissions, {} with entries, {} forms",
        snapshot.submissions.len(),
        snapshot.submission_entries.len(),
        snapshot.forms.len()
    )
}
