//! In-memory aggregate of one account's Submittable data.
//!
//! [`SubmittableStore`] owns the only copy of the data and is the single place
//! where fetch errors are caught. Readers get immutable [`Snapshot`]s; writers
//! (a refresh or an on-demand payment load) take turns behind one mutation lock.

mod policy;
mod snapshot;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{FormSummary, PaymentDetail, Review, Submission, SubmissionEntry, TeamMember};

pub use policy::{FixedPaymentForm, HeuristicPaymentForm, PaymentFormPolicy};
pub use snapshot::Snapshot;

/// What a call to [`SubmittableStore::refresh_all`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Another refresh was already running; nothing happened
    AlreadyRefreshing,
    /// Not forced and data was already loaded; nothing fetched
    UpToDate,
    Refreshed,
    /// The error is also stored in [`SubmittableStore::last_error`]
    Failed(ApiError),
}

/// Result of one of the four independent top-level fetches.
enum TopLevel {
    Submissions(Vec<Submission>),
    Forms(Vec<FormSummary>),
    Reviews(Vec<Review>),
    TeamMembers(Vec<TeamMember>),
}

/// Clears the refreshing flag when a refresh ends, however it ends.
struct RefreshingGuard<'a>(&'a AtomicBool);

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SubmittableStore {
    client: ApiClient,
    policy: Box<dyn PaymentFormPolicy>,
    snapshot: RwLock<Arc<Snapshot>>,
    last_error: Mutex<Option<ApiError>>,
    refreshing: AtomicBool,
    mutation: Mutex<()>,
    subscribers: Mutex<Vec<Sender<Arc<Snapshot>>>>,
}

impl SubmittableStore {
    pub fn new(client: ApiClient) -> Self {
        Self::with_policy(client, Box::new(HeuristicPaymentForm))
    }

    pub fn with_policy(client: ApiClient, policy: Box<dyn PaymentFormPolicy>) -> Self {
        Self {
            client,
            policy,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            last_error: Mutex::new(None),
            refreshing: AtomicBool::new(false),
            mutation: Mutex::new(()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    // ========================================================================
    // Read Accessors
    // ========================================================================

    /// Current snapshot. Cheap; later refreshes do not change it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn submissions_for_organization(&self, organization: &str) -> Vec<Submission> {
        self.snapshot()
            .submissions_for_organization(organization)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn entries_for(&self, submission_id: &str) -> Vec<SubmissionEntry> {
        self.snapshot().entries_for(submission_id).to_vec()
    }

    pub fn payments_for(&self, submission_id: &str) -> Vec<PaymentDetail> {
        self.snapshot()
            .payments_for(submission_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> Receiver<Arc<Snapshot>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Use a different API key from the next request on.
    pub fn set_api_key(&self, api_key: &str) {
        self.client.credential().set(api_key);
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Fetch everything and replace the snapshot.
    ///
    /// Without `force`, an already loaded snapshot is kept as is. Errors are
    /// recorded in [`last_error`](Self::last_error) and whatever was published
    /// before the failing step stays in place.
    pub fn refresh_all(&self, force: bool) -> RefreshOutcome {
        if self.is_loading() {
            debug!("refresh requested while refreshing, ignoring");
            return RefreshOutcome::AlreadyRefreshing;
        }
        if !force && !self.snapshot().is_empty() {
            debug!("snapshot already loaded, skipping refresh");
            return RefreshOutcome::UpToDate;
        }
        if !self.client.credential().is_present() {
            self.set_error(Some(ApiError::MissingCredential));
            return RefreshOutcome::Failed(ApiError::MissingCredential);
        }
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return RefreshOutcome::AlreadyRefreshing;
        }
        let _refreshing = RefreshingGuard(&self.refreshing);
        let _mutation = self.lock_mutation();

        self.set_error(None);
        let start = Instant::now();
        info!("refresh started (force={})", force);

        match self.run_refresh() {
            Ok(()) => {
                info!("refresh finished in {:?}", start.elapsed());
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                warn!("refresh failed after {:?}: {}", start.elapsed(), e);
                self.set_error(Some(e.clone()));
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn run_refresh(&self) -> Result<(), ApiError> {
        let (mut submissions, forms, reviews, team_members) = self.fetch_top_level()?;
        sort_newest_first(&mut submissions);
        debug!(
            "fetched {} submissions, {} forms, {} reviews, {} team members",
            submissions.len(),
            forms.len(),
            reviews.len(),
            team_members.len()
        );

        let published = self.publish(|s| {
            s.submissions = submissions;
            s.forms = forms;
            s.reviews = reviews;
            s.team_members = team_members;
            s.submission_entries.clear();
        });

        self.load_entries(&published.submissions)?;
        self.load_heuristic_payments(&published.forms)
    }

    /// Submissions, forms, reviews, and team members, each on its own thread.
    ///
    /// Returns as soon as any fetch fails; the other threads are left to finish
    /// on their own and their results are dropped.
    fn fetch_top_level(
        &self,
    ) -> Result<(Vec<Submission>, Vec<FormSummary>, Vec<Review>, Vec<TeamMember>), ApiError> {
        let (tx, rx) = mpsc::channel();
        spawn_fetch("submissions", &tx, &self.client, |c| {
            c.get_submissions().map(TopLevel::Submissions)
        })?;
        spawn_fetch("forms", &tx, &self.client, |c| {
            c.get_forms().map(TopLevel::Forms)
        })?;
        spawn_fetch("reviews", &tx, &self.client, |c| {
            c.get_reviews().map(TopLevel::Reviews)
        })?;
        spawn_fetch("team-members", &tx, &self.client, |c| {
            c.get_team_members().map(TopLevel::TeamMembers)
        })?;
        drop(tx);

        let (mut submissions, mut forms, mut reviews, mut team) = (None, None, None, None);
        for _ in 0..4 {
            match rx.recv() {
                Ok(Ok(TopLevel::Submissions(v))) => submissions = Some(v),
                Ok(Ok(TopLevel::Forms(v))) => forms = Some(v),
                Ok(Ok(TopLevel::Reviews(v))) => reviews = Some(v),
                Ok(Ok(TopLevel::TeamMembers(v))) => team = Some(v),
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }

        match (submissions, forms, reviews, team) {
            (Some(s), Some(f), Some(r), Some(t)) => Ok((s, f, r, t)),
            _ => Err(ApiError::Network(
                "a fetch worker stopped without a result".to_string(),
            )),
        }
    }

    /// One request chain per submission, in snapshot order.
    fn load_entries(&self, submissions: &[Submission]) -> Result<(), ApiError> {
        let mut entries: HashMap<String, Vec<SubmissionEntry>> = HashMap::new();

        for submission in submissions {
            let Some(id) = submission.submission_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            match self.client.get_submission_entries(id) {
                Ok(fetched) => {
                    entries.insert(id.to_string(), fetched);
                }
                Err(e) => {
                    debug!("entries for {} failed, keeping {} loaded so far", id, entries.len());
                    self.publish(|s| s.submission_entries = entries);
                    return Err(e);
                }
            }
        }

        debug!("loaded entries for {} submissions", entries.len());
        self.publish(|s| s.submission_entries = entries);
        Ok(())
    }

    fn load_heuristic_payments(&self, forms: &[FormSummary]) -> Result<(), ApiError> {
        let form_id = self
            .policy
            .select(forms)
            .and_then(|f| f.form_id.clone())
            .filter(|id| !id.is_empty());

        let Some(form_id) = form_id else {
            debug!("no payment form in catalog");
            self.publish(|s| s.payment_details.clear());
            return Ok(());
        };

        let details = self.client.get_form_entries(&form_id)?;
        debug!("loaded {} payment details from form {}", details.len(), form_id);
        self.publish(|s| s.payment_details = details);
        Ok(())
    }

    // ========================================================================
    // On-demand Loads
    // ========================================================================

    /// Replace the payment list with every entry of `form_id`.
    ///
    /// Waits for a running refresh to finish first, so neither can overwrite
    /// the other with older data.
    pub fn load_payment_details_for_form(
        &self,
        form_id: &str,
    ) -> Result<Vec<PaymentDetail>, ApiError> {
        let _mutation = self.lock_mutation();

        match self.client.get_form_entries(form_id) {
            Ok(details) => {
                debug!("loaded {} payment details from form {}", details.len(), form_id);
                let details_for_caller = details.clone();
                self.publish(|s| s.payment_details = details);
                Ok(details_for_caller)
            }
            Err(e) => {
                warn!("payment details for form {} failed: {}", form_id, e);
                self.set_error(Some(e.clone()));
                Err(e)
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lock_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_error(&self, error: Option<ApiError>) {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = error;
    }

    /// Build the next snapshot from the current one and publish it.
    fn publish(&self, update: impl FnOnce(&mut Snapshot)) -> Arc<Snapshot> {
        let next = {
            let mut slot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
            let mut next = Snapshot::clone(&slot);
            update(&mut next);
            let next = Arc::new(next);
            *slot = next.clone();
            next
        };

        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|tx| tx.send(next.clone()).is_ok());
        next
    }
}

fn spawn_fetch<F>(
    name: &str,
    tx: &Sender<Result<TopLevel, ApiError>>,
    client: &ApiClient,
    fetch: F,
) -> Result<(), ApiError>
where
    F: FnOnce(&ApiClient) -> Result<TopLevel, ApiError> + Send + 'static,
{
    let tx = tx.clone();
    let client = client.clone();
    thread::Builder::new()
        .name(format!("subsync-{}", name))
        .spawn(move || {
            // The receiver is gone if another fetch already failed
            let _ = tx.send(fetch(&client));
        })
        .map(|_| ())
        .map_err(|e| ApiError::Network(format!("failed to start {} fetch: {}", name, e)))
}

/// Descending by submission date, compared as plain strings.
///
/// Correct for ISO-8601 dates in one format; mixed formats sort lexically.
/// Missing dates sort last. Ties keep server order.
fn sort_newest_first(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| {
        let a = a.submission_date.as_deref().unwrap_or("");
        let b = b.submission_date.as_deref().unwrap_or("");
        b.cmp(a)
    });
}
