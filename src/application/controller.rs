use crate::application::notifications::{NotificationBus, Severity};
use crate::config::ListConfig;
use crate::domain::filter::{StatusFilter, classify};
use crate::domain::pagination::{PageSize, Paginator};
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use crate::domain::ports::PaymentGatewayRef;
use crate::domain::reducer::reduce_active;
use crate::error::{PaymentError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const MSG_LOAD_FAILED: &str = "Failed to load payments";
pub const MSG_INVALID_ID: &str = "Invalid payment id.";
pub const MSG_DEACTIVATED: &str = "Payment deactivated successfully!";
pub const MSG_DEACTIVATE_FAILED: &str =
    "Could not deactivate the payment. Check that its status is \"Pending Processing\".";
pub const MSG_STATUS_CHANGED: &str = "Payment status changed successfully!";
pub const MSG_STATUS_FAILED: &str = "Could not process the payment.";
pub const MSG_CREATED: &str = "Payment created successfully!";

/// Current values of the list's filter fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterForm {
    pub search: String,
    pub status: StatusFilter,
    pub page_size: PageSize,
}

/// What the host view renders: the current page plus pager totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub payments: Vec<PaymentRecord>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: PageSize,
}

struct ListState {
    form: FilterForm,
    paginator: Paginator,
}

struct Inner {
    gateway: PaymentGatewayRef,
    notifier: NotificationBus,
    debounce: Duration,
    state: RwLock<ListState>,
    /// Id of the most recently issued fetch. Responses to older ones are dropped.
    generation: AtomicU64,
}

impl Inner {
    /// Runs the filter pipeline: classify, fetch, reduce, paginate.
    async fn load(&self) {
        let form = {
            let mut state = self.state.write().await;
            let page_size = state.form.page_size;
            if state.paginator.page_size() != page_size {
                state.paginator.set_page_size(page_size);
                state.paginator.reset();
            }
            state.form.clone()
        };

        // A rejected search retires in-flight fetches too.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let criteria = match classify(&form.search, form.status) {
            Ok(criteria) => criteria,
            Err(e) => {
                warn!(search = %form.search, error = %e, "search text rejected, fetch skipped");
                self.notify_error(&e);
                return;
            }
        };

        debug!(generation, ?criteria, "fetching payments");
        let result = self.gateway.fetch_payments(&criteria).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding stale payment list response");
            return;
        }

        match result {
            Ok(raw) => {
                let fetched = raw.len();
                state.paginator.set_source(reduce_active(raw));
                state.paginator.reset();
                debug!(
                    generation,
                    fetched,
                    active = state.paginator.total_items(),
                    "payment list refreshed"
                );
            }
            Err(e) => {
                state.paginator.set_source(Vec::new());
                state.paginator.reset();
                drop(state);
                error!(error = %e, "failed to load payments");
                self.notifier.show(MSG_LOAD_FAILED, Severity::Error);
            }
        }
    }

    fn notify_error(&self, e: &PaymentError) {
        let message = match e {
            PaymentError::Validation(message) => message.clone(),
            other => other.to_string(),
        };
        self.notifier.show(message, Severity::Error);
    }
}

/// Drives the payment list: filtering, paging and record mutations.
///
/// Filter edits are debounced: each edit re-arms a single-shot timer and only
/// the last edit of a burst triggers a fetch. Every failure is turned into
/// one error notification on the [`NotificationBus`]; no operation returns
/// an error to the caller and the controller stays usable afterwards.
///
/// Dropping the controller (or calling [`shutdown`](Self::shutdown)) cancels
/// a pending debounced reload.
pub struct PaymentListController {
    inner: Arc<Inner>,
    pending_reload: Mutex<Option<JoinHandle<()>>>,
}

impl PaymentListController {
    pub fn new(
        gateway: PaymentGatewayRef,
        notifier: NotificationBus,
        debounce: Duration,
        page_size: PageSize,
    ) -> Self {
        let form = FilterForm {
            page_size,
            ..FilterForm::default()
        };
        Self {
            inner: Arc::new(Inner {
                gateway,
                notifier,
                debounce,
                state: RwLock::new(ListState {
                    form,
                    paginator: Paginator::new(page_size),
                }),
                generation: AtomicU64::new(0),
            }),
            pending_reload: Mutex::new(None),
        }
    }

    pub fn from_config(
        gateway: PaymentGatewayRef,
        notifier: NotificationBus,
        config: &ListConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            gateway,
            notifier,
            config.debounce(),
            config.initial_page_size()?,
        ))
    }

    /// First load of the session. Not debounced.
    pub async fn mount(&self) {
        info!("payment list mounted");
        self.inner.load().await;
    }

    /// Runs the filter pipeline right away without touching a pending timer.
    pub async fn reload(&self) {
        self.inner.load().await;
    }

    /// Cancels any pending debounced reload and runs it now.
    pub async fn reload_now(&self) {
        self.cancel_pending_reload().await;
        self.inner.load().await;
    }

    pub async fn set_search(&self, text: impl Into<String>) {
        self.inner.state.write().await.form.search = text.into();
        self.schedule_reload().await;
    }

    pub async fn set_status_filter(&self, status: StatusFilter) {
        self.inner.state.write().await.form.status = status;
        self.schedule_reload().await;
    }

    pub async fn set_page_size(&self, page_size: PageSize) {
        self.inner.state.write().await.form.page_size = page_size;
        self.schedule_reload().await;
    }

    pub async fn form(&self) -> FilterForm {
        self.inner.state.read().await.form.clone()
    }

    pub async fn view(&self) -> PageView {
        let state = self.inner.state.read().await;
        let paginator = &state.paginator;
        PageView {
            payments: paginator.slice().to_vec(),
            current_page: paginator.current_page(),
            total_pages: paginator.total_pages(),
            total_items: paginator.total_items(),
            page_size: paginator.page_size(),
        }
    }

    pub async fn go_to_page(&self, page: usize) {
        self.inner.state.write().await.paginator.go_to_page(page);
    }

    pub async fn next_page(&self) {
        self.inner.state.write().await.paginator.next_page();
    }

    pub async fn prev_page(&self) {
        self.inner.state.write().await.paginator.prev_page();
    }

    /// Soft-deletes a payment, then reloads the list on success.
    pub async fn inactivate(&self, id: Option<&str>) {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            warn!("deactivation requested without a payment id");
            self.inner.notifier.show(MSG_INVALID_ID, Severity::Error);
            return;
        };

        match self.inner.gateway.deactivate(id).await {
            Ok(reply) => {
                info!(id, reply = %reply, "payment deactivated");
                self.inner.notifier.show(MSG_DEACTIVATED, Severity::Success);
                self.inner.load().await;
            }
            Err(e) => {
                error!(id, error = %e, "failed to deactivate payment");
                self.inner.notifier.show(MSG_DEACTIVATE_FAILED, Severity::Error);
            }
        }
    }

    /// Requests a status change and reloads the list either way.
    ///
    /// The service may have applied part of a change even when it reports an
    /// error, so a failure still resyncs the list before notifying.
    pub async fn process_status(&self, payment_id: u64, new_status: PaymentStatus) {
        let result = self.inner.gateway.set_status(payment_id, new_status).await;
        self.inner.load().await;

        match result {
            Ok(reply) => {
                info!(payment_id, status = %new_status, reply = %reply, "payment status changed");
                self.inner.notifier.show(MSG_STATUS_CHANGED, Severity::Success);
            }
            Err(e) => {
                error!(payment_id, status = %new_status, error = %e, "failed to change payment status");
                self.inner.notifier.show(MSG_STATUS_FAILED, Severity::Error);
            }
        }
    }

    /// Registers a new payment and reloads the list on success.
    pub async fn create_payment(&self, payment: NewPayment) {
        match self.inner.gateway.create_payment(&payment).await {
            Ok(created) => {
                info!(payment_id = created.payment_id, "payment created");
                self.inner.notifier.show(MSG_CREATED, Severity::Success);
                self.inner.load().await;
            }
            Err(e) => {
                error!(payment_id = payment.payment_id, error = %e, "failed to create payment");
                self.inner
                    .notifier
                    .show(format!("Failed to create payment: {e}"), Severity::Error);
            }
        }
    }

    /// Whether a debounced reload is armed and has not completed yet.
    pub async fn has_pending_reload(&self) -> bool {
        self.pending_reload
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Ends the session: cancels the pending debounced reload, if any.
    pub async fn shutdown(&self) {
        self.cancel_pending_reload().await;
        debug!("payment list shut down");
    }

    async fn schedule_reload(&self) {
        let mut slot = self.pending_reload.lock().await;
        if let Some(task) = slot.take() {
            task.abort();
        }
        let inner = Arc::clone(&self.inner);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.load().await;
        }));
    }

    async fn cancel_pending_reload(&self) {
        if let Some(task) = self.pending_reload.lock().await.take() {
            task.abort();
        }
    }
}

impl Drop for PaymentListController {
    fn drop(&mut self) {
        if let Some(task) = self.pending_reload.get_mut().take() {
            task.abort();
        }
    }
}
