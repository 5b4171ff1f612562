use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use wayfare_catalog::SearchService;
use wayfare_checkout::{CheckoutDraft, CheckoutDraftStore, CheckoutError, SelectionStore};
use wayfare_core::{CurrencyConverter, Locale};
use wayfare_store::app_config::Config;
use wayfare_store::{ClientStorage, PreferencesStore};

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchService>,
    pub storage: Arc<dyn ClientStorage>,
    pub converter: Arc<RwLock<CurrencyConverter>>,
    pub selections: Arc<RwLock<SelectionStore>>,
    pub drafts: Arc<RwLock<CheckoutDraftStore>>,
    pub preferences: Arc<RwLock<PreferencesStore>>,
    pub default_locale: Locale,
    draft_writes: Arc<DraftWrites>,
}

/// Orders draft writes: a snapshot older than the last one written is dropped.
#[derive(Default)]
struct DraftWrites {
    next: AtomicU64,
    written: Mutex<u64>,
}

/// The draft store as of one mutation, ready to be written without the lock.
pub struct DraftSnapshot {
    seq: u64,
    drafts: Vec<CheckoutDraft>,
}

impl AppState {
    /// Build the state, restoring drafts and preferences from `storage`.
    /// Unreadable stored drafts are discarded with a warning.
    pub fn new(config: &Config, storage: Arc<dyn ClientStorage>, search: Arc<dyn SearchService>) -> Self {
        let ttl = chrono::Duration::hours(config.checkout.draft_ttl_hours);
        let drafts = match CheckoutDraftStore::restore(storage.as_ref(), ttl) {
            Ok(drafts) => drafts,
            Err(e) => {
                tracing::warn!("Starting without stored checkout drafts: {}", e);
                CheckoutDraftStore::new(ttl)
            }
        };
        let preferences = PreferencesStore::load(storage.clone());

        Self {
            search,
            storage,
            converter: Arc::new(RwLock::new(config.currency.converter())),
            selections: Arc::new(RwLock::new(SelectionStore::new())),
            drafts: Arc::new(RwLock::new(drafts)),
            preferences: Arc::new(RwLock::new(preferences)),
            default_locale: config.locale.default,
            draft_writes: Arc::new(DraftWrites::default()),
        }
    }

    /// Take while still holding the drafts write lock so snapshots are
    /// numbered in mutation order.
    pub fn draft_snapshot(&self, drafts: &CheckoutDraftStore) -> DraftSnapshot {
        DraftSnapshot {
            seq: self.draft_writes.next.fetch_add(1, Ordering::SeqCst) + 1,
            drafts: drafts.snapshot(),
        }
    }

    /// Write a snapshot through to storage on the blocking pool.
    /// Failures are logged, never returned.
    pub async fn persist_drafts(&self, snapshot: DraftSnapshot) {
        let storage = self.storage.clone();
        let writes = self.draft_writes.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<(), CheckoutError> {
            let mut written = writes.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if snapshot.seq <= *written {
                tracing::debug!(seq = snapshot.seq, "Skipping stale draft snapshot");
                return Ok(());
            }
            CheckoutDraftStore::save_snapshot(storage.as_ref(), &snapshot.drafts)?;
            *written = snapshot.seq;
            Ok(())
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to persist checkout drafts: {}", e),
            Err(e) => tracing::error!("Draft persistence task failed: {}", e),
        }
    }
}
