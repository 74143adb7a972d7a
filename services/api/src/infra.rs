use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use linkfluence::config::ListLimits;
use linkfluence::marketplace::store::MemoryStore;
use linkfluence::marketplace::Marketplace;

/// Marketplace whose documents and notifications share one process-local store.
pub(crate) type InMemoryMarketplace = Marketplace<MemoryStore, MemoryStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the store once and hand it to every component.
pub(crate) fn in_memory_marketplace(limits: ListLimits) -> InMemoryMarketplace {
    let store = Arc::new(MemoryStore::new());
    Marketplace::new(Arc::clone(&store), store, limits)
}
