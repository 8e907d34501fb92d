//! Application state: configuration, the data service, and the registry of open pages.
//!
//! Each `GET /` opens a fresh page (the server-side counterpart of a browser page load).
//! Pages live in memory until they sit idle for `pages.ttl_secs`; every lookup counts
//! as activity, and idle ones are pruned whenever a new page opens.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::memory::MemoryService;
use crate::page::PageState;
use crate::service::{DataService, ServiceError};
use crate::supabase::SupabaseClient;

pub type PageId = Uuid;
pub type PageCell = Arc<Mutex<PageState>>;

struct PageSlot {
    page: PageCell,
    last_seen: Instant,
}

pub struct AppState {
    pub service: Arc<dyn DataService>,
    pub config: AppConfig,
    pages: RwLock<HashMap<PageId, PageSlot>>,
}

impl AppState {
    /// Pick the backend from config: Supabase when URL and key are set, memory otherwise.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        let service: Arc<dyn DataService> = match config.supabase() {
            Some((url, key)) => {
                let timeout = Duration::from_secs(config.service.request_timeout_secs);
                let client = SupabaseClient::new(url, key, timeout)?;
                info!(target: "assessment", base_url = %client.base_url, ?timeout, "Supabase backend enabled.");
                Arc::new(client)
            }
            None => {
                let catalog = config.local_catalog();
                info!(target: "assessment", challenges = catalog.len(), "SUPABASE_URL/SUPABASE_ANON_KEY not set. Using in-memory backend.");
                Arc::new(MemoryService::new(catalog))
            }
        };
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: AppConfig, service: Arc<dyn DataService>) -> Self {
        Self {
            service,
            config,
            pages: RwLock::new(HashMap::new()),
        }
    }

    /// Register a fresh page and drop pages idle past their TTL.
    #[instrument(level = "debug", skip(self))]
    pub async fn open_page(&self) -> (PageId, PageCell) {
        let ttl = Duration::from_secs(self.config.pages.ttl_secs);
        let id = Uuid::new_v4();
        let page: PageCell = Arc::new(Mutex::new(PageState::new()));

        let mut pages = self.pages.write().await;
        let before = pages.len();
        pages.retain(|_, slot| slot.last_seen.elapsed() < ttl);
        let pruned = before - pages.len();
        if pruned > 0 {
            debug!(target: "assessment", pruned, "Dropped expired pages");
        }
        pages.insert(id, PageSlot { page: page.clone(), last_seen: Instant::now() });
        (id, page)
    }

    /// Look up an open page by id and mark it as active.
    pub async fn page(&self, id: &PageId) -> Option<PageCell> {
        let mut pages = self.pages.write().await;
        let slot = pages.get_mut(id)?;
        slot.last_seen = Instant::now();
        Some(slot.page.clone())
    }

    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }
}
