//! Per-feature client-side caches over the REST API.
//!
//! Every feature shares one [`Store`]; the feature modules only describe the
//! resource and add their own actions on top.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{api::ApiClient, error::ApiError};

pub mod appointment_store;
pub mod doctor_store;
pub mod employee_store;
pub mod inventory_store;
pub mod master_data_store;
pub mod patient_store;
pub mod payment_store;
pub mod quotation_store;
pub mod sale_store;
pub mod service_store;

/// An entity type the backend exposes under `PATH` with list/get/create/
/// update/delete.
pub trait Resource: Clone + Debug + Send + Sync + DeserializeOwned + 'static {
    /// Collection path, e.g. `/patients`.
    const PATH: &'static str;
    /// Name used in logs and "not loaded" messages.
    const LABEL: &'static str;

    type Draft: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;
    type Filter: Serialize + Clone + Debug + Default + Send + Sync;

    fn id(&self) -> Uuid;
}

/// For resources listed without query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoFilter {}

#[derive(Debug, Clone)]
pub struct StoreState<R: Resource> {
    pub items: Vec<R>,
    pub selected: Option<R>,
    pub filter: R::Filter,
    pub is_loading: bool,
    /// Last failure. Stays until the caller takes it.
    pub error: Option<ApiError>,
    in_flight: u32,
}

impl<R: Resource> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            filter: R::Filter::default(),
            is_loading: false,
            error: None,
            in_flight: 0,
        }
    }
}

impl<R: Resource> StoreState<R> {
    pub fn find(&self, id: Uuid) -> Option<&R> {
        self.items.iter().find(|r| r.id() == id)
    }

    fn upsert(&mut self, item: R) {
        let id = item.id();
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = Some(item.clone());
        }
        match self.items.iter_mut().find(|r| r.id() == id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    fn remove(&mut self, id: Uuid) {
        self.items.retain(|r| r.id() != id);
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = None;
        }
    }

    fn started(&mut self) {
        self.in_flight += 1;
        self.is_loading = true;
    }

    fn finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;
    }
}

/// Cloneable handle to one feature's state.
///
/// Actions never return errors to the caller: failures land in
/// [`StoreState::error`]. A list fetch only applies if no newer fetch was
/// issued after it, and [`Store::cancel`] drops everything in flight.
#[derive(Debug)]
pub struct Store<R: Resource> {
    client: ApiClient,
    state: Arc<RwLock<StoreState<R>>>,
    latest_fetch: Arc<AtomicU64>,
    epoch: Arc<AtomicU64>,
}

impl<R: Resource> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: Arc::clone(&self.state),
            latest_fetch: Arc::clone(&self.latest_fetch),
            epoch: Arc::clone(&self.epoch),
        }
    }
}

impl<R: Resource> Store<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(StoreState::default())),
            latest_fetch: Arc::new(AtomicU64::new(0)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn snapshot(&self) -> StoreState<R> {
        self.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<R> {
        self.state.read().await.items.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<R> {
        self.state.read().await.find(id).cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    /// Read and clear the error, once it has been shown.
    pub async fn take_error(&self) -> Option<ApiError> {
        self.state.write().await.error.take()
    }

    pub async fn set_filter(&self, filter: R::Filter) {
        self.state.write().await.filter = filter;
    }

    pub async fn select(&self, id: Option<Uuid>) {
        let mut s = self.state.write().await;
        let found = id.and_then(|id| s.find(id).cloned());
        s.selected = found;
    }

    /// Forget every request in flight; their responses are ignored.
    pub async fn cancel(&self) {
        let mut s = self.state.write().await;
        // bumped under the lock so `start` never pairs an old epoch with a new count
        self.epoch.fetch_add(1, Ordering::SeqCst);
        s.in_flight = 0;
        s.is_loading = false;
        tracing::debug!(resource = R::LABEL, "in-flight requests cancelled");
    }

    /// Record a failure that happened before any request was made.
    pub async fn fail(&self, err: impl Into<ApiError>) {
        let err = err.into();
        tracing::debug!(resource = R::LABEL, error = %err, "action rejected locally");
        self.state.write().await.error = Some(err);
    }

    async fn start(&self) -> u64 {
        let mut s = self.state.write().await;
        let epoch = self.epoch.load(Ordering::SeqCst);
        s.started();
        s.error = None;
        epoch
    }

    /// Common tail of every action: drop cancelled work, drop list responses
    /// overtaken by a newer fetch (errors included), record errors, otherwise
    /// let `apply` splice the result in.
    async fn finish<T>(
        &self,
        epoch: u64,
        ticket: Option<u64>,
        action: &'static str,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut StoreState<R>, &T),
    ) -> Option<T> {
        let mut s = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(resource = R::LABEL, action, "response after cancel, ignored");
            return None;
        }
        s.finished();
        if let Some(ticket) = ticket {
            if self.latest_fetch.load(Ordering::SeqCst) != ticket {
                tracing::debug!(resource = R::LABEL, ticket, "stale list response dropped");
                return None;
            }
        }
        match result {
            Ok(value) => {
                apply(&mut s, &value);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(resource = R::LABEL, action, error = %e, "store action failed");
                s.error = Some(e);
                None
            }
        }
    }

    fn item_path(id: Uuid) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// Reload the list with the current filter. Returns whether the result
    /// was applied.
    pub async fn fetch_all(&self) -> bool {
        let ticket = self.latest_fetch.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.start().await;
        let filter = self.state.read().await.filter.clone();

        let result = self.client.get::<Vec<R>, _>(R::PATH, &filter).await;

        self.finish(epoch, Some(ticket), "fetch_all", result, |s, items| {
            s.items = items.clone();
        })
        .await
        .is_some()
    }

    /// Replace the filter and reload.
    pub async fn search(&self, filter: R::Filter) -> bool {
        self.set_filter(filter).await;
        self.fetch_all().await
    }

    pub async fn fetch_one(&self, id: Uuid) -> Option<R> {
        let epoch = self.start().await;
        let result = self.client.get_one::<R>(&Self::item_path(id)).await;
        self.finish(epoch, None, "fetch_one", result, |s, item| {
            s.upsert(item.clone());
            s.selected = Some(item.clone());
        })
        .await
    }

    pub async fn create(&self, draft: &R::Draft) -> Option<R> {
        let epoch = self.start().await;
        let result = self.client.post::<R, _>(R::PATH, draft).await;
        self.finish(epoch, None, "create", result, |s, item| s.upsert(item.clone()))
            .await
    }

    pub async fn update(&self, id: Uuid, patch: &R::Patch) -> Option<R> {
        let epoch = self.start().await;
        let result = self.client.patch::<R, _>(&Self::item_path(id), patch).await;
        self.finish(epoch, None, "update", result, |s, item| s.upsert(item.clone()))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let epoch = self.start().await;
        let result = self.client.delete(&Self::item_path(id)).await;
        self.finish(epoch, None, "delete", result, |s, _| s.remove(id))
            .await
            .is_some()
    }

    /// `POST {PATH}/{id}/{action}` for feature-specific transitions; the
    /// backend answers with the updated record.
    pub async fn perform<B>(&self, id: Uuid, action: &'static str, body: &B) -> Option<R>
    where
        B: Serialize + ?Sized + Sync,
    {
        let epoch = self.start().await;
        let path = format!("{}/{}", Self::item_path(id), action);
        let result = self.client.post::<R, _>(&path, body).await;
        self.finish(epoch, None, action, result, |s, item| s.upsert(item.clone()))
            .await
    }
}
