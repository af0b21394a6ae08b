//! In-process [`DocumentRepository`] backend.
//!
//! Keeps documents in a map and counts calls, which makes it the backend of
//! choice for tests and for dry runs that must not touch the network.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::factory::{RepoConfig, RepositoryFactory};
use super::repository::{DocumentRepository, ListQuery, Page, RepositoryError, StoredDocument};

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    documents: BTreeMap<String, Value>,
    /// When set, every write fails with this error.
    write_failure: Option<RepositoryError>,
}

#[derive(Debug)]
pub struct MemoryRepository {
    resource: String,
    store: Mutex<Store>,
    writes: AtomicUsize,
}

impl MemoryRepository {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            store: Mutex::new(Store::default()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seeds a document under a fixed id.
    pub fn insert(
        &self,
        id: impl Into<String>,
        data: Value,
    ) -> Result<(), RepositoryError> {
        self.store()?.documents.insert(id.into(), data);
        Ok(())
    }

    /// Makes every later `create`/`update` fail with `error`.
    pub fn fail_writes_with(
        &self,
        error: RepositoryError,
    ) -> Result<(), RepositoryError> {
        self.store()?.write_failure = Some(error);
        Ok(())
    }

    /// Number of `create`/`update` calls received, successful or not.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Connection("memory store lock poisoned".to_string()))
    }

    fn begin_write(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let store = self.store()?;
        match &store.write_failure {
            Some(error) => Err(error.clone()),
            None => Ok(store),
        }
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    fn resource(&self) -> &str {
        &self.resource
    }

    async fn list(
        &self,
        query: &ListQuery,
    ) -> Result<Page<StoredDocument>, RepositoryError> {
        let store = self.store()?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<StoredDocument> = store
            .documents
            .iter()
            .filter(|(_, data)| match &needle {
                Some(needle) => data.to_string().to_lowercase().contains(needle),
                None => true,
            })
            .map(|(id, data)| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        let page_size = query.page_size.max(1) as usize;
        let total_pages = matching.len().div_ceil(page_size) as u32;
        let skip = (query.page.max(1) as usize - 1) * page_size;
        let items = matching.into_iter().skip(skip).take(page_size).collect();

        Ok(Page { items, total_pages })
    }

    async fn get(
        &self,
        id: &str,
    ) -> Result<StoredDocument, RepositoryError> {
        let store = self.store()?;
        let data = store.documents.get(id).ok_or(RepositoryError::NotFound)?;
        Ok(StoredDocument {
            id: id.to_string(),
            data: data.clone(),
        })
    }

    async fn create(
        &self,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError> {
        let mut store = self.begin_write()?;
        store.next_id += 1;
        let id = format!("{}-{}", self.resource, store.next_id);
        store.documents.insert(id.clone(), payload.clone());
        debug!(resource = %self.resource, %id, "created document");
        Ok(StoredDocument {
            id,
            data: payload.clone(),
        })
    }

    async fn update(
        &self,
        id: &str,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError> {
        let mut store = self.begin_write()?;
        let slot = store
            .documents
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = payload.clone();
        debug!(resource = %self.resource, %id, "updated document");
        Ok(StoredDocument {
            id: id.to_string(),
            data: payload.clone(),
        })
    }

    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        self.store()?
            .documents
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. Each call yields a
/// fresh, empty collection.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &RepoConfig,
        resource: &str,
    ) -> Result<Box<dyn DocumentRepository>, RepositoryError> {
        Ok(Box::new(MemoryRepository::new(resource)))
    }
}
