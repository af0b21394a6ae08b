use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A document as the backend returns it: its id plus the raw JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Filter and page selection for [`DocumentRepository::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

/// CRUD access to one document collection (delivery slips, loading slips, ...).
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Collection name, e.g. `"delivery-slips"`.
    fn resource(&self) -> &str;

    async fn list(
        &self,
        query: &ListQuery,
    ) -> Result<Page<StoredDocument>, RepositoryError>;

    async fn get(
        &self,
        id: &str,
    ) -> Result<StoredDocument, RepositoryError>;

    async fn create(
        &self,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError>;

    async fn update(
        &self,
        id: &str,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError>;

    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError>;
}
