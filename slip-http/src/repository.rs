//! REST backend for [`DocumentRepository`].
//!
//! # Wire format
//!
//! | Call     | Request                                   | `data` on success          |
//! |----------|-------------------------------------------|----------------------------|
//! | `list`   | `GET  {base}/{resource}?search&page&limit` | `{ items, totalPages }`    |
//! | `get`    | `GET  {base}/{resource}/{id}`             | the document               |
//! | `create` | `POST {base}/{resource}`                  | the stored document        |
//! | `update` | `PUT  {base}/{resource}/{id}`             | the stored document        |
//! | `delete` | `DELETE {base}/{resource}/{id}`           | ignored                    |
//!
//! `{id}` is percent-encoded as one path segment.
//!
//! Every response body is an envelope `{ "success": bool, "data": .. }`;
//! failures carry `{ "message": ".." }` instead of `data`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use slip_core::db::{
    DocumentRepository, ListQuery, Page, RepoConfig, RepositoryError, StoredDocument,
};
use tracing::{debug, error, instrument};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListData {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    total_pages: u32,
}

pub struct HttpRepository {
    client: Client,
    /// `{base}/{resource}`, already validated as a base URL.
    collection: Url,
    resource: String,
    api_token: Option<String>,
}

impl HttpRepository {
    /// Builds a client for one collection.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] if the base URL is blank or not
    /// an absolute http(s) URL, or if the HTTP client cannot be built.
    pub fn new(
        config: &RepoConfig,
        resource: &str,
    ) -> Result<Self, RepositoryError> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(RepositoryError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }
        let collection = join_segment(
            Url::parse(base_url)
                .map_err(|e| RepositoryError::Configuration(format!("invalid base_url: {e}")))?,
            resource,
        )?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            collection,
            resource: resource.to_string(),
            api_token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn collection_url(&self) -> Url {
        self.collection.clone()
    }

    /// The document's URL; `id` is percent-encoded as a single segment.
    fn document_url(
        &self,
        id: &str,
    ) -> Result<Url, RepositoryError> {
        join_segment(self.collection.clone(), id)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
    ) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and unwraps the envelope's `data`.
    async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<Value, RepositoryError> {
        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "request failed");
            RepositoryError::Connection(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound);
        }
        let envelope = serde_json::from_str::<Envelope>(&body);
        if !status.is_success() {
            let message = envelope
                .ok()
                .and_then(|e| e.message)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            return Err(RepositoryError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = envelope.map_err(|e| RepositoryError::Decode(e.to_string()))?;
        if envelope.success == Some(false) {
            return Err(RepositoryError::Backend {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(envelope.data)
    }
}

/// Appends `segment` to `url`'s path, dropping a trailing empty segment first.
fn join_segment(
    mut url: Url,
    segment: &str,
) -> Result<Url, RepositoryError> {
    if url.cannot_be_a_base() {
        return Err(RepositoryError::Configuration(format!(
            "'{url}' cannot be a base URL"
        )));
    }
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    Ok(url)
}

/// Reads the document id from `_id` or `id`, falling back to `fallback`.
fn document_id(
    data: &Value,
    fallback: Option<&str>,
) -> Result<String, RepositoryError> {
    let id = ["_id", "id"]
        .iter()
        .find_map(|key| match data.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| fallback.map(str::to_string));
    id.ok_or_else(|| RepositoryError::Decode("document has no id".to_string()))
}

fn stored(
    data: Value,
    fallback: Option<&str>,
) -> Result<StoredDocument, RepositoryError> {
    let id = document_id(&data, fallback)?;
    Ok(StoredDocument { id, data })
}

#[async_trait]
impl DocumentRepository for HttpRepository {
    fn resource(&self) -> &str {
        &self.resource
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    async fn list(
        &self,
        query: &ListQuery,
    ) -> Result<Page<StoredDocument>, RepositoryError> {
        let mut params = vec![
            ("page", query.page.max(1).to_string()),
            ("limit", query.page_size.max(1).to_string()),
        ];
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search.to_string()));
        }
        let data = self
            .send(self.request(Method::GET, self.collection_url()).query(&params))
            .await?;
        let list: ListData =
            serde_json::from_value(data).map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let items = list
            .items
            .into_iter()
            .map(|item| stored(item, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total_pages: list.total_pages,
        })
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    async fn get(
        &self,
        id: &str,
    ) -> Result<StoredDocument, RepositoryError> {
        let data = self
            .send(self.request(Method::GET, self.document_url(id)?))
            .await?;
        stored(data, Some(id))
    }

    #[instrument(skip(self, payload), fields(resource = %self.resource))]
    async fn create(
        &self,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError> {
        let data = self
            .send(self.request(Method::POST, self.collection_url()).json(payload))
            .await?;
        stored(data, None)
    }

    #[instrument(skip(self, payload), fields(resource = %self.resource))]
    async fn update(
        &self,
        id: &str,
        payload: &Value,
    ) -> Result<StoredDocument, RepositoryError> {
        let data = self
            .send(self.request(Method::PUT, self.document_url(id)?).json(payload))
            .await?;
        stored(data, Some(id))
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        self.send(self.request(Method::DELETE, self.document_url(id)?))
            .await
            .map(|_| ())
    }
}
