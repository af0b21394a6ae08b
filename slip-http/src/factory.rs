use async_trait::async_trait;
use slip_core::db::{DocumentRepository, RepoConfig, RepositoryError, RepositoryFactory};

use crate::repository::HttpRepository;

/// [`RepositoryFactory`] for the REST backend.
///
/// Register this with a [`slip_core::db::RepositoryRegistry`] to make the
/// `"http"` backend available:
///
/// ```rust,no_run
/// use slip_core::db::RepositoryRegistry;
/// use slip_http::HttpRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(HttpRepositoryFactory));
/// ```
pub struct HttpRepositoryFactory;

#[async_trait]
impl RepositoryFactory for HttpRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    /// Uses `config.base_url`, `config.api_token` and `config.timeout_secs`.
    async fn create(
        &self,
        config: &RepoConfig,
        resource: &str,
    ) -> Result<Box<dyn DocumentRepository>, RepositoryError> {
        Ok(Box::new(HttpRepository::new(config, resource)?))
    }
}
