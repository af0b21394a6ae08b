pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{RepoConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{MemoryRepository, MemoryRepositoryFactory};
pub use repository::{DocumentRepository, ListQuery, Page, RepositoryError, StoredDocument};
