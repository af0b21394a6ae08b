mod factory;
mod repository;

pub use factory::HttpRepositoryFactory;
pub use repository::HttpRepository;
