//! Business logic services layer

pub mod auth_service;
pub mod balance_service;
pub mod catalog_service;

pub use auth_service::AuthService;
pub use balance_service::EthereumClient;
pub use catalog_service::CatalogService;
