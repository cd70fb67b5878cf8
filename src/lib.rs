// Exportar los módulos principales del proyecto
pub mod common;
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod interfaces;

// Re-exportaciones públicas comunes
pub use application::services::search_coordinator::{SearchCoordinator, SearchSnapshot};
pub use application::services::search_history_service::SearchHistoryService;
pub use application::services::search_service::SearchService;
pub use common::config::AppConfig;
pub use common::errors::{DomainError, ErrorKind};
pub use domain::entities::search_configuration::{SearchConfiguration, SearchFilters, SearchType};
pub use infrastructure::services::http_search_client::HttpSearchClient;
