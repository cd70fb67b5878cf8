use std::sync::Arc;

use crate::application::ports::inbound::{SearchHistoryUseCase, SearchUseCase};
use crate::application::ports::outbound::{KeyValueStorePort, RemoteSearchPort};
use crate::application::services::search_history_service::SearchHistoryService;
use crate::application::services::search_service::SearchService;
use crate::common::config::AppConfig;
use crate::common::errors::DomainError;
use crate::infrastructure::repositories::file_kv_store::FileKeyValueStore;
use crate::infrastructure::services::http_search_client::HttpSearchClient;

/// Fábrica para crear los servicios de la aplicación desde la configuración
pub struct AppServiceFactory {
    config: AppConfig,
}

impl AppServiceFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Almacén persistente del historial, si hay directorio de datos
    pub async fn create_history_store(&self) -> Option<Arc<dyn KeyValueStorePort>> {
        let data_dir = self.config.history.data_dir.clone()?;

        match FileKeyValueStore::new(data_dir).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::error!("Failed to initialize history store, history disabled: {}", e);
                None
            }
        }
    }

    /// Construye el estado completo con el cliente HTTP real
    pub async fn create_app_state(&self) -> Result<AppState, DomainError> {
        let remote: Arc<dyn RemoteSearchPort> = Arc::new(HttpSearchClient::new(&self.config.backend)?);
        let store = self.create_history_store().await;

        Ok(self.create_app_state_with(remote, store))
    }

    /// Construye el estado con puertos explícitos (usado también en pruebas)
    pub fn create_app_state_with(
        &self,
        remote: Arc<dyn RemoteSearchPort>,
        store: Option<Arc<dyn KeyValueStorePort>>,
    ) -> AppState {
        let history_service = Arc::new(SearchHistoryService::new(store, &self.config.history));
        let search_service = Arc::new(SearchService::new(
            remote,
            history_service.clone(),
            self.config.search.clone(),
        ));

        AppState {
            config: self.config.clone(),
            search_service,
            history_service,
        }
    }
}

/// Estado global de la aplicación para dependency injection
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub search_service: Arc<dyn SearchUseCase>,
    pub history_service: Arc<dyn SearchHistoryUseCase>,
}
