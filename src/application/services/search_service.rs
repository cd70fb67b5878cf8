use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::application::dtos::search_dto::{SearchResultItem, SearchResultsDto, ShareableLinkDto};
use crate::application::ports::inbound::{SearchHistoryUseCase, SearchUseCase};
use crate::application::ports::outbound::RemoteSearchPort;
use crate::application::services::request_adapter::adapt;
use crate::application::services::search_coordinator::SearchCoordinator;
use crate::application::services::search_params_codec;
use crate::common::config::SearchConfig;
use crate::common::errors::Result;
use crate::domain::entities::search_configuration::{FilterBag, SearchConfiguration};
use crate::domain::entities::search_history::NewSearchHistoryEntry;
use crate::domain::services::local_ranking::rank_locally;

/**
 * Servicio de búsqueda de carpetas y documentos.
 *
 * Adapta cada configuración a la forma de petición de su endpoint, la
 * despacha al backend y registra la búsqueda en el historial. Los fallos
 * del backend se propagan al llamante; los del historial nunca.
 */
pub struct SearchService {
    /// Backend de búsqueda
    remote: Arc<dyn RemoteSearchPort>,

    /// Historial de búsquedas
    history: Arc<dyn SearchHistoryUseCase>,

    /// Tiempos del coordinador para las sesiones interactivas
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        remote: Arc<dyn RemoteSearchPort>,
        history: Arc<dyn SearchHistoryUseCase>,
        config: SearchConfig,
    ) -> Self {
        Self {
            remote,
            history,
            config,
        }
    }

    /// Abre una sesión interactiva (búsqueda mientras se escribe) sobre el mismo backend
    pub fn session(&self) -> SearchCoordinator {
        SearchCoordinator::new(self.remote.clone(), &self.config)
    }

    fn history_entry(config: &SearchConfiguration, results: &SearchResultsDto) -> NewSearchHistoryEntry {
        let filters = match serde_json::to_value(FilterBag::from_filters(&config.filters)) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to snapshot search filters for history: {}", e);
                serde_json::Value::Null
            }
        };

        NewSearchHistoryEntry {
            query: config.query_text().to_string(),
            search_type: config.search_type(),
            filters,
            result_count: Some(results.page.total_elements.max(results.items.len() as u64)),
        }
    }
}

#[async_trait]
impl SearchUseCase for SearchService {
    #[instrument(skip(self, config), fields(search_type = %config.search_type(), page = config.page))]
    async fn search(&self, config: SearchConfiguration) -> Result<SearchResultsDto> {
        let request = adapt(&config);

        let results = match self.remote.search(&request, config.page, config.size).await {
            Ok(results) => results,
            Err(e) => {
                error!("Search failed: {}", e);
                return Err(e);
            }
        };

        info!(
            "Search completed: {} items on this page, {} in total",
            results.items.len(),
            results.page.total_elements
        );

        self.history.save(Self::history_entry(&config, &results)).await;
        Ok(results)
    }

    fn shareable_link(&self, config: &SearchConfiguration) -> ShareableLinkDto {
        ShareableLinkDto {
            query: search_params_codec::to_query_string(config),
            params: search_params_codec::encode(config),
        }
    }

    fn rank_local(&self, query: &str, items: &[SearchResultItem]) -> Vec<SearchResultItem> {
        rank_locally(query, items)
    }
}
