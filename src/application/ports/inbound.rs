use async_trait::async_trait;

use crate::application::dtos::search_dto::{SearchResultItem, SearchResultsDto, ShareableLinkDto};
use crate::common::errors::DomainError;
use crate::domain::entities::search_configuration::SearchConfiguration;
use crate::domain::entities::search_history::{NewSearchHistoryEntry, SearchHistoryItem};

/**
 * Puerto primario para búsqueda de carpetas y documentos
 *
 * Normaliza una configuración de búsqueda, la despacha al backend y la
 * registra en el historial.
 */
#[async_trait]
pub trait SearchUseCase: Send + Sync + 'static {
    /**
     * Ejecuta una búsqueda explícita
     *
     * @param config Configuración de búsqueda ya normalizada
     * @return Resultados autoritativos del backend; los fallos remotos se propagan
     */
    async fn search(&self, config: SearchConfiguration) -> Result<SearchResultsDto, DomainError>;

    /// Genera el enlace compartible de una configuración
    fn shareable_link(&self, config: &SearchConfiguration) -> ShareableLinkDto;

    /// Filtra en local una página ya obtenida
    fn rank_local(&self, query: &str, items: &[SearchResultItem]) -> Vec<SearchResultItem>;
}

/**
 * Puerto primario para el historial de búsquedas
 *
 * Ninguna operación falla: el historial es una comodidad y los errores de
 * almacenamiento se registran y se degradan a valores seguros.
 */
#[async_trait]
pub trait SearchHistoryUseCase: Send + Sync + 'static {
    /// Registra una búsqueda; `None` si no hay almacenamiento persistente
    async fn save(&self, entry: NewSearchHistoryEntry) -> Option<SearchHistoryItem>;

    /// Historial completo, más reciente primero
    async fn get_all(&self) -> Vec<SearchHistoryItem>;

    /// Borra todo el historial
    async fn clear(&self);

    /// Borra una entrada concreta
    async fn remove_one(&self, id: &str);
}
