use async_trait::async_trait;

use crate::application::dtos::search_dto::{SearchRequest, SearchResultsDto};
use crate::common::errors::DomainError;

/// Puerto secundario para el backend de búsqueda
#[async_trait]
pub trait RemoteSearchPort: Send + Sync + 'static {
    /// Despacha la petición al endpoint correspondiente y devuelve la página pedida
    async fn search(
        &self,
        request: &SearchRequest,
        page: u32,
        size: u32,
    ) -> Result<SearchResultsDto, DomainError>;
}

/// Puerto secundario para un almacén clave-valor persistente
#[async_trait]
pub trait KeyValueStorePort: Send + Sync + 'static {
    /// Lee el valor de una clave, `None` si no existe
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Escribe el valor completo de una clave
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Elimina una clave; eliminar una clave inexistente no es un error
    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
