use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::search_configuration::SearchType;

/// Versión actual del formato persistido del historial
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Entrada del historial de búsquedas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItem {
    pub id: String,
    pub query: String,
    pub search_type: SearchType,
    /// Instantánea opaca de los filtros activos
    #[serde(default)]
    pub filters: serde_json::Value,
    /// Epoch millis
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
}

/// Datos de una búsqueda que se quiere registrar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSearchHistoryEntry {
    pub query: String,
    pub search_type: SearchType,
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub result_count: Option<u64>,
}

impl SearchHistoryItem {
    /// Crea una entrada con id nuevo y la hora actual
    pub fn from_entry(entry: NewSearchHistoryEntry) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: entry.query,
            search_type: entry.search_type,
            filters: entry.filters,
            timestamp: Utc::now().timestamp_millis(),
            result_count: entry.result_count,
        }
    }

    /// Dos búsquedas son la misma si coinciden consulta y filtros (por valor)
    pub fn is_same_search(&self, query: &str, filters: &serde_json::Value) -> bool {
        self.query == query && &self.filters == filters
    }
}

/// Documento persistido: lista más reciente primero con versión de esquema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHistory {
    pub version: u32,
    pub items: Vec<SearchHistoryItem>,
}

impl StoredHistory {
    pub fn new(items: Vec<SearchHistoryItem>) -> Self {
        Self {
            version: HISTORY_SCHEMA_VERSION,
            items,
        }
    }
}
