use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor HTTP
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Dirección de escucha
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8087)),
        }
    }
}

/// Configuración del backend de búsqueda remoto
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// URL base de la API (ej: http://localhost:8080/api)
    pub base_url: String,
    /// Timeout para las peticiones de búsqueda (ms)
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
            request_timeout_ms: 15000, // 15 segundos
        }
    }
}

impl BackendConfig {
    /// Obtiene un Duration para las peticiones remotas
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Configuración del coordinador de búsqueda
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Ventana de silencio antes de consultar el backend (ms)
    pub debounce_ms: u64,
    /// Retardo adicional tras el debounce antes de despachar (ms, 0 lo desactiva)
    pub commit_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            commit_delay_ms: 0,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Segundo temporizador opcional
    pub fn commit_delay(&self) -> Option<Duration> {
        if self.commit_delay_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.commit_delay_ms))
        }
    }
}

/// Configuración del historial de búsquedas
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Clave bajo la que se persiste la lista completa
    pub storage_key: String,
    /// Número máximo de entradas retenidas
    pub max_entries: usize,
    /// Directorio de datos; sin él no hay almacenamiento persistente
    pub data_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: "searchHistory".to_string(),
            max_entries: 20,
            data_dir: None,
        }
    }
}

/// Configuración global de la aplicación
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub search: SearchConfig,
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno `OXISEARCH_*`,
    /// usando los valores por defecto para las que falten o no se puedan parsear.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "OXISEARCH_BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(url) = lookup("OXISEARCH_BACKEND_URL") {
            config.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_var(&lookup, "OXISEARCH_BACKEND_TIMEOUT_MS") {
            config.backend.request_timeout_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "OXISEARCH_DEBOUNCE_MS") {
            config.search.debounce_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "OXISEARCH_COMMIT_DELAY_MS") {
            config.search.commit_delay_ms = ms;
        }
        if let Some(key) = lookup("OXISEARCH_HISTORY_KEY") {
            config.history.storage_key = key;
        }
        if let Some(max) = parse_var(&lookup, "OXISEARCH_HISTORY_MAX") {
            config.history.max_entries = max;
        }
        if let Some(dir) = lookup("OXISEARCH_DATA_DIR") {
            config.history.data_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.commit_delay(), None);
        assert_eq!(config.history.max_entries, 20);
        assert_eq!(config.history.storage_key, "searchHistory");
        assert!(config.history.data_dir.is_none());
    }

    #[test]
    fn test_env_overrides_and_invalid_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OXISEARCH_BACKEND_URL", "http://dms.local/api/"),
            ("OXISEARCH_DEBOUNCE_MS", "150"),
            ("OXISEARCH_COMMIT_DELAY_MS", "500"),
            ("OXISEARCH_HISTORY_MAX", "not-a-number"),
            ("OXISEARCH_DATA_DIR", "/var/lib/oxisearch"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://dms.local/api");
        assert_eq!(config.search.debounce(), Duration::from_millis(150));
        assert_eq!(config.search.commit_delay(), Some(Duration::from_millis(500)));
        assert_eq!(config.history.max_entries, 20);
        assert_eq!(config.history.data_dir, Some(PathBuf::from("/var/lib/oxisearch")));
    }
}
