use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::inbound::SearchHistoryUseCase;
use crate::application::ports::outbound::KeyValueStorePort;
use crate::common::config::HistoryConfig;
use crate::common::errors::Result;
use crate::domain::entities::search_history::{
    NewSearchHistoryEntry, SearchHistoryItem, StoredHistory, HISTORY_SCHEMA_VERSION,
};

/// Formatos aceptados al leer: el documento versionado o la lista antigua sin versión
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedHistory {
    Versioned(StoredHistory),
    Legacy(Vec<SearchHistoryItem>),
}

/**
 * Servicio de historial de búsquedas.
 *
 * Mantiene una lista acotada, sin duplicados y ordenada de más reciente a
 * más antigua en un almacén clave-valor. Si no hay almacén (`None`) todas
 * las operaciones son no-ops y las lecturas devuelven una lista vacía.
 */
pub struct SearchHistoryService {
    store: Option<Arc<dyn KeyValueStorePort>>,
    storage_key: String,
    max_entries: usize,
    /// Serializa los ciclos leer-modificar-escribir
    write_lock: Mutex<()>,
}

impl SearchHistoryService {
    pub fn new(store: Option<Arc<dyn KeyValueStorePort>>, config: &HistoryConfig) -> Self {
        if store.is_none() {
            info!("Search history disabled: no persistent store available");
        }

        Self {
            store,
            storage_key: config.storage_key.clone(),
            max_entries: config.max_entries,
            write_lock: Mutex::new(()),
        }
    }

    /// Servicio sin almacenamiento persistente
    pub fn disabled(config: &HistoryConfig) -> Self {
        Self::new(None, config)
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Lee la lista persistida.
    ///
    /// Sólo falla si el almacén no responde; un contenido corrupto o de una
    /// versión futura cuenta como lista vacía y la siguiente escritura lo reemplaza.
    async fn read_items(&self, store: &dyn KeyValueStorePort) -> Result<Vec<SearchHistoryItem>> {
        let Some(raw) = store.get(&self.storage_key).await? else {
            return Ok(Vec::new());
        };

        let items = match serde_json::from_str::<PersistedHistory>(&raw) {
            Ok(PersistedHistory::Versioned(stored)) if stored.version > HISTORY_SCHEMA_VERSION => {
                warn!(
                    "Search history has unsupported schema version {} (supported: {}), ignoring it",
                    stored.version, HISTORY_SCHEMA_VERSION
                );
                Vec::new()
            }
            Ok(PersistedHistory::Versioned(stored)) => stored.items,
            Ok(PersistedHistory::Legacy(items)) => {
                debug!("Read {} search history entries in legacy format", items.len());
                items
            }
            Err(e) => {
                error!("Error parsing search history, treating it as empty: {}", e);
                Vec::new()
            }
        };
        Ok(items)
    }

    async fn write_items(&self, store: &dyn KeyValueStorePort, items: Vec<SearchHistoryItem>) {
        let json = match serde_json::to_string(&StoredHistory::new(items)) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize search history: {}", e);
                return;
            }
        };

        if let Err(e) = store.set(&self.storage_key, &json).await {
            error!("Failed to save search history: {}", e);
        }
    }
}

#[async_trait]
impl SearchHistoryUseCase for SearchHistoryService {
    #[instrument(skip(self, entry), fields(query = %entry.query))]
    async fn save(&self, entry: NewSearchHistoryEntry) -> Option<SearchHistoryItem> {
        let store = self.store.as_deref()?;
        let _guard = self.write_lock.lock().await;

        let mut items = match self.read_items(store).await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to read search history, entry not saved: {}", e);
                return None;
            }
        };

        let item = SearchHistoryItem::from_entry(entry);

        items.retain(|existing| !existing.is_same_search(&item.query, &item.filters));
        items.insert(0, item.clone());
        items.truncate(self.max_entries);

        debug!("Search history now holds {} entries", items.len());
        self.write_items(store, items).await;
        Some(item)
    }

    async fn get_all(&self) -> Vec<SearchHistoryItem> {
        let Some(store) = self.store.as_deref() else {
            return Vec::new();
        };

        self.read_items(store).await.unwrap_or_else(|e| {
            error!("Failed to read search history: {}", e);
            Vec::new()
        })
    }

    #[instrument(skip(self))]
    async fn clear(&self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        let _guard = self.write_lock.lock().await;

        if let Err(e) = store.remove(&self.storage_key).await {
            error!("Failed to clear search history: {}", e);
        }
    }

    #[instrument(skip(self))]
    async fn remove_one(&self, id: &str) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        let _guard = self.write_lock.lock().await;

        let mut items = match self.read_items(store).await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to read search history, entry {} not removed: {}", id, e);
                return;
            }
        };
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            debug!("Search history entry {} not found", id);
            return;
        }
        self.write_items(store, items).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::common::errors::DomainError;
    use crate::domain::entities::search_configuration::SearchType;
    use crate::infrastructure::repositories::memory_kv_store::InMemoryKeyValueStore;
    use serde_json::json;

    fn config(max_entries: usize) -> HistoryConfig {
        HistoryConfig {
            storage_key: "testHistory".to_string(),
            max_entries,
            data_dir: None,
        }
    }

    fn entry(query: &str, filters: serde_json::Value) -> NewSearchHistoryEntry {
        NewSearchHistoryEntry {
            query: query.to_string(),
            search_type: SearchType::Basic,
            filters,
            result_count: None,
        }
    }

    fn service_with_store(max_entries: usize) -> (SearchHistoryService, Arc<InMemoryKeyValueStore>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = SearchHistoryService::new(Some(store.clone()), &config(max_entries));
        (service, store)
    }

    /// Almacén que falla en todas las operaciones
    struct FailingStore;

    #[async_trait]
    impl KeyValueStorePort for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(DomainError::internal_error("KeyValueStore", "read failed"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(DomainError::internal_error("KeyValueStore", "quota exceeded"))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(DomainError::internal_error("KeyValueStore", "remove failed"))
        }
    }

    /// Almacén en memoria cuya próxima lectura puede fallar; cuenta las escrituras
    #[derive(Default)]
    struct FlakyReadStore {
        inner: InMemoryKeyValueStore,
        fail_next_read: AtomicBool,
        writes: AtomicUsize,
    }

    impl FlakyReadStore {
        fn fail_next_read(&self) {
            self.fail_next_read.store(true, Ordering::SeqCst);
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyValueStorePort for FlakyReadStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_next_read.swap(false, Ordering::SeqCst) {
                return Err(DomainError::internal_error("KeyValueStore", "storage temporarily unavailable"));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    async fn flaky_service_with_entries(count: usize) -> (SearchHistoryService, Arc<FlakyReadStore>) {
        let store = Arc::new(FlakyReadStore::default());
        let service = SearchHistoryService::new(Some(store.clone()), &config(20));
        for i in 0..count {
            service.save(entry(&format!("q{}", i), json!({}))).await;
        }
        (service, store)
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest() {
        let (service, _store) = service_with_store(20);

        for i in 0..21 {
            service.save(entry(&format!("query {}", i), json!({}))).await;
        }

        let items = service.get_all().await;
        assert_eq!(items.len(), 20);
        assert_eq!(items[0].query, "query 20");
        assert_eq!(items[19].query, "query 1");
        assert!(items.iter().all(|item| item.query != "query 0"));
    }

    #[tokio::test]
    async fn test_duplicate_moves_to_front() {
        let (service, _store) = service_with_store(20);

        let first = service.save(entry("invoice", json!({ "sortBy": "name" }))).await.unwrap();
        service.save(entry("contract", json!({}))).await;
        let again = service.save(entry("invoice", json!({ "sortBy": "name" }))).await.unwrap();

        let items = service.get_all().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, again.id);
        assert_ne!(first.id, again.id);
        assert_eq!(items[1].query, "contract");
    }

    #[tokio::test]
    async fn test_same_query_with_different_filters_is_kept() {
        let (service, _store) = service_with_store(20);

        service.save(entry("invoice", json!({ "sortBy": "name" }))).await;
        service.save(entry("invoice", json!({ "sortBy": "score" }))).await;

        assert_eq!(service.get_all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_one_and_clear() {
        let (service, store) = service_with_store(20);

        let a = service.save(entry("a", json!({}))).await.unwrap();
        let b = service.save(entry("b", json!({}))).await.unwrap();

        service.remove_one(&a.id).await;
        let items = service.get_all().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, b.id);

        service.clear().await;
        assert!(service.get_all().await.is_empty());
        assert_eq!(store.get("testHistory").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persisted_document_is_versioned() {
        let (service, store) = service_with_store(20);
        service.save(entry("a", json!({}))).await;

        let raw = store.get("testHistory").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], HISTORY_SCHEMA_VERSION);
        assert_eq!(value["items"][0]["query"], "a");
    }

    #[tokio::test]
    async fn test_reads_legacy_array_format() {
        let (service, store) = service_with_store(20);
        let legacy = json!([{
            "id": "1700000000000",
            "query": "old",
            "searchType": "advanced",
            "filters": {},
            "timestamp": 1700000000000i64
        }]);
        store.set("testHistory", &legacy.to_string()).await.unwrap();

        let items = service.get_all().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].search_type, SearchType::Advanced);
    }

    #[tokio::test]
    async fn test_corrupted_or_future_payload_reads_empty() {
        let (service, store) = service_with_store(20);

        store.set("testHistory", "{not json").await.unwrap();
        assert!(service.get_all().await.is_empty());

        store.set("testHistory", r#"{"version": 99, "items": []}"#).await.unwrap();
        assert!(service.get_all().await.is_empty());

        // Una escritura posterior reemplaza el contenido corrupto
        service.save(entry("fresh", json!({}))).await;
        assert_eq!(service.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_without_store_everything_is_noop() {
        let service = SearchHistoryService::disabled(&config(20));

        assert!(!service.is_enabled());
        assert!(service.save(entry("a", json!({}))).await.is_none());
        assert!(service.get_all().await.is_empty());
        service.clear().await;
        service.remove_one("missing").await;
        assert!(service.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failures_are_swallowed() {
        let service = SearchHistoryService::new(Some(Arc::new(FailingStore)), &config(20));

        let saved = service.save(entry("a", json!({}))).await;
        assert!(saved.is_none());
        assert!(service.get_all().await.is_empty());
        service.clear().await;
        service.remove_one("x").await;
    }

    #[tokio::test]
    async fn test_failed_read_does_not_overwrite_on_save() {
        let (service, store) = flaky_service_with_entries(5).await;

        store.fail_next_read();
        assert!(service.save(entry("new", json!({}))).await.is_none());
        assert_eq!(service.get_all().await.len(), 5);

        assert!(service.save(entry("new", json!({}))).await.is_some());
        let items = service.get_all().await;
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].query, "new");
    }

    #[tokio::test]
    async fn test_failed_read_does_not_overwrite_on_remove() {
        let (service, store) = flaky_service_with_entries(5).await;
        let target = service.get_all().await[2].id.clone();
        let writes_before = store.writes();

        store.fail_next_read();
        service.remove_one(&target).await;

        assert_eq!(store.writes(), writes_before);
        let items = service.get_all().await;
        assert_eq!(items.len(), 5);
        assert!(items.iter().any(|item| item.id == target));
    }

    #[tokio::test]
    async fn test_remove_unknown_id_leaves_document_untouched() {
        let (service, store) = flaky_service_with_entries(5).await;
        let raw_before = store.get("testHistory").await.unwrap();
        let writes_before = store.writes();

        service.remove_one("does-not-exist").await;

        assert_eq!(store.writes(), writes_before);
        assert_eq!(store.get("testHistory").await.unwrap(), raw_before);
        assert_eq!(service.get_all().await.len(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_saves_are_not_lost() {
        use futures::future::join_all;

        let (service, _store) = service_with_store(20);
        let service = Arc::new(service);

        let mut tasks = Vec::new();
        for i in 0..10 {
            let service_clone = service.clone();
            tasks.push(tokio::spawn(async move {
                service_clone.save(entry(&format!("q{}", i), json!({}))).await
            }));
        }

        for result in join_all(tasks).await {
            assert!(result.unwrap().is_some());
        }

        assert_eq!(service.get_all().await.len(), 10);
    }

    #[tokio::test]
    async fn test_custom_cap() {
        let (service, _store) = service_with_store(3);
        for i in 0..5 {
            service.save(entry(&i.to_string(), json!({}))).await;
        }

        let queries: Vec<String> = service.get_all().await.into_iter().map(|i| i.query).collect();
        assert_eq!(queries, vec!["4", "3", "2"]);
    }
}
