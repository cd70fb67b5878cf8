use std::fmt;

use serde::{Deserialize, Serialize};

/// Página por defecto (base cero)
pub const DEFAULT_PAGE: u32 = 0;

/// Tamaño de página por defecto
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Modo de búsqueda; selecciona el endpoint y la forma de la petición
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Basic,
    Advanced,
    Unified,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Basic => "basic",
            SearchType::Advanced => "advanced",
            SearchType::Unified => "unified",
        }
    }

    /// Interpreta el texto recibido; cualquier valor desconocido cae en `Basic`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "advanced" => SearchType::Advanced,
            "unified" => SearchType::Unified,
            "basic" => SearchType::Basic,
            other => {
                tracing::debug!("Unknown search type {:?}, falling back to basic", other);
                SearchType::Basic
            }
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup toggles and sort order shared by every search type.
///
/// Every field is optional: `None` means "use the default of the target
/// request shape", which differs between basic and unified searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_folder_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_document_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_metadata_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_metadata_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_category_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_ocr_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up_description: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_folders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_documents: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_desc: Option<bool>,
}

/// Comparison applied by a metadata condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
}

/// Condición sobre un campo de metadatos de una categoría
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFilter {
    pub metadata_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_name: Option<String>,
    #[serde(default)]
    pub operator: MetadataOperator,
    pub value: String,
}

/// Categoría seleccionada en una búsqueda avanzada
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySelection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata_filters: Vec<MetadataFilter>,
}

/// Campos sobre los que actúa una búsqueda avanzada
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_in_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_in_description: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_in_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_in_ocr_text: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Documents,
    Folders,
    Both,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Documents => "documents",
            ContentType::Folders => "folders",
            ContentType::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "documents" => Some(ContentType::Documents),
            "folders" => Some(ContentType::Folders),
            "both" => Some(ContentType::Both),
            _ => None,
        }
    }
}

/// Rango de fechas de creación (texto ISO tal como lo envía el cliente)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedFilters {
    pub lookup: LookupFilters,
    pub date_range: Option<DateRange>,
}

/// Advanced-only filters.
///
/// `category` holds a single selection: the backend honors one category
/// filter per advanced request. Extra selections arriving in a
/// [`FilterBag`] are dropped with a warning when it is converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedFilters {
    pub lookup: LookupFilters,
    pub category: Option<CategorySelection>,
    pub search_scope: Option<SearchScope>,
    pub content_type: Option<ContentType>,
    pub date_range: Option<DateRange>,
}

/// Filtros de búsqueda discriminados por tipo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilters {
    Basic(LookupFilters),
    Advanced(AdvancedFilters),
    Unified(UnifiedFilters),
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters::Basic(LookupFilters::default())
    }
}

impl SearchFilters {
    /// Filtros vacíos para el tipo indicado
    pub fn empty(search_type: SearchType) -> Self {
        match search_type {
            SearchType::Basic => SearchFilters::Basic(LookupFilters::default()),
            SearchType::Advanced => SearchFilters::Advanced(AdvancedFilters::default()),
            SearchType::Unified => SearchFilters::Unified(UnifiedFilters::default()),
        }
    }

    pub fn search_type(&self) -> SearchType {
        match self {
            SearchFilters::Basic(_) => SearchType::Basic,
            SearchFilters::Advanced(_) => SearchType::Advanced,
            SearchFilters::Unified(_) => SearchType::Unified,
        }
    }

    pub fn lookup(&self) -> &LookupFilters {
        match self {
            SearchFilters::Basic(lookup) => lookup,
            SearchFilters::Advanced(advanced) => &advanced.lookup,
            SearchFilters::Unified(unified) => &unified.lookup,
        }
    }
}

/**
 * Flat, untyped view of the filters as the web client sends them.
 *
 * This is the shape of the `filters` object in JSON bodies and of the
 * opaque snapshot stored in the search history. It converts into the typed
 * [`SearchFilters`] once the search type is known.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBag {
    #[serde(flatten)]
    pub lookup: LookupFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_categories: Option<Vec<CategorySelection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_scope: Option<SearchScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl FilterBag {
    pub fn from_filters(filters: &SearchFilters) -> Self {
        match filters {
            SearchFilters::Basic(lookup) => Self {
                lookup: lookup.clone(),
                ..Default::default()
            },
            SearchFilters::Unified(unified) => Self {
                lookup: unified.lookup.clone(),
                date_range: unified.date_range.clone(),
                ..Default::default()
            },
            SearchFilters::Advanced(advanced) => Self {
                lookup: advanced.lookup.clone(),
                selected_categories: advanced.category.clone().map(|c| vec![c]),
                search_scope: advanced.search_scope.clone(),
                content_type: advanced.content_type,
                date_range: advanced.date_range.clone(),
            },
        }
    }

    /// Construye los filtros tipados, descartando los campos que no aplican
    pub fn into_filters(self, search_type: SearchType) -> SearchFilters {
        match search_type {
            SearchType::Basic => {
                self.log_ignored(search_type, self.has_advanced_fields() || self.date_range.is_some());
                SearchFilters::Basic(self.lookup)
            }
            SearchType::Unified => {
                self.log_ignored(search_type, self.has_advanced_fields());
                SearchFilters::Unified(UnifiedFilters {
                    lookup: self.lookup,
                    date_range: self.date_range,
                })
            }
            SearchType::Advanced => {
                let category = self.selected_categories.and_then(|categories| {
                    if categories.len() > 1 {
                        tracing::warn!(
                            "Advanced search accepts a single category; keeping {:?} and dropping {} more",
                            categories[0].name,
                            categories.len() - 1
                        );
                    }
                    categories.into_iter().next()
                });

                SearchFilters::Advanced(AdvancedFilters {
                    lookup: self.lookup,
                    category,
                    search_scope: self.search_scope,
                    content_type: self.content_type,
                    date_range: self.date_range,
                })
            }
        }
    }

    fn has_advanced_fields(&self) -> bool {
        self.selected_categories.is_some() || self.search_scope.is_some() || self.content_type.is_some()
    }

    fn log_ignored(&self, search_type: SearchType, ignored: bool) {
        if ignored {
            tracing::debug!("Ignoring filters that do not apply to {} search", search_type);
        }
    }
}

/// Representación canónica de una intención de búsqueda
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SearchConfigurationWire", into = "SearchConfigurationWire")]
pub struct SearchConfiguration {
    pub query: Option<String>,
    pub filters: SearchFilters,
    pub page: u32,
    pub size: u32,
}

impl Default for SearchConfiguration {
    fn default() -> Self {
        Self {
            query: None,
            filters: SearchFilters::default(),
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchConfiguration {
    pub fn new<S: Into<String>>(query: S, filters: SearchFilters) -> Self {
        Self {
            query: Some(query.into()),
            filters,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    pub fn search_type(&self) -> SearchType {
        self.filters.search_type()
    }

    /// Texto de la consulta, vacío si no hay ninguno
    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }
}

/// JSON shape of a configuration: `{query, searchType, filters, page, size}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConfigurationWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(default)]
    search_type: Option<String>,
    #[serde(default)]
    filters: Option<FilterBag>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    size: Option<u32>,
}

impl From<SearchConfigurationWire> for SearchConfiguration {
    fn from(wire: SearchConfigurationWire) -> Self {
        let search_type = wire
            .search_type
            .as_deref()
            .map(SearchType::parse)
            .unwrap_or_default();

        Self {
            query: wire.query,
            filters: wire.filters.unwrap_or_default().into_filters(search_type),
            page: wire.page.unwrap_or(DEFAULT_PAGE),
            size: wire.size.filter(|size| *size > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

impl From<SearchConfiguration> for SearchConfigurationWire {
    fn from(config: SearchConfiguration) -> Self {
        Self {
            search_type: Some(config.search_type().as_str().to_string()),
            filters: Some(FilterBag::from_filters(&config.filters)),
            query: config.query,
            page: Some(config.page),
            size: Some(config.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(id: &str) -> CategorySelection {
        CategorySelection {
            id: id.to_string(),
            name: format!("Category {}", id),
            metadata_filters: vec![],
        }
    }

    #[test]
    fn test_unknown_search_type_falls_back_to_basic() {
        assert_eq!(SearchType::parse("semantic"), SearchType::Basic);
        assert_eq!(SearchType::parse("ADVANCED"), SearchType::Advanced);
        assert_eq!(SearchType::parse(" unified "), SearchType::Unified);
    }

    #[test]
    fn test_json_body_defaults() {
        let config: SearchConfiguration = serde_json::from_value(json!({ "query": "invoice" })).unwrap();

        assert_eq!(config.search_type(), SearchType::Basic);
        assert_eq!(config.page, 0);
        assert_eq!(config.size, 20);
        assert_eq!(config.query_text(), "invoice");
    }

    #[test]
    fn test_basic_drops_advanced_only_fields() {
        let config: SearchConfiguration = serde_json::from_value(json!({
            "query": "q",
            "searchType": "basic",
            "filters": {
                "lookUpOcrContent": true,
                "searchScope": { "searchInName": false },
                "contentType": "folders"
            }
        }))
        .unwrap();

        match &config.filters {
            SearchFilters::Basic(lookup) => assert_eq!(lookup.look_up_ocr_content, Some(true)),
            other => panic!("expected basic filters, got {:?}", other),
        }
    }

    #[test]
    fn test_advanced_keeps_only_first_category() {
        let bag = FilterBag {
            selected_categories: Some(vec![category("1"), category("2")]),
            ..Default::default()
        };

        match bag.into_filters(SearchType::Advanced) {
            SearchFilters::Advanced(advanced) => {
                assert_eq!(advanced.category.map(|c| c.id), Some("1".to_string()));
            }
            other => panic!("expected advanced filters, got {:?}", other),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = SearchConfiguration::new(
            "contract",
            SearchFilters::Advanced(AdvancedFilters {
                lookup: LookupFilters {
                    sort_by: Some("name".to_string()),
                    sort_desc: Some(true),
                    ..Default::default()
                },
                category: Some(category("7")),
                search_scope: Some(SearchScope {
                    search_in_ocr_text: Some(true),
                    ..Default::default()
                }),
                content_type: Some(ContentType::Documents),
                date_range: Some(DateRange {
                    from: Some("2024-01-01".to_string()),
                    to: None,
                    enabled: true,
                }),
            }),
        )
        .with_page(3, 50);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["searchType"], "advanced");
        assert_eq!(value["filters"]["selectedCategories"][0]["id"], "7");
        assert_eq!(value["filters"]["sortBy"], "name");

        let back: SearchConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
