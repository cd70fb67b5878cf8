use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::search_configuration::{ContentType, MetadataOperator};
use crate::domain::services::local_ranking::Searchable;

/**
 * Request body for the backend basic search endpoint.
 *
 * Every lookup toggle is always present: defaults are injected by the
 * request adapter so the backend never has to guess.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSearchRequest {
    pub query: String,
    pub look_up_folder_name: bool,
    pub look_up_document_name: bool,
    pub look_up_metadata_key: bool,
    pub look_up_metadata_value: bool,
    pub look_up_category_name: bool,
    pub look_up_ocr_content: bool,
    pub look_up_description: bool,
    pub include_folders: bool,
    pub include_documents: bool,
    pub sort_by: String,
    pub sort_desc: bool,
}

/// Request body for the backend unified search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub include_folders: bool,
    pub include_documents: bool,
    pub look_up_folder_name: bool,
    pub look_up_document_name: bool,
    pub look_up_metadata_value: bool,
    pub look_up_ocr_content: bool,
    pub look_up_description: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_to: Option<String>,
    pub sort_by: String,
    pub sort_desc: bool,
}

/// Condición de metadatos tal como la espera el backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataCondition {
    pub metadata_id: String,
    pub operator: MetadataOperator,
    pub value: String,
    pub case_insensitive: bool,
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilterRequest {
    pub category_id: String,
    pub metadata_filters: Vec<MetadataCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub inclusive: bool,
}

/// Request body for the backend advanced search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub search_in_name: bool,
    pub search_in_description: bool,
    pub search_in_metadata: bool,
    pub search_in_ocr_text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<CategoryFilterRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateCriteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_desc: Option<bool>,
}

/// Petición lista para despachar a exactamente uno de los tres endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchRequest {
    Basic(BasicSearchRequest),
    Advanced(AdvancedSearchRequest),
    Unified(UnifiedSearchRequest),
}

impl SearchRequest {
    /// Segmento de ruta del endpoint de búsqueda
    pub fn endpoint(&self) -> &'static str {
        match self {
            SearchRequest::Basic(_) => "basic",
            SearchRequest::Advanced(_) => "advanced",
            SearchRequest::Unified(_) => "unified",
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            SearchRequest::Basic(req) => Some(req.query.as_str()),
            SearchRequest::Advanced(req) => req.query.as_deref(),
            SearchRequest::Unified(req) => req.query.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Folder,
    Document,
}

/// A folder or document returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", alias = "itemType", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Searchable for SearchResultItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Pagination block of the backend envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}

impl PageInfo {
    /// Calcula la paginación cuando el backend no la incluye
    pub fn from_counts(total_elements: u64, page: u32, size: u32) -> Self {
        let total_pages = if total_elements == 0 || size == 0 {
            0
        } else {
            u32::try_from(total_elements.div_ceil(size as u64)).unwrap_or(u32::MAX)
        };

        Self {
            total_elements,
            total_pages,
            first: page == 0,
            last: total_pages == 0 || page.saturating_add(1) >= total_pages,
        }
    }
}

/**
 * Search results returned to callers.
 *
 * Backend envelopes carry either a single `content` list or separate
 * `folders` and `documents` lists; both are flattened into `items`,
 * folders first.
 */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsDto {
    pub items: Vec<SearchResultItem>,
    pub page: PageInfo,
}

impl SearchResultsDto {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(items: Vec<SearchResultItem>, page: PageInfo) -> Self {
        Self { items, page }
    }
}

/// Raw backend envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSearchEnvelope {
    #[serde(default)]
    pub content: Vec<SearchResultItem>,
    #[serde(default)]
    pub folders: Vec<SearchResultItem>,
    #[serde(default)]
    pub documents: Vec<SearchResultItem>,
    #[serde(default)]
    pub page: Option<PageInfo>,
}

impl RemoteSearchEnvelope {
    pub fn into_results(self, page: u32, size: u32) -> SearchResultsDto {
        let mut items = self.content;
        items.extend(self.folders.into_iter().map(|mut folder| {
            folder.item_type.get_or_insert(ItemType::Folder);
            folder
        }));
        items.extend(self.documents.into_iter().map(|mut document| {
            document.item_type.get_or_insert(ItemType::Document);
            document
        }));

        let page_info = self
            .page
            .unwrap_or_else(|| PageInfo::from_counts(items.len() as u64, page, size));

        SearchResultsDto::new(items, page_info)
    }
}

/// Enlace compartible de una configuración
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareableLinkDto {
    /// Query string codificada (sin `?`)
    pub query: String,
    /// Mismos parámetros como mapa plano
    pub params: BTreeMap<String, String>,
}

/// Petición de filtrado local sobre una página ya obtenida
#[derive(Debug, Clone, Deserialize)]
pub struct LocalSearchRequestDto {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub items: Vec<SearchResultItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_merges_folders_before_documents() {
        let envelope: RemoteSearchEnvelope = serde_json::from_value(json!({
            "folders": [{ "id": "f1", "name": "Invoices" }],
            "documents": [{ "id": "d1", "name": "Invoice 2024.pdf", "description": "Q1" }],
            "page": { "totalElements": 2, "totalPages": 1, "first": true, "last": true }
        }))
        .unwrap();

        let results = envelope.into_results(0, 20);
        assert_eq!(results.items.len(), 2);
        assert_eq!(results.items[0].item_type, Some(ItemType::Folder));
        assert_eq!(results.items[1].item_type, Some(ItemType::Document));
        assert_eq!(results.page.total_elements, 2);
    }

    #[test]
    fn test_envelope_without_page_computes_it() {
        let envelope: RemoteSearchEnvelope = serde_json::from_value(json!({
            "content": [
                { "id": "1", "name": "a", "type": "document" },
                { "id": "2", "name": "b", "type": "folder" },
                { "id": "3", "name": "c" }
            ]
        }))
        .unwrap();

        let results = envelope.into_results(0, 2);
        assert_eq!(results.page, PageInfo { total_elements: 3, total_pages: 2, first: true, last: false });
        assert_eq!(results.items[2].item_type, None);
    }

    #[test]
    fn test_page_info_handles_extreme_values() {
        let info = PageInfo::from_counts(1, u32::MAX, 20);
        assert_eq!(info.total_pages, 1);
        assert!(!info.first);
        assert!(info.last);

        let info = PageInfo::from_counts(u64::MAX, 0, 1);
        assert_eq!(info.total_pages, u32::MAX);
        assert!(!info.last);
    }

    #[test]
    fn test_envelope_on_last_representable_page() {
        let envelope: RemoteSearchEnvelope = serde_json::from_value(json!({
            "content": [{ "id": "1", "name": "a" }]
        }))
        .unwrap();

        let results = envelope.into_results(u32::MAX, 20);
        assert_eq!(results.items.len(), 1);
        assert!(results.page.last);
    }

    #[test]
    fn test_request_endpoint_and_untagged_body() {
        let request = SearchRequest::Unified(UnifiedSearchRequest {
            query: None,
            include_folders: true,
            include_documents: true,
            look_up_folder_name: true,
            look_up_document_name: true,
            look_up_metadata_value: false,
            look_up_ocr_content: false,
            look_up_description: true,
            created_at_from: None,
            created_at_to: None,
            sort_by: "score".to_string(),
            sort_desc: false,
        });

        assert_eq!(request.endpoint(), "unified");
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("query").is_none());
        assert_eq!(body["lookUpDescription"], true);
        assert_eq!(body["sortBy"], "score");
    }
}
