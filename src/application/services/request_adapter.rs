use crate::application::dtos::search_dto::{
    AdvancedSearchRequest, BasicSearchRequest, CategoryFilterRequest, DateCriteria,
    MetadataCondition, SearchRequest, UnifiedSearchRequest,
};
use crate::domain::entities::search_configuration::{
    AdvancedFilters, CategorySelection, LookupFilters, SearchConfiguration, SearchFilters,
    UnifiedFilters,
};

/// Orden por defecto de los endpoints basic y unified
const DEFAULT_SORT_BY: &str = "score";

/**
 * Convierte una configuración en la petición exacta del endpoint que le corresponde.
 *
 * Función pura: no hace I/O. Cada tipo de búsqueda tiene sus propios valores
 * por defecto para los campos que la configuración deja sin definir.
 */
pub fn adapt(config: &SearchConfiguration) -> SearchRequest {
    match &config.filters {
        SearchFilters::Basic(lookup) => SearchRequest::Basic(basic_request(config, lookup)),
        SearchFilters::Unified(unified) => SearchRequest::Unified(unified_request(config, unified)),
        SearchFilters::Advanced(advanced) => SearchRequest::Advanced(advanced_request(config, advanced)),
    }
}

fn basic_request(config: &SearchConfiguration, lookup: &LookupFilters) -> BasicSearchRequest {
    BasicSearchRequest {
        query: config.query_text().to_string(),
        look_up_folder_name: lookup.look_up_folder_name.unwrap_or(true),
        look_up_document_name: lookup.look_up_document_name.unwrap_or(true),
        look_up_metadata_key: lookup.look_up_metadata_key.unwrap_or(false),
        look_up_metadata_value: lookup.look_up_metadata_value.unwrap_or(false),
        look_up_category_name: lookup.look_up_category_name.unwrap_or(false),
        look_up_ocr_content: lookup.look_up_ocr_content.unwrap_or(false),
        look_up_description: lookup.look_up_description.unwrap_or(true),
        include_folders: lookup.include_folders.unwrap_or(true),
        include_documents: lookup.include_documents.unwrap_or(true),
        sort_by: lookup.sort_by.clone().unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
        sort_desc: lookup.sort_desc.unwrap_or(false),
    }
}

// Unified requests carry no category filter.
fn unified_request(config: &SearchConfiguration, unified: &UnifiedFilters) -> UnifiedSearchRequest {
    let lookup = &unified.lookup;
    let (created_at_from, created_at_to) = match &unified.date_range {
        Some(range) => (range.from.clone(), range.to.clone()),
        None => (None, None),
    };

    UnifiedSearchRequest {
        query: config.query.clone(),
        include_folders: lookup.include_folders.unwrap_or(true),
        include_documents: lookup.include_documents.unwrap_or(true),
        look_up_folder_name: lookup.look_up_folder_name.unwrap_or(true),
        look_up_document_name: lookup.look_up_document_name.unwrap_or(true),
        look_up_metadata_value: lookup.look_up_metadata_value.unwrap_or(false),
        look_up_ocr_content: lookup.look_up_ocr_content.unwrap_or(false),
        look_up_description: lookup.look_up_description.unwrap_or(true),
        created_at_from,
        created_at_to,
        sort_by: lookup.sort_by.clone().unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
        sort_desc: lookup.sort_desc.unwrap_or(false),
    }
}

fn advanced_request(config: &SearchConfiguration, advanced: &AdvancedFilters) -> AdvancedSearchRequest {
    let scope = advanced.search_scope.clone().unwrap_or_default();

    let created_at = advanced
        .date_range
        .as_ref()
        .filter(|range| range.enabled)
        .map(|range| DateCriteria {
            from: range.from.clone(),
            to: range.to.clone(),
            inclusive: true,
        });

    AdvancedSearchRequest {
        query: config.query.clone(),
        search_in_name: scope.search_in_name.unwrap_or(true),
        search_in_description: scope.search_in_description.unwrap_or(true),
        search_in_metadata: scope.search_in_metadata.unwrap_or(true),
        search_in_ocr_text: scope.search_in_ocr_text.unwrap_or(false),
        category_filter: advanced.category.as_ref().map(category_filter),
        content_type: advanced.content_type,
        created_at,
        sort_by: advanced.lookup.sort_by.clone(),
        sort_desc: advanced.lookup.sort_desc,
    }
}

fn category_filter(category: &CategorySelection) -> CategoryFilterRequest {
    CategoryFilterRequest {
        category_id: category.id.clone(),
        metadata_filters: category
            .metadata_filters
            .iter()
            .map(|filter| MetadataCondition {
                metadata_id: filter.metadata_id.clone(),
                operator: filter.operator,
                value: filter.value.clone(),
                case_insensitive: true,
                inclusive: true,
            })
            .collect(),
    }
}
