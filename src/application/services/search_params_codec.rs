use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::entities::search_configuration::{
    CategorySelection, ContentType, DateRange, FilterBag, LookupFilters, SearchConfiguration,
    SearchScope, SearchType, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};

/// Claves de los parámetros de URL
pub mod keys {
    pub const QUERY: &str = "query";
    pub const SEARCH_TYPE: &str = "searchType";
    pub const PAGE: &str = "page";
    pub const SIZE: &str = "size";
    pub const LOOK_UP_FOLDER_NAME: &str = "lookUpFolderName";
    pub const LOOK_UP_DOCUMENT_NAME: &str = "lookUpDocumentName";
    pub const LOOK_UP_METADATA_KEY: &str = "lookUpMetadataKey";
    pub const LOOK_UP_METADATA_VALUE: &str = "lookUpMetadataValue";
    pub const LOOK_UP_CATEGORY_NAME: &str = "lookUpCategoryName";
    pub const LOOK_UP_OCR_CONTENT: &str = "lookUpOcrContent";
    pub const LOOK_UP_DESCRIPTION: &str = "lookUpDescription";
    pub const INCLUDE_FOLDERS: &str = "includeFolders";
    pub const INCLUDE_DOCUMENTS: &str = "includeDocuments";
    pub const SORT_BY: &str = "sortBy";
    pub const SORT_DESC: &str = "sortDesc";
    pub const SELECTED_CATEGORIES: &str = "selectedCategories";
    pub const SEARCH_SCOPE: &str = "searchScope";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const DATE_RANGE: &str = "dateRange";
}

/// Fuente de parámetros de la que el decodificador puede leer
pub trait ParamSource {
    fn param(&self, key: &str) -> Option<&str>;
}

impl ParamSource for HashMap<String, String> {
    fn param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Lookup toggles in a fixed order, shared by encode and decode
fn toggle_fields(lookup: &mut LookupFilters) -> [(&'static str, &mut Option<bool>); 9] {
    [
        (keys::LOOK_UP_FOLDER_NAME, &mut lookup.look_up_folder_name),
        (keys::LOOK_UP_DOCUMENT_NAME, &mut lookup.look_up_document_name),
        (keys::LOOK_UP_METADATA_KEY, &mut lookup.look_up_metadata_key),
        (keys::LOOK_UP_METADATA_VALUE, &mut lookup.look_up_metadata_value),
        (keys::LOOK_UP_CATEGORY_NAME, &mut lookup.look_up_category_name),
        (keys::LOOK_UP_OCR_CONTENT, &mut lookup.look_up_ocr_content),
        (keys::LOOK_UP_DESCRIPTION, &mut lookup.look_up_description),
        (keys::INCLUDE_FOLDERS, &mut lookup.include_folders),
        (keys::INCLUDE_DOCUMENTS, &mut lookup.include_documents),
    ]
}

/**
 * Serializa una configuración a un mapa plano de parámetros.
 *
 * Cada campo definido produce una clave; los booleanos se escriben como
 * `"true"`/`"false"` y las estructuras anidadas como texto JSON. Los campos
 * ausentes no se emiten. `searchType`, `page` y `size` siempre aparecen.
 */
pub fn encode(config: &SearchConfiguration) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let mut bag = FilterBag::from_filters(&config.filters);

    if let Some(query) = &config.query {
        params.insert(keys::QUERY.to_string(), query.clone());
    }
    params.insert(keys::SEARCH_TYPE.to_string(), config.search_type().as_str().to_string());
    params.insert(keys::PAGE.to_string(), config.page.to_string());
    params.insert(keys::SIZE.to_string(), config.size.to_string());

    for (key, value) in toggle_fields(&mut bag.lookup) {
        if let Some(value) = value {
            params.insert(key.to_string(), value.to_string());
        }
    }
    if let Some(sort_by) = &bag.lookup.sort_by {
        params.insert(keys::SORT_BY.to_string(), sort_by.clone());
    }
    if let Some(sort_desc) = bag.lookup.sort_desc {
        params.insert(keys::SORT_DESC.to_string(), sort_desc.to_string());
    }

    insert_json(&mut params, keys::SELECTED_CATEGORIES, bag.selected_categories.as_ref());
    insert_json(&mut params, keys::SEARCH_SCOPE, bag.search_scope.as_ref());
    insert_json(&mut params, keys::DATE_RANGE, bag.date_range.as_ref());
    if let Some(content_type) = bag.content_type {
        params.insert(keys::CONTENT_TYPE.to_string(), content_type.as_str().to_string());
    }

    params
}

fn insert_json<T: Serialize>(params: &mut BTreeMap<String, String>, key: &str, value: Option<&T>) {
    let Some(value) = value else {
        return;
    };
    match serde_json::to_string(value) {
        Ok(json) => {
            params.insert(key.to_string(), json);
        }
        Err(e) => warn!("Failed to serialize search parameter {}: {}", key, e),
    }
}

/**
 * Reconstruye una configuración desde un mapa de parámetros.
 *
 * Nunca falla: `searchType` desconocido o ausente pasa a `basic`, `page` y
 * `size` inválidos (no numéricos, negativos, o tamaño cero) toman los
 * valores por defecto, y un JSON mal formado deja ese campo sin definir.
 */
pub fn decode<P: ParamSource + ?Sized>(params: &P) -> SearchConfiguration {
    let search_type = params
        .param(keys::SEARCH_TYPE)
        .map(SearchType::parse)
        .unwrap_or_default();

    let mut lookup = LookupFilters::default();
    for (key, slot) in toggle_fields(&mut lookup) {
        *slot = params.param(key).and_then(|raw| parse_bool(key, raw));
    }
    lookup.sort_by = params.param(keys::SORT_BY).map(str::to_string);
    lookup.sort_desc = params.param(keys::SORT_DESC).and_then(|raw| parse_bool(keys::SORT_DESC, raw));

    let bag = FilterBag {
        lookup,
        selected_categories: parse_json::<Vec<CategorySelection>, P>(params, keys::SELECTED_CATEGORIES),
        search_scope: parse_json::<SearchScope, P>(params, keys::SEARCH_SCOPE),
        content_type: params.param(keys::CONTENT_TYPE).and_then(|raw| {
            let parsed = ContentType::parse(raw);
            if parsed.is_none() {
                debug!("Ignoring unknown contentType {:?}", raw);
            }
            parsed
        }),
        date_range: parse_json::<DateRange, P>(params, keys::DATE_RANGE),
    };

    SearchConfiguration {
        query: params.param(keys::QUERY).map(str::to_string),
        filters: bag.into_filters(search_type),
        page: parse_page(params.param(keys::PAGE)),
        size: parse_size(params.param(keys::SIZE)),
    }
}

fn parse_bool(key: &str, raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            debug!("Ignoring non-boolean value {:?} for {}", other, key);
            None
        }
    }
}

fn parse_json<T: DeserializeOwned, P: ParamSource + ?Sized>(params: &P, key: &str) -> Option<T> {
    let raw = params.param(key)?;
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse search parameter {} from URL: {}", key, e);
            None
        }
    }
}

/// Parses a non-negative integer, `None` for anything else
fn parse_non_negative(key: &str, raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Invalid {} parameter {:?}, using default", key, raw);
            None
        }
    }
}

fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|raw| parse_non_negative(keys::PAGE, raw))
        .unwrap_or(DEFAULT_PAGE)
}

fn parse_size(raw: Option<&str>) -> u32 {
    raw.and_then(|raw| parse_non_negative(keys::SIZE, raw))
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Codifica la configuración como query string (`application/x-www-form-urlencoded`)
pub fn to_query_string(config: &SearchConfiguration) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in encode(config) {
        serializer.append_pair(&key, &value);
    }
    serializer.finish()
}

/// Acepta la query string con o sin `?` inicial; la última aparición de una clave gana
pub fn from_query_string(query: &str) -> SearchConfiguration {
    let params: HashMap<String, String> =
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
    decode(&params)
}
