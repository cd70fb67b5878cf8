use std::collections::HashMap;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};

use crate::application::dtos::search_dto::LocalSearchRequestDto;
use crate::application::services::search_params_codec;
use crate::common::di::AppState;
use crate::domain::entities::search_configuration::SearchConfiguration;

/**
 * Manejador para las operaciones de búsqueda a través de la API.
 *
 * Expone la búsqueda con parámetros de URL (los mismos de los enlaces
 * compartibles), la búsqueda con cuerpo JSON, la generación de enlaces y
 * el filtrado local.
 */
pub struct SearchHandler;

impl SearchHandler {
    /**
     * Realiza una búsqueda a partir de los parámetros de consulta.
     *
     * Aplica las mismas reglas por defecto que al abrir un enlace compartido.
     */
    pub async fn search_get(
        State(state): State<AppState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let config = search_params_codec::decode(&params);
        info!("API: Búsqueda {} con parámetros de URL", config.search_type());

        Self::run_search(state, config).await
    }

    /// Realiza una búsqueda con la configuración completa en el cuerpo
    pub async fn search_post(
        State(state): State<AppState>,
        Json(config): Json<SearchConfiguration>,
    ) -> impl IntoResponse {
        info!("API: Búsqueda {} con cuerpo JSON", config.search_type());

        Self::run_search(state, config).await
    }

    async fn run_search(state: AppState, config: SearchConfiguration) -> axum::response::Response {
        match state.search_service.search(config).await {
            Ok(results) => {
                info!("Búsqueda completada, {} elementos", results.items.len());
                (StatusCode::OK, Json(results)).into_response()
            }
            Err(err) => {
                error!("Error en búsqueda: {}", err);
                err.into_response()
            }
        }
    }

    /// Genera el enlace compartible de una configuración
    pub async fn create_link(
        State(state): State<AppState>,
        Json(config): Json<SearchConfiguration>,
    ) -> impl IntoResponse {
        let link = state.search_service.shareable_link(&config);
        (StatusCode::OK, Json(link))
    }

    /// Filtra en local una página de resultados ya obtenida
    pub async fn rank_local(
        State(state): State<AppState>,
        Json(request): Json<LocalSearchRequestDto>,
    ) -> impl IntoResponse {
        let ranked = state.search_service.rank_local(&request.query, &request.items);
        (StatusCode::OK, Json(ranked))
    }
}
