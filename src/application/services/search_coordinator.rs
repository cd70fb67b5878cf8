use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::application::dtos::search_dto::{PageInfo, SearchResultItem, SearchResultsDto};
use crate::application::ports::outbound::RemoteSearchPort;
use crate::application::services::request_adapter::adapt;
use crate::common::config::SearchConfig;
use crate::common::errors::Result;
use crate::domain::entities::search_configuration::SearchConfiguration;
use crate::domain::services::local_ranking::rank_locally;

/// Origen de los resultados mostrados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Nada mostrado todavía
    Empty,
    /// Filtro local orientativo
    Local,
    /// Respuesta autoritativa del backend
    Remote,
}

/// Estado visible de una sesión de búsqueda
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<SearchResultItem>,
    pub page: Option<PageInfo>,
    pub source: ResultSource,
    pub loading: bool,
    pub last_error: Option<String>,
    /// Secuencia de la última respuesta aplicada (0 = ninguna)
    pub applied_sequence: u64,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            page: None,
            source: ResultSource::Empty,
            loading: false,
            last_error: None,
            applied_sequence: 0,
        }
    }
}

struct SessionState {
    /// Último conjunto completo conocido; sólo lo actualiza una respuesta remota o `seed`
    known_results: Vec<SearchResultItem>,
    pending_timer: Option<JoinHandle<()>>,
    last_dispatched: u64,
}

struct Shared {
    remote: Arc<dyn RemoteSearchPort>,
    state: Mutex<SessionState>,
    snapshot: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // El estado sigue siendo coherente aunque otro hilo haya entrado en pánico
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserva el siguiente número de secuencia y marca la sesión como cargando
    fn begin_dispatch(&self) -> u64 {
        let sequence = {
            let mut state = self.lock();
            state.last_dispatched += 1;
            state.last_dispatched
        };
        self.snapshot.send_modify(|snapshot| snapshot.loading = true);
        sequence
    }

    /// Aplica una respuesta remota si sigue siendo la última despachada.
    /// Devuelve `false` cuando la respuesta llega tarde y se descarta.
    fn apply_response(&self, sequence: u64, response: &Result<SearchResultsDto>) -> bool {
        let mut state = self.lock();
        if sequence != state.last_dispatched {
            debug!(
                "Discarding stale search response #{} (latest dispatched #{})",
                sequence, state.last_dispatched
            );
            return false;
        }

        match response {
            Ok(results) => {
                state.known_results = results.items.clone();
                drop(state);
                self.snapshot.send_modify(|snapshot| {
                    snapshot.results = results.items.clone();
                    snapshot.page = Some(results.page.clone());
                    snapshot.source = ResultSource::Remote;
                    snapshot.loading = false;
                    snapshot.last_error = None;
                    snapshot.applied_sequence = sequence;
                });
            }
            Err(e) => {
                drop(state);
                warn!("Remote search #{} failed: {}", sequence, e);
                // Los resultados mostrados se conservan
                self.snapshot.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.last_error = Some(e.to_string());
                    snapshot.applied_sequence = sequence;
                });
            }
        }
        true
    }

    async fn fetch(self: Arc<Self>, sequence: u64, config: SearchConfiguration) {
        let request = adapt(&config);
        debug!("Dispatching remote search #{} to {}", sequence, request.endpoint());

        let response = self.remote.search(&request, config.page, config.size).await;
        self.apply_response(sequence, &response);
    }
}

/**
 * Coordinador de búsqueda en dos fases para un campo de entrada.
 *
 * Cada pulsación aplica de inmediato el filtro local sobre el último
 * conjunto completo conocido y rearma un temporizador de debounce. Cuando
 * pasa la ventana sin nuevas pulsaciones (más el retardo de confirmación
 * opcional) se despacha la consulta remota, cuya respuesta reemplaza a los
 * resultados locales.
 *
 * Cancelar sólo afecta a los temporizadores: una petición ya despachada
 * sigue su curso, pero su respuesta se descarta si otra más reciente se ha
 * despachado después.
 */
pub struct SearchCoordinator {
    shared: Arc<Shared>,
    debounce: Duration,
    commit_delay: Option<Duration>,
}

impl SearchCoordinator {
    pub fn new(remote: Arc<dyn RemoteSearchPort>, config: &SearchConfig) -> Self {
        Self::with_timings(remote, config.debounce(), config.commit_delay())
    }

    pub fn with_timings(remote: Arc<dyn RemoteSearchPort>, debounce: Duration, commit_delay: Option<Duration>) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                remote,
                state: Mutex::new(SessionState {
                    known_results: Vec::new(),
                    pending_timer: None,
                    last_dispatched: 0,
                }),
                snapshot,
            }),
            debounce,
            commit_delay,
        }
    }

    /// Suscripción al estado visible
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Carga un conjunto de resultados ya obtenido (p. ej. la página actual de una carpeta)
    pub fn seed(&self, results: Vec<SearchResultItem>) {
        self.shared.lock().known_results = results.clone();
        self.shared.snapshot.send_modify(|snapshot| {
            snapshot.results = results;
            snapshot.source = ResultSource::Remote;
        });
    }

    /**
     * Procesa una pulsación.
     *
     * Devuelve los resultados locales, que ya están publicados en el
     * snapshot antes de que se programe la consulta remota.
     * Debe llamarse dentro de un runtime de tokio.
     */
    pub fn on_input(&self, config: SearchConfiguration) -> Vec<SearchResultItem> {
        let query = config.query_text().to_string();
        let shared = self.shared.clone();
        let debounce = self.debounce;
        let commit_delay = self.commit_delay;

        // Retirar el temporizador anterior y guardar el nuevo bajo el mismo guard
        let mut state = self.shared.lock();
        if let Some(timer) = state.pending_timer.take() {
            timer.abort();
        }
        let local = rank_locally(&query, &state.known_results);

        self.shared.snapshot.send_modify(|snapshot| {
            snapshot.query = query;
            snapshot.results = local.clone();
            snapshot.source = ResultSource::Local;
        });

        state.pending_timer = Some(tokio::spawn(async move {
            time::sleep(debounce).await;
            if let Some(delay) = commit_delay {
                time::sleep(delay).await;
            }
            // Desde aquí no hay más puntos de espera: abortar el temporizador
            // no puede cancelar la petición ya despachada.
            let sequence = shared.begin_dispatch();
            tokio::spawn(shared.fetch(sequence, config));
        }));
        drop(state);

        local
    }

    /// Cancela el temporizador pendiente, si existe
    pub fn cancel_pending(&self) {
        if let Some(timer) = self.shared.lock().pending_timer.take() {
            timer.abort();
            debug!("Pending debounced search cancelled");
        }
    }

    /**
     * Búsqueda inmediata (envío explícito del formulario).
     *
     * Cancela el temporizador pendiente, consulta el backend sin debounce y
     * propaga el error si falla. La respuesta sólo se aplica al snapshot si
     * sigue siendo la más reciente.
     */
    pub async fn search_now(&self, config: SearchConfiguration) -> Result<SearchResultsDto> {
        self.cancel_pending();
        self.shared.snapshot.send_modify(|snapshot| snapshot.query = config.query_text().to_string());

        let sequence = self.shared.begin_dispatch();
        let request = adapt(&config);
        let response = self.shared.remote.search(&request, config.page, config.size).await;
        self.shared.apply_response(sequence, &response);
        response
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
