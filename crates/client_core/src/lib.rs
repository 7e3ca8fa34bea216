use std::sync::Arc;

use reqwest::Client;
use shared::domain::{City, CityId, NewCity};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};
use url::Url;

pub mod config;
pub mod draft;
pub mod error;
pub mod geocode;

pub use error::{CoreError, Result};

/// Authoritative client-side copy of the city collection.
///
/// `is_loading` and the settled fields never overlap: every operation
/// dispatches `Loading` first and settles with exactly one terminal action.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    pub cities: Vec<City>,
    pub current_city: Option<City>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Tagged transitions over [`CollectionState`]. One variant per settlement
/// outcome; `Loading` marks the start of any remote operation.
#[derive(Debug, Clone)]
pub enum CityAction {
    Loading,
    CitiesLoaded(Vec<City>),
    CityLoaded(City),
    CityCreated(City),
    CityDeleted(CityId),
    Rejected(String),
}

impl CollectionState {
    /// Pure transition function. Actions fold in settlement order; the last
    /// settled action wins on overlapping fields.
    pub fn apply(&mut self, action: CityAction) {
        match action {
            CityAction::Loading => {
                self.is_loading = true;
                self.error = None;
            }
            CityAction::CitiesLoaded(cities) => {
                self.cities = cities;
                self.is_loading = false;
            }
            CityAction::CityLoaded(city) => {
                self.current_city = Some(city);
                self.is_loading = false;
            }
            CityAction::CityCreated(city) => {
                self.current_city = Some(city.clone());
                self.cities.push(city);
                self.is_loading = false;
            }
            CityAction::CityDeleted(id) => {
                self.cities.retain(|city| city.id != id);
                if self
                    .current_city
                    .as_ref()
                    .is_some_and(|city| city.id == id)
                {
                    self.current_city = None;
                }
                self.is_loading = false;
            }
            CityAction::Rejected(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
        }
    }
}

/// Notifications for consumers that may have navigated away from the state
/// they triggered; failure events carry the message the user should see.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    CitiesLoaded { count: usize },
    CityCreated(City),
    CityDeleted(CityId),
    OperationFailed {
        operation: &'static str,
        message: String,
    },
}

/// Owns the city collection and mediates every create/read/delete against
/// the remote persistence service.
pub struct CityStore {
    http: Client,
    base: Url,
    inner: Mutex<CollectionState>,
    load_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl CityStore {
    pub fn new(base: Url) -> Arc<Self> {
        let mut base = base;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            http: Client::new(),
            base,
            inner: Mutex::new(CollectionState::default()),
            load_task: Mutex::new(None),
            events,
        })
    }

    pub async fn snapshot(&self) -> CollectionState {
        self.inner.lock().await.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn dispatch(&self, action: CityAction) {
        self.inner.lock().await.apply(action);
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|err| CoreError::Validation(format!("invalid endpoint '{path}': {err}")))
    }

    /// Fetches the full collection and replaces `cities` wholesale.
    pub async fn load_all(&self) -> Result<()> {
        self.dispatch(CityAction::Loading).await;
        match self.fetch_cities().await {
            Ok(cities) => {
                info!(count = cities.len(), "city collection loaded");
                let _ = self.events.send(StoreEvent::CitiesLoaded {
                    count: cities.len(),
                });
                self.dispatch(CityAction::CitiesLoaded(cities)).await;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "failed to load city collection");
                self.dispatch(CityAction::Rejected(err.to_string())).await;
                Err(err)
            }
        }
    }

    async fn fetch_cities(&self) -> Result<Vec<City>> {
        let response = self
            .http
            .get(self.endpoint("cities")?)
            .send()
            .await?
            .error_for_status()?;
        let cities = response
            .json()
            .await
            .map_err(|err| CoreError::Network(err.to_string()))?;
        Ok(cities)
    }

    /// Kicks off the initial `load_all` in the background. The handle is
    /// retained before the request is scheduled so that [`shutdown`] can
    /// cancel a load that is still in flight when the owning scope goes
    /// away.
    ///
    /// [`shutdown`]: CityStore::shutdown
    pub async fn spawn_initial_load(self: &Arc<Self>) {
        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let _ = store.load_all().await;
        });
        let mut slot = self.load_task.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Tears the store down: aborts the initial load if it has not settled.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.load_task.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Fetches a single record into `current_city`. A no-op when `id` is
    /// already the current selection, so re-reading the open record costs
    /// no network call.
    pub async fn get_by_id(&self, id: CityId) -> Result<()> {
        {
            let inner = self.inner.lock().await;
            if inner
                .current_city
                .as_ref()
                .is_some_and(|city| city.id == id)
            {
                return Ok(());
            }
        }

        self.dispatch(CityAction::Loading).await;
        let result: Result<City> = async {
            let response = self
                .http
                .get(self.endpoint(&format!("cities/{}", id.0))?)
                .send()
                .await?
                .error_for_status()?;
            response
                .json()
                .await
                .map_err(|err| CoreError::Network(err.to_string()))
        }
        .await;

        match result {
            Ok(city) => {
                self.dispatch(CityAction::CityLoaded(city)).await;
                Ok(())
            }
            Err(err) => {
                warn!(id = id.0, %err, "failed to fetch city");
                self.dispatch(CityAction::Rejected(err.to_string())).await;
                Err(err)
            }
        }
    }

    /// Persists a new record and appends the server-assigned result to the
    /// collection. The only mutation route into `cities` besides
    /// [`load_all`](CityStore::load_all).
    pub async fn create(&self, new_city: NewCity) -> Result<City> {
        self.dispatch(CityAction::Loading).await;
        let result: Result<City> = async {
            let response = self
                .http
                .post(self.endpoint("cities")?)
                .json(&new_city)
                .send()
                .await?
                .error_for_status()?;
            response
                .json()
                .await
                .map_err(|err| CoreError::Network(err.to_string()))
        }
        .await;

        match result {
            Ok(city) => {
                info!(id = city.id.0, city_name = %city.city_name, "city created");
                let _ = self.events.send(StoreEvent::CityCreated(city.clone()));
                self.dispatch(CityAction::CityCreated(city.clone())).await;
                Ok(city)
            }
            Err(err) => {
                warn!(%err, "failed to create city");
                let _ = self.events.send(StoreEvent::OperationFailed {
                    operation: "create",
                    message: format!("there was an error creating the city: {err}"),
                });
                self.dispatch(CityAction::Rejected(err.to_string())).await;
                Err(err)
            }
        }
    }

    /// Deletes a record remotely, then removes it from the collection. Also
    /// clears `current_city` when it pointed at the deleted record.
    pub async fn delete(&self, id: CityId) -> Result<()> {
        self.dispatch(CityAction::Loading).await;
        let result: Result<()> = async {
            self.http
                .delete(self.endpoint(&format!("cities/{}", id.0))?)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(id = id.0, "city deleted");
                let _ = self.events.send(StoreEvent::CityDeleted(id));
                self.dispatch(CityAction::CityDeleted(id)).await;
                Ok(())
            }
            Err(err) => {
                warn!(id = id.0, %err, "failed to delete city");
                let _ = self.events.send(StoreEvent::OperationFailed {
                    operation: "delete",
                    message: format!("there was an error deleting the city: {err}"),
                });
                self.dispatch(CityAction::Rejected(err.to_string())).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
