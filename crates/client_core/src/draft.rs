use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::domain::{country_flag, NewCity, Position};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    geocode::GeocodeResolver,
    CityStore,
};

/// Where a draft session currently stands. Derived from the state fields so
/// it can never disagree with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    AwaitingPosition,
    LookingUp,
    Ready,
    LookupFailed,
}

/// In-progress city record being assembled. Created fresh per draft session
/// and discarded on submission or abandonment; never persisted directly.
#[derive(Debug, Clone)]
pub struct DraftState {
    pub position: Option<Position>,
    pub city_name: String,
    pub country: String,
    pub country_code: String,
    pub date: Option<DateTime<Utc>>,
    pub notes: String,
    pub emoji: String,
    pub geo_error: String,
    pub is_loading_geocode: bool,
}

impl Default for DraftState {
    fn default() -> Self {
        Self {
            position: None,
            city_name: String::new(),
            country: String::new(),
            country_code: String::new(),
            date: Some(Utc::now()),
            notes: String::new(),
            emoji: String::new(),
            geo_error: String::new(),
            is_loading_geocode: false,
        }
    }
}

/// Field-level transitions: independent last-write-wins updates. `Emoji`
/// carries a country code and derives the flag glyph before storing it.
#[derive(Debug, Clone)]
pub enum DraftAction {
    Position(Position),
    CityName(String),
    Country(String),
    Date(Option<DateTime<Utc>>),
    Notes(String),
    Emoji(String),
    GeoError(String),
    LoadingGeocode(bool),
}

impl DraftState {
    /// Pure transition function over the draft fields.
    pub fn apply(&mut self, action: DraftAction) {
        match action {
            DraftAction::Position(position) => self.position = Some(position),
            DraftAction::CityName(value) => self.city_name = value,
            DraftAction::Country(value) => self.country = value,
            DraftAction::Date(value) => self.date = value,
            DraftAction::Notes(value) => self.notes = value,
            DraftAction::Emoji(country_code) => {
                self.emoji = country_flag(&country_code);
                self.country_code = country_code;
            }
            DraftAction::GeoError(value) => self.geo_error = value,
            DraftAction::LoadingGeocode(value) => self.is_loading_geocode = value,
        }
    }

    pub fn phase(&self) -> DraftPhase {
        if self.position.is_none() {
            DraftPhase::AwaitingPosition
        } else if self.is_loading_geocode {
            DraftPhase::LookingUp
        } else if !self.geo_error.is_empty() {
            DraftPhase::LookupFailed
        } else {
            DraftPhase::Ready
        }
    }
}

/// Drives a single draft-creation session: receives a coordinate from the
/// outside, resolves it through the geocode client, lets the caller edit
/// the derived fields, and hands a finished payload to the store.
pub struct DraftWorkflow {
    geocoder: Arc<dyn GeocodeResolver>,
    inner: Mutex<DraftState>,
}

impl DraftWorkflow {
    pub fn new(geocoder: Arc<dyn GeocodeResolver>) -> Self {
        Self {
            geocoder,
            inner: Mutex::new(DraftState::default()),
        }
    }

    pub async fn snapshot(&self) -> DraftState {
        self.inner.lock().await.clone()
    }

    pub async fn dispatch(&self, action: DraftAction) {
        self.inner.lock().await.apply(action);
    }

    /// Accepts an externally supplied coordinate and resolves it. A newer
    /// coordinate arriving while a lookup is in flight starts a fresh
    /// lookup; there is no cancellation, the last completion wins by
    /// overwriting the derived fields.
    pub async fn set_position(&self, lat: f64, lng: f64) {
        {
            let mut inner = self.inner.lock().await;
            inner.apply(DraftAction::Position(Position { lat, lng }));
            inner.apply(DraftAction::LoadingGeocode(true));
            inner.apply(DraftAction::GeoError(String::new()));
        }

        let resolved = self.geocoder.resolve(lat, lng).await;

        let mut inner = self.inner.lock().await;
        match resolved {
            Ok(place) => {
                debug!(lat, lng, city_name = %place.city_name, "coordinate resolved");
                inner.apply(DraftAction::CityName(place.city_name));
                inner.apply(DraftAction::Country(place.country));
                inner.apply(DraftAction::Emoji(place.country_code));
            }
            Err(err) => {
                inner.apply(DraftAction::GeoError(err.to_string()));
            }
        }
        inner.apply(DraftAction::LoadingGeocode(false));
    }

    /// Validates the draft and persists it through the store's create
    /// operation. Validation failures never reach the store.
    pub async fn submit(&self, store: &CityStore) -> Result<shared::domain::City> {
        let draft = self.snapshot().await;

        let Some(position) = draft.position else {
            return Err(CoreError::Validation(
                "start by selecting a position on the map".to_string(),
            ));
        };
        match draft.phase() {
            DraftPhase::LookingUp => {
                return Err(CoreError::Validation(
                    "still looking up the selected position".to_string(),
                ));
            }
            DraftPhase::LookupFailed => {
                return Err(CoreError::Validation(draft.geo_error));
            }
            DraftPhase::AwaitingPosition | DraftPhase::Ready => {}
        }
        if draft.city_name.is_empty() {
            return Err(CoreError::Validation("city name is required".to_string()));
        }
        let Some(date) = draft.date else {
            return Err(CoreError::Validation("a visit date is required".to_string()));
        };

        let country_code = (!draft.country_code.is_empty()).then_some(draft.country_code);
        store
            .create(NewCity {
                city_name: draft.city_name,
                country: draft.country,
                country_code,
                emoji: draft.emoji,
                date,
                notes: draft.notes,
                position,
            })
            .await
    }
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
