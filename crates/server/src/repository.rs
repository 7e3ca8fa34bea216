use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::domain::{City, CityId, NewCity};
use tokio::sync::Mutex;
use tracing::info;

/// On-disk shape of the data file: a single top-level `cities` collection.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DataFile {
    cities: Vec<City>,
}

/// File-backed in-memory city collection. All reads are served from memory;
/// every mutation rewrites the data file before it is acknowledged.
pub struct CityRepository {
    data_file: Option<PathBuf>,
    inner: Mutex<Vec<City>>,
}

impl CityRepository {
    /// Opens the repository, seeding from `data_file` when it exists. A
    /// missing file is an empty collection, not an error.
    pub fn open(data_file: Option<PathBuf>) -> Result<Self> {
        let cities = match &data_file {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read data file '{}'", path.display()))?;
                let parsed: DataFile = serde_json::from_str(&raw)
                    .with_context(|| format!("malformed data file '{}'", path.display()))?;
                info!(
                    path = %path.display(),
                    count = parsed.cities.len(),
                    "seeded city collection from data file"
                );
                parsed.cities
            }
            _ => Vec::new(),
        };
        Ok(Self {
            data_file,
            inner: Mutex::new(cities),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            data_file: None,
            inner: Mutex::new(Vec::new()),
        }
    }

    pub async fn list(&self) -> Vec<City> {
        self.inner.lock().await.clone()
    }

    pub async fn get(&self, id: CityId) -> Option<City> {
        self.inner
            .lock()
            .await
            .iter()
            .find(|city| city.id == id)
            .cloned()
    }

    /// Assigns the next free id and appends the record.
    pub async fn insert(&self, new_city: NewCity) -> Result<City> {
        let mut cities = self.inner.lock().await;
        let id = CityId(cities.iter().map(|city| city.id.0).max().unwrap_or(0) + 1);
        let city = new_city.into_city(id);
        cities.push(city.clone());
        self.persist(&cities).await?;
        Ok(city)
    }

    /// Removes the record with the given id. `Ok(false)` when no such
    /// record exists; nothing is written in that case.
    pub async fn remove(&self, id: CityId) -> Result<bool> {
        let mut cities = self.inner.lock().await;
        let before = cities.len();
        cities.retain(|city| city.id != id);
        if cities.len() == before {
            return Ok(false);
        }
        self.persist(&cities).await?;
        Ok(true)
    }

    async fn persist(&self, cities: &[City]) -> Result<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(&DataFile {
            cities: cities.to_vec(),
        })?;
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("failed to write data file '{}'", path.display()))?;
        Ok(())
    }
}
