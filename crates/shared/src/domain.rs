use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(CityId);

/// Unicode offset from an ASCII uppercase letter to its regional indicator
/// symbol. `'A' as u32 + 127397 == U+1F1E6 REGIONAL INDICATOR SYMBOL LETTER A`.
const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// A persisted visited-place record, camelCase on the wire to match the
/// persistence service's JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub emoji: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub position: Position,
}

/// Creation payload: a `City` without an id. The persistence service assigns
/// the id and echoes the full record back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub emoji: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub position: Position,
}

impl NewCity {
    pub fn into_city(self, id: CityId) -> City {
        City {
            id,
            city_name: self.city_name,
            country: self.country,
            country_code: self.country_code,
            emoji: self.emoji,
            date: self.date,
            notes: self.notes,
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub country: String,
    pub emoji: String,
}

/// Derives the flag glyph for a two-letter country code by shifting each
/// letter into the regional indicator block. Deterministic and total for
/// A-Z codes of length two; anything else yields an unspecified glyph.
pub fn country_flag(country_code: &str) -> String {
    country_code
        .chars()
        .filter_map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}

/// Distinct countries across the collection, first-seen order, de-duplicated
/// by country name. Read-time derivation; the store itself never re-sorts.
pub fn distinct_countries(cities: &[City]) -> Vec<CountrySummary> {
    let mut countries: Vec<CountrySummary> = Vec::new();
    for city in cities {
        if countries.iter().any(|c| c.country == city.country) {
            continue;
        }
        countries.push(CountrySummary {
            country: city.country.clone(),
            emoji: city.emoji.clone(),
        });
    }
    countries
}
