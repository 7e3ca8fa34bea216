use serde::{Deserialize, Serialize};

/// Wire shape of the reverse-geocoding service response. The upstream
/// service reports unresolved fields as empty strings rather than omitting
/// them, so consumers must treat `Some("")` the same as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl GeocodeResponse {
    /// `countryCode`, with empty strings normalized away.
    pub fn resolved_country_code(&self) -> Option<&str> {
        self.country_code.as_deref().filter(|code| !code.is_empty())
    }

    /// Display name for the place: `city`, falling back to `locality`.
    pub fn display_name(&self) -> &str {
        [self.city.as_deref(), self.locality.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_default()
    }
}
