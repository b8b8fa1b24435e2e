// Reverse geocoding through OpenStreetMap Nominatim.
use super::{fetch_json, query_string, ApiError};
use crate::api::models::Place;
use crate::config::GEOCODE_API_URL;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new(GEOCODE_API_URL)
    }
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, ApiError> {
        let query = query_string(&[
            ("format", "jsonv2".to_string()),
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("zoom", "10".to_string()),
        ]);
        let url = format!("{}/reverse?{}", self.base_url, query);
        let response: ReverseResponse = fetch_json(&url).await?;
        if let Some(error) = response.error {
            return Err(ApiError::Upstream(error));
        }
        Ok(Place {
            name: place_name(&response, latitude, longitude),
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// "City, Country" when available, then the full display name, then the raw
/// coordinates.
fn place_name(response: &ReverseResponse, latitude: f64, longitude: f64) -> String {
    if let Some(address) = &response.address {
        let locality = non_empty(&address.city)
            .or_else(|| non_empty(&address.town))
            .or_else(|| non_empty(&address.village));
        match (locality, non_empty(&address.country)) {
            (Some(locality), Some(country)) => return format!("{locality}, {country}"),
            (Some(locality), None) => return locality.to_string(),
            _ => {}
        }
    }
    if let Some(display) = non_empty(&response.display_name) {
        return display.to_string();
    }
    format!("{latitude:.4}, {longitude:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_city_and_country() {
        let response: ReverseResponse = serde_json::from_str(
            r#"{"display_name":"Westminster, London, Greater London, England, United Kingdom",
                "address":{"city":"London","state":"England","country":"United Kingdom"}}"#,
        )
        .unwrap();
        assert_eq!(place_name(&response, 51.5, -0.12), "London, United Kingdom");
    }

    #[test]
    fn falls_back_to_town_then_display_name() {
        let town: ReverseResponse =
            serde_json::from_str(r#"{"address":{"town":"Hebden Bridge"}}"#).unwrap();
        assert_eq!(place_name(&town, 53.7, -2.0), "Hebden Bridge");

        let display: ReverseResponse =
            serde_json::from_str(r#"{"display_name":"Somewhere at sea","address":{}}"#).unwrap();
        assert_eq!(place_name(&display, 0.0, 0.0), "Somewhere at sea");
    }

    #[test]
    fn uses_coordinates_when_nothing_else_is_known() {
        assert_eq!(
            place_name(&ReverseResponse::default(), 21.42251, 39.82616),
            "21.4225, 39.8262"
        );
    }
}
