pub mod geocode;
pub mod models;
pub mod prayer;
pub mod quran;

pub use geocode::GeocodeClient;
pub use models::*;
pub use prayer::{
    calculation_method, format_prayer_time, next_prayer, upcoming_ramadan_year, PrayerClient,
    PrayerQuery, CALCULATION_METHODS,
};
pub use quran::{Locator, QuranClient, QuranSource, VerseSetRequest};

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("service reported an error: {0}")]
    Upstream(String),
    #[error("could not read service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// `{ code, status, data }` wrapper shared by the alquran.cloud and aladhan
/// services.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: u16,
    #[serde(default)]
    status: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, ApiError> {
        if self.code != 200 {
            return Err(ApiError::Upstream(if self.status.trim().is_empty() {
                format!("code {}", self.code)
            } else {
                self.status
            }));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}

async fn fetch_json<T>(url: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    tracing::debug!(url, "GET");
    let response = HTTP_CLIENT.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn fetch_envelope<T>(url: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    fetch_json::<Envelope<T>>(url).await?.into_data()
}

fn query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
