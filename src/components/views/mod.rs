mod home;
mod prayer_times;
mod ramadan_calendar;
mod reader;
mod surah_index;

pub use home::HomeView;
pub use prayer_times::PrayerTimesView;
pub use ramadan_calendar::RamadanCalendarView;
pub use reader::{PageReaderView, SurahReaderView};
pub use surah_index::SurahIndexView;

use crate::api::{ApiError, PrayerClient, PrayerDay, PrayerQuery};

/// Splits a "City, Country" location. Anything with more or fewer parts is
/// treated as a free-form address.
fn city_and_country(location: &str) -> Option<(&str, &str)> {
    let (city, country) = location.split_once(',')?;
    let (city, country) = (city.trim(), country.trim());
    if city.is_empty() || country.is_empty() || country.contains(',') {
        return None;
    }
    // "lat, lon" saved after a failed reverse lookup
    if city.parse::<f64>().is_ok() && country.parse::<f64>().is_ok() {
        return None;
    }
    Some((city, country))
}

/// Today's timings for a saved location such as "London, UK".
async fn today_at(location: &str, method: u8) -> Result<PrayerDay, ApiError> {
    let query = PrayerQuery::new(chrono::Local::now().date_naive()).with_method(method);
    let client = PrayerClient::default();
    match city_and_country(location) {
        Some((city, country)) => client.timings_by_city(city, country, &query).await,
        None => client.timings_by_address(location, &query).await,
    }
}
