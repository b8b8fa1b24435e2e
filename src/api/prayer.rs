// Typed client for the aladhan prayer-time service and the derivations the
// prayer views need on top of it.
use super::{fetch_envelope, query_string, ApiError};
use crate::api::models::*;
use crate::config::{DEFAULT_PRAYER_METHOD, PRAYER_API_URL};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

/// Hijri month number of Ramadan.
const RAMADAN_MONTH: u8 = 9;

/// A calculation convention the service understands, by its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationMethod {
    pub id: u8,
    pub name: &'static str,
    pub angles: &'static str,
}

pub const CALCULATION_METHODS: &[CalculationMethod] = &[
    CalculationMethod { id: 0, name: "Shia Ithna-Ashari", angles: "Leva Institute, Qum" },
    CalculationMethod { id: 1, name: "University of Islamic Sciences, Karachi", angles: "Fajr 18°, Isha 18°" },
    CalculationMethod { id: 2, name: "Islamic Society of North America", angles: "Fajr 15°, Isha 15°" },
    CalculationMethod { id: 3, name: "Muslim World League", angles: "Fajr 18°, Isha 17°" },
    CalculationMethod { id: 4, name: "Umm Al-Qura University, Makkah", angles: "Fajr 18.5°, Isha 90 min after Maghrib" },
    CalculationMethod { id: 5, name: "Egyptian General Authority of Survey", angles: "Fajr 19.5°, Isha 17.5°" },
    CalculationMethod { id: 7, name: "Institute of Geophysics, University of Tehran", angles: "Fajr 17.7°, Isha 14°" },
    CalculationMethod { id: 8, name: "Gulf Region", angles: "Fajr 19.5°, Isha 90 min after Maghrib" },
    CalculationMethod { id: 9, name: "Kuwait", angles: "Fajr 18°, Isha 17.5°" },
    CalculationMethod { id: 10, name: "Qatar", angles: "Fajr 18°, Isha 90 min after Maghrib" },
    CalculationMethod { id: 11, name: "Majlis Ugama Islam Singapura", angles: "Fajr 20°, Isha 18°" },
    CalculationMethod { id: 12, name: "Union Organization Islamic de France", angles: "Fajr 12°, Isha 12°" },
    CalculationMethod { id: 13, name: "Diyanet İşleri Başkanlığı, Turkey", angles: "Fajr 18°, Isha 17°" },
    CalculationMethod { id: 14, name: "Spiritual Administration of Muslims of Russia", angles: "Fajr 16°, Isha 15°" },
    CalculationMethod { id: 15, name: "Moonsighting Committee Worldwide", angles: "Fajr 18°, Isha 18°" },
    CalculationMethod { id: 16, name: "Dubai, UAE", angles: "Fajr 18.2°, Isha 18.2°" },
];

pub fn calculation_method(id: u8) -> Option<&'static CalculationMethod> {
    CALCULATION_METHODS.iter().find(|method| method.id == id)
}

/// Calculation parameters shared by every timings request.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerQuery {
    pub date: NaiveDate,
    pub method: u8,
    /// Comma separated minute offsets for imsak, fajr, sunrise, dhuhr, asr,
    /// maghrib, sunset, isha, midnight.
    pub tune: Option<String>,
}

impl PrayerQuery {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            method: DEFAULT_PRAYER_METHOD,
            tune: None,
        }
    }

    pub fn with_method(mut self, method: u8) -> Self {
        self.method = method;
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("method", self.method.to_string()),
            // Angle based.
            ("latitudeAdjustmentMethod", "3".to_string()),
            // Shafi.
            ("school", "0".to_string()),
            ("adjustment", "1".to_string()),
            ("midnightMode", "0".to_string()),
        ];
        if let Some(tune) = self.tune.as_ref().filter(|tune| !tune.trim().is_empty()) {
            params.push(("tune", tune.clone()));
        }
        params
    }
}

/// `DD-MM-YYYY`, the date form the service expects in paths.
pub fn format_request_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[derive(Debug, Clone)]
pub struct PrayerClient {
    base_url: String,
}

impl Default for PrayerClient {
    fn default() -> Self {
        Self::new(PRAYER_API_URL)
    }
}

impl PrayerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        format!("{}/{}?{}", self.base_url, path, query_string(params))
    }

    pub async fn timings_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        query: &PrayerQuery,
    ) -> Result<PrayerDay, ApiError> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ];
        params.extend(query.params());
        let url = self.url(&format!("timings/{}", format_request_date(query.date)), &params);
        fetch_envelope::<WireDay>(&url).await.map(WireDay::into_day)
    }

    pub async fn timings_by_city(
        &self,
        city: &str,
        country: &str,
        query: &PrayerQuery,
    ) -> Result<PrayerDay, ApiError> {
        let mut params = vec![("city", city.to_string()), ("country", country.to_string())];
        params.extend(query.params());
        let url = self.url(
            &format!("timingsByCity/{}", format_request_date(query.date)),
            &params,
        );
        fetch_envelope::<WireDay>(&url).await.map(WireDay::into_day)
    }

    pub async fn timings_by_address(
        &self,
        address: &str,
        query: &PrayerQuery,
    ) -> Result<PrayerDay, ApiError> {
        let mut params = vec![("address", address.to_string())];
        params.extend(query.params());
        let url = self.url(
            &format!("timingsByAddress/{}", format_request_date(query.date)),
            &params,
        );
        fetch_envelope::<WireDay>(&url).await.map(WireDay::into_day)
    }

    /// Every day of a Gregorian month at the given coordinates.
    pub async fn calendar(
        &self,
        year: i32,
        month: u32,
        latitude: f64,
        longitude: f64,
        method: u8,
    ) -> Result<Vec<PrayerDay>, ApiError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("method", method.to_string()),
            ("month", month.to_string()),
            ("year", year.to_string()),
        ];
        let days = fetch_envelope::<Vec<WireDay>>(&self.url("calendar", &params)).await?;
        Ok(days.into_iter().map(WireDay::into_day).collect())
    }

    /// Suhoor and iftar times for each day of Ramadan in `hijri_year`.
    pub async fn ramadan_calendar(
        &self,
        hijri_year: u16,
        address: &str,
        method: u8,
    ) -> Result<Vec<RamadanDay>, ApiError> {
        let params = [
            ("address", address.to_string()),
            ("method", method.to_string()),
        ];
        let url = self.url(
            &format!("hijriCalendarByAddress/{hijri_year}/{RAMADAN_MONTH}"),
            &params,
        );
        let days = fetch_envelope::<Vec<WireDay>>(&url).await?;
        Ok(days
            .into_iter()
            .map(WireDay::into_day)
            .map(|day| ramadan_day(&day))
            .collect())
    }
}

pub fn ramadan_day(day: &PrayerDay) -> RamadanDay {
    let timings = &day.timings;
    RamadanDay {
        day: day.hijri_day,
        date: day.gregorian_date.clone(),
        weekday: day.weekday.clone(),
        suhoor: format_prayer_time(timings.suhoor()),
        dhuhr: format_prayer_time(&timings.dhuhr),
        asr: format_prayer_time(&timings.asr),
        iftar: format_prayer_time(&timings.maghrib),
        isha: format_prayer_time(&timings.isha),
    }
}

/// Renders `HH:MM` (optionally suffixed, e.g. `05:14 (BST)`) as `h:MM AM`.
/// Inputs that are not clock times are returned unchanged.
pub fn format_prayer_time(time: &str) -> String {
    let Some((hours, minutes)) = time.trim().split_once(':') else {
        return time.to_string();
    };
    let Ok(hours) = hours.trim().parse::<u32>() else {
        return time.to_string();
    };
    let minutes: String = minutes.chars().take(2).collect();
    let meridiem = if hours >= 12 { "PM" } else { "AM" };
    let hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{hours}:{minutes} {meridiem}")
}

fn parse_clock(time: &str) -> Option<NaiveTime> {
    let clock = time.split_whitespace().next()?;
    NaiveTime::parse_from_str(clock, "%H:%M").ok()
}

/// The first prayer after `now`, or tomorrow's Fajr once Isha has passed.
/// `None` when the timings carry no readable clock values.
pub fn next_prayer(timings: &PrayerTimings, now: NaiveDateTime) -> Option<NextPrayer> {
    let today = now.date();
    let scheduled: Vec<(&'static str, &str, NaiveDateTime)> = timings
        .daily()
        .into_iter()
        .filter_map(|(name, time)| parse_clock(time).map(|clock| (name, time, today.and_time(clock))))
        .collect();

    let (name, time, at) = match scheduled.iter().find(|(_, _, at)| *at > now) {
        Some(found) => *found,
        None => {
            let fajr = parse_clock(&timings.fajr)?;
            let tomorrow = today.succ_opt()?;
            ("Fajr", timings.fajr.as_str(), tomorrow.and_time(fajr))
        }
    };

    Some(NextPrayer {
        name,
        time: time.to_string(),
        remaining: format_remaining(at - now),
    })
}

fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Hijri year to show in the Ramadan calendar: the current one, or the next
/// when this year's Ramadan is already over.
pub fn upcoming_ramadan_year(hijri_year: u16, hijri_month: u8) -> u16 {
    if hijri_month > RAMADAN_MONTH {
        hijri_year + 1
    } else {
        hijri_year
    }
}

#[derive(Debug, Deserialize)]
struct WireDay {
    timings: PrayerTimings,
    date: WireDate,
    #[serde(default)]
    meta: Option<WireMeta>,
}

#[derive(Debug, Deserialize)]
struct WireDate {
    #[serde(default)]
    readable: String,
    gregorian: WireGregorian,
    hijri: WireHijri,
}

#[derive(Debug, Deserialize)]
struct WireGregorian {
    date: String,
    #[serde(default)]
    weekday: Option<WireName>,
}

#[derive(Debug, Deserialize)]
struct WireHijri {
    date: String,
    day: String,
    month: WireHijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct WireHijriMonth {
    number: u8,
    en: String,
}

#[derive(Debug, Deserialize)]
struct WireName {
    en: String,
}

#[derive(Debug, Deserialize)]
struct WireMeta {
    #[serde(default)]
    timezone: String,
}

impl WireDay {
    fn into_day(self) -> PrayerDay {
        PrayerDay {
            timings: self.timings,
            readable_date: self.date.readable,
            gregorian_date: self.date.gregorian.date,
            weekday: self
                .date
                .gregorian
                .weekday
                .map(|weekday| weekday.en)
                .unwrap_or_default(),
            hijri_date: self.date.hijri.date,
            hijri_day: self.date.hijri.day.trim().parse().unwrap_or(0),
            hijri_month: self.date.hijri.month.en,
            hijri_month_number: self.date.hijri.month.number,
            hijri_year: self.date.hijri.year,
            timezone: self.meta.map(|meta| meta.timezone).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_method_is_listed() {
        let method = calculation_method(DEFAULT_PRAYER_METHOD).unwrap();
        assert_eq!(method.name, "Muslim World League");
        assert_eq!(calculation_method(6), None);
    }

    fn timings() -> PrayerTimings {
        PrayerTimings {
            fajr: "05:14 (EST)".to_string(),
            sunrise: "06:45 (EST)".to_string(),
            dhuhr: "12:30 (EST)".to_string(),
            asr: "15:45 (EST)".to_string(),
            sunset: "18:13 (EST)".to_string(),
            maghrib: "18:15 (EST)".to_string(),
            isha: "19:45 (EST)".to_string(),
            imsak: "05:04 (EST)".to_string(),
            midnight: "00:30 (EST)".to_string(),
        }
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 11)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn formats_twelve_hour_clock() {
        assert_eq!(format_prayer_time("13:05 (BST)"), "1:05 PM");
        assert_eq!(format_prayer_time("00:30"), "12:30 AM");
        assert_eq!(format_prayer_time("12:00"), "12:00 PM");
        assert_eq!(format_prayer_time("05:14"), "5:14 AM");
        assert_eq!(format_prayer_time("soon"), "soon");
    }

    #[test]
    fn next_prayer_is_the_first_one_after_now() {
        let next = next_prayer(&timings(), at(13, 14, 27)).unwrap();
        assert_eq!(next.name, "Asr");
        assert_eq!(next.remaining, "02:30:33");
    }

    #[test]
    fn next_prayer_wraps_to_tomorrow_fajr() {
        let next = next_prayer(&timings(), at(21, 0, 0)).unwrap();
        assert_eq!(next.name, "Fajr");
        assert_eq!(next.remaining, "08:14:00");
    }

    #[test]
    fn next_prayer_needs_readable_times() {
        assert_eq!(next_prayer(&PrayerTimings::default(), at(9, 0, 0)), None);
    }

    #[test]
    fn request_date_is_day_first() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(format_request_date(date), "01-03-2025");
    }

    #[test]
    fn query_carries_service_defaults() {
        let query = PrayerQuery::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let params = query.params();
        assert!(params.contains(&("method", "3".to_string())));
        assert!(params.contains(&("latitudeAdjustmentMethod", "3".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "tune"));
    }

    #[test]
    fn ramadan_day_prefers_imsak_for_suhoor() {
        let day = PrayerDay {
            timings: timings(),
            readable_date: "11 Mar 2025".to_string(),
            gregorian_date: "11-03-2025".to_string(),
            hijri_date: "11-09-1446".to_string(),
            hijri_day: 11,
            hijri_month: "Ramaḍān".to_string(),
            hijri_month_number: 9,
            hijri_year: "1446".to_string(),
            weekday: "Tuesday".to_string(),
            timezone: "America/New_York".to_string(),
        };
        let ramadan = ramadan_day(&day);
        assert_eq!(ramadan.suhoor, "5:04 AM");
        assert_eq!(ramadan.iftar, "6:15 PM");
        assert_eq!(ramadan.day, 11);
    }

    #[test]
    fn wire_day_parses_service_payload() {
        let wire: WireDay = serde_json::from_str(
            r#"{"timings":{"Fajr":"05:14","Sunrise":"06:45","Dhuhr":"12:30","Asr":"15:45",
                "Sunset":"18:13","Maghrib":"18:15","Isha":"19:45","Imsak":"05:04","Midnight":"00:30"},
                "date":{"readable":"11 Mar 2025","timestamp":"1741680000",
                  "gregorian":{"date":"11-03-2025","weekday":{"en":"Tuesday"}},
                  "hijri":{"date":"11-09-1446","day":"11","month":{"number":9,"en":"Ramaḍān"},"year":"1446"}},
                "meta":{"timezone":"America/New_York"}}"#,
        )
        .unwrap();
        let day = wire.into_day();
        assert_eq!(day.hijri_day, 11);
        assert_eq!(day.weekday, "Tuesday");
        assert_eq!(day.timezone, "America/New_York");
    }

    #[test]
    fn ramadan_year_rolls_over_after_the_month() {
        assert_eq!(upcoming_ramadan_year(1446, 8), 1446);
        assert_eq!(upcoming_ramadan_year(1446, 9), 1446);
        assert_eq!(upcoming_ramadan_year(1446, 10), 1447);
    }
}
