use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use minaret_core::types::{Location, PrayerName, PrayerTimes, TimeOfDay};

use crate::error::{Result, SourceError};

/// Provides the day's prayer times-of-day for a set of coordinates.
#[async_trait]
pub trait TimingSource: Send + Sync {
    async fn fetch_for_date(&self, date: NaiveDate, location: &Location) -> Result<PrayerTimes>;
}

/// Client for the AlAdhan timings API.
///
/// GET `{base}/v1/timings/{DD-MM-YYYY}?latitude=…&longitude=…&method=…`
pub struct AladhanClient {
    client: reqwest::Client,
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>, method: u8) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            method,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    #[serde(default)]
    data: Option<TimingsData>,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: BTreeMap<String, String>,
}

#[async_trait]
impl TimingSource for AladhanClient {
    async fn fetch_for_date(&self, date: NaiveDate, location: &Location) -> Result<PrayerTimes> {
        let url = format!("{}/v1/timings/{}", self.base_url, date.format("%d-%m-%Y"));
        debug!(%url, latitude = location.latitude, longitude = location.longitude, "fetching prayer times");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("method", self.method.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::FetchFailed {
                status: None,
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::FetchFailed {
                status: Some(status.as_u16()),
                reason: if body.is_empty() { status.to_string() } else { body },
            });
        }

        let body: TimingsResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        parse_timings(body)
    }
}

/// Extract the five canonical prayers from the raw timings map.
///
/// Extra keys (Sunrise, Imsak, Midnight, …) are ignored. Unparseable values
/// are skipped with a warning; the deriver reports the resulting gap as a
/// partial-schedule warning rather than failing the cycle.
fn parse_timings(resp: TimingsResponse) -> Result<PrayerTimes> {
    let data = resp
        .data
        .ok_or_else(|| SourceError::Parse("response missing data.timings".to_string()))?;

    let mut times = PrayerTimes::new();
    for prayer in PrayerName::ALL {
        let Some(raw) = data.timings.get(prayer.api_key()) else {
            continue;
        };
        match TimeOfDay::parse(raw) {
            Ok(time) => {
                times.insert(prayer, time);
            }
            Err(e) => warn!(prayer = %prayer, raw = %raw, "unparseable timing value: {e}"),
        }
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(timings: &[(&str, &str)]) -> TimingsResponse {
        TimingsResponse {
            data: Some(TimingsData {
                timings: timings
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
        }
    }

    #[test]
    fn full_payload_yields_all_five_prayers() {
        let resp = response_with(&[
            ("Fajr", "05:10"),
            ("Sunrise", "06:38"),
            ("Dhuhr", "12:15"),
            ("Asr", "15:45"),
            ("Sunset", "18:20"),
            ("Maghrib", "18:20"),
            ("Isha", "19:50"),
            ("Imsak", "05:00"),
            ("Midnight", "00:17"),
        ]);
        let times = parse_timings(resp).unwrap();
        assert_eq!(times.len(), 5);
        assert_eq!(times[&PrayerName::Fajr], TimeOfDay { hour: 5, minute: 10 });
        assert_eq!(times[&PrayerName::Isha], TimeOfDay { hour: 19, minute: 50 });
    }

    #[test]
    fn zone_annotated_values_parse() {
        let resp = response_with(&[("Fajr", "05:10 (EET)")]);
        let times = parse_timings(resp).unwrap();
        assert_eq!(times[&PrayerName::Fajr], TimeOfDay { hour: 5, minute: 10 });
    }

    #[test]
    fn missing_and_garbled_entries_are_just_absent() {
        let resp = response_with(&[("Fajr", "05:10"), ("Dhuhr", "high noon"), ("Asr", "15:45")]);
        let times = parse_timings(resp).unwrap();
        assert_eq!(times.len(), 2);
        assert!(!times.contains_key(&PrayerName::Dhuhr));
        assert!(!times.contains_key(&PrayerName::Maghrib));
    }

    #[test]
    fn missing_data_is_a_parse_error() {
        let resp = TimingsResponse { data: None };
        assert!(matches!(parse_timings(resp), Err(SourceError::Parse(_))));
    }
}
