use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{MinaretError, Result};
use crate::types::{Location, PrayerName};

pub const DEFAULT_ANCHOR_TIME: &str = "00:01";
pub const DEFAULT_ADVANCE_OFFSET_MINUTES: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMINGS_BASE_URL: &str = "https://api.aladhan.com";
/// AlAdhan calculation method (2 = ISNA), same as the service default we target.
pub const DEFAULT_CALCULATION_METHOD: u8 = 2;

/// Top-level config (minaret.toml + MINARET_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinaretConfig {
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub timings: TimingsConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// When the schedule rebuilds and which reminders are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily rebuild ("HH:MM").
    #[serde(default = "default_anchor_time")]
    pub anchor_time: String,
    /// Prayers that get an advance reminder.
    #[serde(default = "default_advance_prayers")]
    pub advance_reminder_prayers: Vec<PrayerName>,
    /// How many minutes before the prayer the reminder fires.
    #[serde(default = "default_advance_offset")]
    pub advance_offset_minutes: u32,
    /// IANA zone name, e.g. "Africa/Cairo". Required.
    pub timezone: String,
    /// Scheduling loop poll cadence; also bounds worst-case fire latency.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

/// Pin coordinates here to skip IP geolocation entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl LocationConfig {
    /// The pinned location, when both coordinates are present.
    pub fn fixed(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
                city: self.city.clone(),
                country: self.country.clone(),
            }),
            _ => None,
        }
    }
}

/// Prayer-times service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingsConfig {
    #[serde(default = "default_timings_base_url")]
    pub base_url: String,
    #[serde(default = "default_method")]
    pub method: u8,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_timings_base_url(),
            method: default_method(),
        }
    }
}

/// Outbound delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Total send attempts per prayer notification (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    pub telegram: Option<TelegramConfig>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            telegram: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Chat the notifications go to.
    pub chat_id: String,
}

fn default_anchor_time() -> String {
    DEFAULT_ANCHOR_TIME.to_string()
}
fn default_advance_prayers() -> Vec<PrayerName> {
    vec![PrayerName::Asr, PrayerName::Isha]
}
fn default_advance_offset() -> u32 {
    DEFAULT_ADVANCE_OFFSET_MINUTES
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_timings_base_url() -> String {
    DEFAULT_TIMINGS_BASE_URL.to_string()
}
fn default_method() -> u8 {
    DEFAULT_CALCULATION_METHOD
}

impl MinaretConfig {
    /// Load config from a TOML file with MINARET_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.minaret/minaret.toml
    ///
    /// Env keys use "__" as the section separator, e.g.
    /// MINARET_SCHEDULE__TIMEZONE overrides `schedule.timezone`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MinaretConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MINARET_").split("__"))
            .extract()
            .map_err(|e| MinaretError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.minaret/minaret.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> MinaretConfig {
        Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("config should parse")
    }

    #[test]
    fn minimal_config_fills_documented_defaults() {
        let config = from_toml(
            r#"
            [schedule]
            timezone = "Africa/Cairo"
            "#,
        );

        assert_eq!(config.schedule.anchor_time, "00:01");
        assert_eq!(
            config.schedule.advance_reminder_prayers,
            vec![PrayerName::Asr, PrayerName::Isha]
        );
        assert_eq!(config.schedule.advance_offset_minutes, 10);
        assert_eq!(config.schedule.poll_interval_seconds, 30);
        assert_eq!(config.delivery.max_attempts, 3);
        assert!(config.delivery.telegram.is_none());
        assert_eq!(config.timings.method, 2);
        assert!(config.location.fixed().is_none());
    }

    #[test]
    fn full_config_round_trips() {
        let config = from_toml(
            r#"
            [schedule]
            anchor_time = "00:05"
            advance_reminder_prayers = ["fajr", "asr"]
            advance_offset_minutes = 15
            timezone = "Europe/Istanbul"
            poll_interval_seconds = 10

            [location]
            latitude = 41.01
            longitude = 28.97
            city = "Istanbul"
            country = "Turkey"

            [timings]
            base_url = "http://localhost:9090"
            method = 13

            [delivery]
            max_attempts = 5

            [delivery.telegram]
            bot_token = "123:abc"
            chat_id = "42"
            "#,
        );

        assert_eq!(
            config.schedule.advance_reminder_prayers,
            vec![PrayerName::Fajr, PrayerName::Asr]
        );
        let fixed = config.location.fixed().expect("coordinates are pinned");
        assert_eq!(fixed.describe(), "Istanbul, Turkey");
        assert_eq!(config.timings.base_url, "http://localhost:9090");
        let telegram = config.delivery.telegram.expect("telegram configured");
        assert_eq!(telegram.chat_id, "42");
    }

    #[test]
    fn fixed_location_needs_both_coordinates() {
        let config = from_toml(
            r#"
            [schedule]
            timezone = "UTC"

            [location]
            latitude = 21.42
            "#,
        );
        assert!(config.location.fixed().is_none());
    }
}
