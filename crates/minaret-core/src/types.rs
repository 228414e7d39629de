//! Domain types shared between the scheduler, the data sources, and the
//! notification dispatcher.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MinaretError;

/// The five daily prayers, declared in canonical daily order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All prayers in canonical order.
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// Position in canonical daily order (0 = Fajr).
    pub fn canonical_index(self) -> usize {
        self as usize
    }

    /// Key used by the timings API payload ("Fajr", "Dhuhr", …).
    pub fn api_key(self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    /// Lowercase form used in event IDs and config values.
    pub fn slug(self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_key())
    }
}

impl FromStr for PrayerName {
    type Err = MinaretError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            other => Err(MinaretError::UnknownPrayer(other.to_string())),
        }
    }
}

/// A date-independent wall-clock value in some named timezone.
///
/// Invariant: `hour ∈ [0,23]`, `minute ∈ [0,59]` — enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> std::result::Result<Self, MinaretError> {
        if hour > 23 || minute > 59 {
            return Err(MinaretError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parse an "HH:MM" string.
    ///
    /// Tolerates a trailing " (ZONE)" annotation — the timings API returns
    /// values like "05:10 (EET)" when zone info is requested.
    pub fn parse(s: &str) -> std::result::Result<Self, MinaretError> {
        let trimmed = s.trim();
        let core = trimmed
            .split_once(" (")
            .map(|(head, _)| head)
            .unwrap_or(trimmed);

        let (h, m) = core
            .split_once(':')
            .ok_or_else(|| MinaretError::InvalidTime(s.to_string()))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| MinaretError::InvalidTime(s.to_string()))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| MinaretError::InvalidTime(s.to_string()))?;
        Self::new(hour, minute).map_err(|_| MinaretError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = MinaretError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The fetched times-of-day for one date, keyed by prayer.
pub type PrayerTimes = BTreeMap<PrayerName, TimeOfDay>;

/// Whether an event is the prayer instant itself or a heads-up before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Primary,
    AdvanceReminder { offset_minutes: u32 },
}

impl EventKind {
    /// Tie-break rank at equal instants: primaries fire before reminders.
    pub fn rank(self) -> u8 {
        match self {
            EventKind::Primary => 0,
            EventKind::AdvanceReminder { .. } => 1,
        }
    }

    /// Short form used in event IDs.
    pub fn slug(self) -> &'static str {
        match self {
            EventKind::Primary => "primary",
            EventKind::AdvanceReminder { .. } => "reminder",
        }
    }
}

/// One armed notification slot.
///
/// Created by the deriver, owned by the timer wheel until it is either
/// popped for delivery (`fired` set) or dropped by a schedule swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// "<date>/<prayer>/<kind>" — unique within one day's schedule.
    pub id: String,
    pub prayer: PrayerName,
    pub kind: EventKind,
    /// Absolute instant, already resolved from the configured zone.
    pub fires_at: DateTime<Utc>,
    /// Set by the wheel when the event is released for delivery.
    pub fired: bool,
}

impl ScheduledEvent {
    pub fn new(date: NaiveDate, prayer: PrayerName, kind: EventKind, fires_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("{date}/{}/{}", prayer.slug(), kind.slug()),
            prayer,
            kind,
            fires_at,
            fired: false,
        }
    }
}

/// Resolved coordinates plus whatever place names the provider knew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// "City, Country" when known, bare coordinates otherwise.
    pub fn describe(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(city), None) => city.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => format!("{:.2}, {:.2}", self.latitude, self.longitude),
        }
    }
}

/// What travels from the scheduling loop to the dispatch worker.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A fired prayer or reminder event; delivered with retry.
    Prayer(ScheduledEvent),
    /// One-time boot summary; delivered best-effort, no retry.
    Online(OnlineNotice),
}

/// Boot summary: where we are and which reminders are active.
#[derive(Debug, Clone)]
pub struct OnlineNotice {
    pub location: Location,
    pub advance_prayers: Vec<PrayerName>,
    pub advance_offset_minutes: u32,
}
