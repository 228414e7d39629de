//! Message bodies for the two notification templates and the boot notice.
//!
//! The structure is the contract: a primary carries header, prayer name,
//! time, date, and closing; a reminder adds the minutes remaining.

use chrono::Duration;
use chrono_tz::Tz;

use minaret_core::types::{EventKind, OnlineNotice, ScheduledEvent};

/// Render the body for a fired event.
pub fn event_body(event: &ScheduledEvent, tz: Tz) -> String {
    match event.kind {
        EventKind::Primary => {
            let local = event.fires_at.with_timezone(&tz);
            format!(
                "🕌 Time for {prayer} prayer!\n\
                 {prayer} is at {time}.\n\
                 {date}\n\
                 May it be accepted.",
                prayer = event.prayer,
                time = local.format("%H:%M"),
                date = local.format("%A, %-d %B %Y"),
            )
        }
        EventKind::AdvanceReminder { offset_minutes } => {
            // The reminder fires before the prayer; show the prayer's own time.
            let prayer_at = (event.fires_at + Duration::minutes(i64::from(offset_minutes)))
                .with_timezone(&tz);
            format!(
                "⏰ {prayer} prayer is in {minutes} minutes.\n\
                 {prayer} is at {time}.\n\
                 {date}\n\
                 Get ready.",
                prayer = event.prayer,
                minutes = offset_minutes,
                time = prayer_at.format("%H:%M"),
                date = prayer_at.format("%A, %-d %B %Y"),
            )
        }
    }
}

/// Render the one-time boot summary.
pub fn online_body(notice: &OnlineNotice) -> String {
    let prayers = notice
        .advance_prayers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "🟢 Minaret is online.\n\
         Location: {location} ({lat:.4}, {lon:.4})\n\
         Advance reminders: {prayers} ({offset} minutes before).",
        location = notice.location.describe(),
        lat = notice.location.latitude,
        lon = notice.location.longitude,
        prayers = if prayers.is_empty() { "off".to_string() } else { prayers },
        offset = notice.advance_offset_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    use minaret_core::types::{Location, PrayerName};

    fn tz() -> Tz {
        "Africa/Cairo".parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn primary_body_carries_name_time_and_date() {
        // 15:45 Cairo (EEST, UTC+3) = 12:45 UTC.
        let event = ScheduledEvent::new(
            date(),
            PrayerName::Asr,
            EventKind::Primary,
            Utc.with_ymd_and_hms(2025, 7, 15, 12, 45, 0).unwrap(),
        );
        let body = event_body(&event, tz());
        assert!(body.contains("Asr"));
        assert!(body.contains("15:45"));
        assert!(body.contains("Tuesday, 15 July 2025"));
        assert!(!body.contains("minutes"));
    }

    #[test]
    fn reminder_body_shows_the_prayer_time_not_its_own() {
        // Reminder fires 19:40 local; Isha itself is 19:50.
        let event = ScheduledEvent::new(
            date(),
            PrayerName::Isha,
            EventKind::AdvanceReminder { offset_minutes: 10 },
            Utc.with_ymd_and_hms(2025, 7, 15, 16, 40, 0).unwrap(),
        );
        let body = event_body(&event, tz());
        assert!(body.contains("Isha"));
        assert!(body.contains("10 minutes"));
        assert!(body.contains("19:50"));
        assert!(!body.contains("19:40"));
    }

    #[test]
    fn online_body_summarizes_location_and_features() {
        let notice = OnlineNotice {
            location: Location {
                latitude: 30.0444,
                longitude: 31.2357,
                city: Some("Cairo".into()),
                country: Some("Egypt".into()),
            },
            advance_prayers: vec![PrayerName::Asr, PrayerName::Isha],
            advance_offset_minutes: 10,
        };
        let body = online_body(&notice);
        assert!(body.contains("Cairo, Egypt"));
        assert!(body.contains("30.0444"));
        assert!(body.contains("Asr, Isha"));
        assert!(body.contains("10 minutes"));
    }
}
