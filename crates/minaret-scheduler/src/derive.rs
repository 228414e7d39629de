//! Turn a date, a timezone, and a set of times-of-day into the ordered
//! future event set for that day.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use minaret_core::types::{EventKind, PrayerName, PrayerTimes, ScheduledEvent, TimeOfDay};

/// Which prayers get advance reminders, and how far in advance.
#[derive(Debug, Clone)]
pub struct DeriveOptions {
    pub advance_prayers: Vec<PrayerName>,
    pub advance_offset_minutes: u32,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            advance_prayers: vec![PrayerName::Asr, PrayerName::Isha],
            advance_offset_minutes: 10,
        }
    }
}

/// The derived schedule for one local calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEvents {
    /// Future events only, ascending by instant.
    pub events: Vec<ScheduledEvent>,
    /// Prayers that contributed no events because their time was absent
    /// (or unresolvable) — the partial-schedule warning.
    pub missing: Vec<PrayerName>,
}

/// Convert a local wall time on `date` to an absolute instant.
///
/// Ambiguous wall times (the repeated fall-back hour) resolve to the first
/// occurrence; wall times inside a spring-forward gap shift forward an hour
/// at a time until a valid instant exists.
pub fn resolve_local(date: NaiveDate, time: TimeOfDay, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(u32::from(time.hour), u32::from(time.minute), 0)?;
    let mut candidate = naive;
    for _ in 0..3 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(first, _) => return Some(first.with_timezone(&Utc)),
            LocalResult::None => candidate += Duration::hours(1),
        }
    }
    None
}

/// Derive the event set for `date` in `tz`, keeping only events whose
/// instant is strictly after `now`.
///
/// Primaries and reminders are filtered independently: a reminder whose own
/// instant is still ahead is scheduled no matter what happened to its
/// primary. Output is sorted ascending by instant; ties break by canonical
/// prayer order, then primary before reminder.
///
/// Pure: same inputs, same output.
pub fn derive_day(
    date: NaiveDate,
    tz: Tz,
    times: &PrayerTimes,
    now: DateTime<Utc>,
    options: &DeriveOptions,
) -> DayEvents {
    let mut events = Vec::new();
    let mut missing = Vec::new();

    for prayer in PrayerName::ALL {
        let Some(&time) = times.get(&prayer) else {
            missing.push(prayer);
            continue;
        };
        let Some(primary_at) = resolve_local(date, time, tz) else {
            warn!(prayer = %prayer, %time, %date, "wall time has no instant in zone");
            missing.push(prayer);
            continue;
        };

        if primary_at > now {
            events.push(ScheduledEvent::new(date, prayer, EventKind::Primary, primary_at));
        }

        if options.advance_prayers.contains(&prayer) {
            let offset = i64::from(options.advance_offset_minutes);
            let reminder_at = primary_at - Duration::minutes(offset);
            if reminder_at > now {
                events.push(ScheduledEvent::new(
                    date,
                    prayer,
                    EventKind::AdvanceReminder {
                        offset_minutes: options.advance_offset_minutes,
                    },
                    reminder_at,
                ));
            }
        }
    }

    events.sort_by_key(|e| (e.fires_at, e.prayer.canonical_index(), e.kind.rank()));
    DayEvents { events, missing }
}
