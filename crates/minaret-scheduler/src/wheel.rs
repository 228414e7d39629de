//! The armed-event store: a min-heap keyed by fire instant.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use minaret_core::types::ScheduledEvent;

/// Heap entry ordered by (instant, canonical prayer order, kind rank).
struct Armed(ScheduledEvent);

impl Armed {
    fn sort_key(&self) -> (DateTime<Utc>, usize, u8) {
        (self.0.fires_at, self.0.prayer.canonical_index(), self.0.kind.rank())
    }
}

impl PartialEq for Armed {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Armed {}

impl Ord for Armed {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, the earliest event must surface.
        other.sort_key().cmp(&self.sort_key())
    }
}

impl PartialOrd for Armed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Holds the armed events for the current day and releases them as they
/// come due.
///
/// Owned by the scheduling loop. An armed event leaves the wheel exactly
/// once: released through [`TimerWheel::pop_due`] (marked fired) or dropped
/// by [`TimerWheel::cancel_all`] during a schedule swap. Neither state has a
/// way back.
#[derive(Default)]
pub struct TimerWheel {
    armed: BinaryHeap<Armed>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm events, skipping any whose instant is not strictly in the future.
    ///
    /// The deriver already filters past events; this re-check keeps a
    /// late-running cycle from arming something that would fire instantly.
    /// Returns the number actually armed.
    pub fn arm(&mut self, events: Vec<ScheduledEvent>, now: DateTime<Utc>) -> usize {
        let mut added = 0;
        for event in events {
            if event.fires_at <= now {
                warn!(event = %event.id, fires_at = %event.fires_at, "refusing to arm event already due");
                continue;
            }
            self.armed.push(Armed(event));
            added += 1;
        }
        debug!(added, total = self.armed.len(), "events armed");
        added
    }

    /// Drop every armed event without firing. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.armed.len();
        self.armed.clear();
        cancelled
    }

    /// Remove and return every event due at `now`, earliest first, each
    /// marked fired. Events strictly in the future stay armed.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        while let Some(head) = self.armed.peek() {
            if head.0.fires_at > now {
                break;
            }
            if let Some(Armed(mut event)) = self.armed.pop() {
                event.fired = true;
                due.push(event);
            }
        }
        due
    }

    /// Instant of the earliest armed event, if any.
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.armed.peek().map(|armed| armed.0.fires_at)
    }

    pub fn armed_len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    use minaret_core::types::{EventKind, PrayerName};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap()
    }

    fn event(prayer: PrayerName, kind: EventKind, offset_mins: i64) -> ScheduledEvent {
        ScheduledEvent::new(
            NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            prayer,
            kind,
            base() + Duration::minutes(offset_mins),
        )
    }

    #[test]
    fn pop_due_releases_in_fire_order_with_tie_breaks() {
        let mut wheel = TimerWheel::new();
        // Same instant for the Asr pair; primary must come out first.
        wheel.arm(
            vec![
                event(PrayerName::Isha, EventKind::Primary, 60),
                event(PrayerName::Asr, EventKind::AdvanceReminder { offset_minutes: 0 }, 30),
                event(PrayerName::Asr, EventKind::Primary, 30),
                event(PrayerName::Maghrib, EventKind::Primary, 45),
            ],
            base(),
        );

        let due = wheel.pop_due(base() + Duration::minutes(60));
        let order: Vec<(PrayerName, u8)> = due.iter().map(|e| (e.prayer, e.kind.rank())).collect();
        assert_eq!(
            order,
            vec![
                (PrayerName::Asr, 0),
                (PrayerName::Asr, 1),
                (PrayerName::Maghrib, 0),
                (PrayerName::Isha, 0),
            ]
        );
        assert!(due.iter().all(|e| e.fired));
        assert!(wheel.is_empty());
    }

    #[test]
    fn nothing_fires_before_its_instant() {
        let mut wheel = TimerWheel::new();
        wheel.arm(vec![event(PrayerName::Asr, EventKind::Primary, 30)], base());

        assert!(wheel.pop_due(base()).is_empty());
        assert!(wheel.pop_due(base() + Duration::minutes(29)).is_empty());
        assert_eq!(wheel.armed_len(), 1);

        let due = wheel.pop_due(base() + Duration::minutes(30));
        assert_eq!(due.len(), 1);
        // Released exactly once.
        assert!(wheel.pop_due(base() + Duration::hours(2)).is_empty());
    }

    #[test]
    fn arm_refuses_events_already_due() {
        let mut wheel = TimerWheel::new();
        let armed = wheel.arm(
            vec![
                event(PrayerName::Fajr, EventKind::Primary, -120),
                event(PrayerName::Dhuhr, EventKind::Primary, 0),
                event(PrayerName::Asr, EventKind::Primary, 30),
            ],
            base(),
        );
        assert_eq!(armed, 1);
        assert_eq!(wheel.armed_len(), 1);
        assert_eq!(wheel.next_fire_at(), Some(base() + Duration::minutes(30)));
    }

    #[test]
    fn cancel_all_then_arm_replaces_the_schedule() {
        let mut wheel = TimerWheel::new();
        wheel.arm(
            vec![
                event(PrayerName::Asr, EventKind::Primary, 10),
                event(PrayerName::Isha, EventKind::Primary, 20),
            ],
            base(),
        );

        assert_eq!(wheel.cancel_all(), 2);
        assert!(wheel.is_empty());

        let armed = wheel.arm(vec![event(PrayerName::Maghrib, EventKind::Primary, 15)], base());
        assert_eq!(armed, 1);
        assert_eq!(wheel.armed_len(), 1);

        // Cancelled events never come back.
        let due = wheel.pop_due(base() + Duration::hours(1));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].prayer, PrayerName::Maghrib);
    }
}
