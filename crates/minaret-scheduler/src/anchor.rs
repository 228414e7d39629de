//! Daily-rebuild instant computation.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use minaret_core::types::TimeOfDay;

use crate::derive::resolve_local;

/// First instant strictly after `from` at which the daily anchor wall time
/// occurs in `tz`.
///
/// Today's candidate is tried first, then the following days — more than one
/// step only happens when the anchor wall time lands in a DST gap.
pub fn next_anchor(from: DateTime<Utc>, anchor: TimeOfDay, tz: Tz) -> DateTime<Utc> {
    let local_date = from.with_timezone(&tz).date_naive();
    for offset in 0..=2 {
        let date = local_date + Duration::days(offset);
        if let Some(candidate) = resolve_local(date, anchor, tz) {
            if candidate > from {
                return candidate;
            }
        }
    }
    // Unreachable for real zones; a day out keeps the loop alive regardless.
    from + Duration::days(1)
}
