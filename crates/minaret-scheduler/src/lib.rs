//! `minaret-scheduler` — the daily recurring-event scheduler.
//!
//! # Overview
//!
//! Once per day (at a fixed local anchor time, default 00:01) the
//! [`engine::SchedulerEngine`] resolves a location, fetches the day's
//! prayer times-of-day, derives the absolute-instant event set (primaries
//! plus advance reminders), and swaps it into the [`wheel::TimerWheel`]
//! with a single cancel-all-then-arm operation. A poll loop releases due
//! events to the dispatch worker over an mpsc channel.
//!
//! # Modules
//!
//! | Module     | Responsibility                                         |
//! |------------|--------------------------------------------------------|
//! | `derive`   | date + times-of-day + now → ordered future events      |
//! | `wheel`    | armed-event min-heap: arm / cancel_all / pop_due       |
//! | `anchor`   | next daily-rebuild instant in the configured zone      |
//! | `engine`   | the cycle controller and scheduling loop               |

pub mod anchor;
pub mod derive;
pub mod engine;
pub mod error;
pub mod wheel;

pub use derive::{derive_day, DayEvents, DeriveOptions};
pub use engine::{CycleSummary, EngineOptions, SchedulerEngine};
pub use error::{EngineError, Result};
pub use wheel::TimerWheel;
