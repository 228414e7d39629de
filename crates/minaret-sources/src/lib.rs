//! `minaret-sources` — the external data collaborators.
//!
//! Two seams, both async traits so the scheduler can be tested against
//! scripted fakes:
//!
//! | Seam             | Implementations                               |
//! |------------------|-----------------------------------------------|
//! | [`LocationSource`] | [`IpLocator`] (IP geolocation), [`FixedLocation`] (config-pinned) |
//! | [`TimingSource`]   | [`AladhanClient`] (prayer-times HTTP API)   |

pub mod error;
pub mod location;
pub mod timings;

pub use error::{Result, SourceError};
pub use location::{FixedLocation, IpLocator, LocationSource};
pub use timings::{AladhanClient, TimingSource};
