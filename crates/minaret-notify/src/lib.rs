//! `minaret-notify` — message formatting and outbound delivery.
//!
//! The scheduling loop hands fired events to a [`dispatch::Dispatcher`]
//! worker over an mpsc channel; the dispatcher formats them and pushes them
//! through a [`channel::DeliveryChannel`] with exponential-backoff retry on
//! transient failures. Telegram is the concrete channel.

pub mod channel;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod telegram;

pub use channel::DeliveryChannel;
pub use dispatch::Dispatcher;
pub use error::{DeliveryError, Result};
pub use telegram::TelegramChannel;
