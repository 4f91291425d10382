//! Ports - abstraction layer over the backing store.
//!
//! Each trait hides one capability of the backing store behind an
//! interface, so the same coordinator logic runs against PostgreSQL in
//! production and the in-memory backend in tests.
//!
//! Design principles:
//! - the result table is the source of truth
//! - the notification channel carries hints, never authoritative state
//! - subscriptions live on a dedicated connection, never shared with
//!   transactional work

pub mod clock;
pub mod notification_channel;
pub mod result_table;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::notification_channel::{ChannelError, NotificationChannel, NotificationStream};
pub use self::result_table::{ResultTable, TableError};
