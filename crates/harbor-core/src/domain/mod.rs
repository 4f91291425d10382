//! Domain model (storage keys, result records, notification events).

pub mod event;
pub mod key;
pub mod record;

pub use self::event::NotificationEvent;
pub use self::key::{StorageKey, MAX_KEY_LEN};
pub use self::record::ResultRecord;
