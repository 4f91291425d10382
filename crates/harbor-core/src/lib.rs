//! harbor-core
//!
//! A durable, shared result store for asynchronous task execution: a worker
//! stores a result under a unique key with a time-to-live, and consumers
//! retrieve it, optionally blocking until it appears or a deadline passes.
//!
//! # Module layout
//! - **domain**: pure types (storage keys, result records, notification events)
//! - **ports**: abstraction layer over the backing store (ResultTable,
//!   NotificationChannel, Clock)
//! - **app**: the store facade, blocking retrieval coordinator, builder, and
//!   a synchronous wrapper
//! - **impls**: in-memory backend for development and tests
//!
//! The result table is the source of truth. The notification channel is a
//! best-effort latency optimization layered on the same backing store; a
//! consumer never trusts a notification alone and always confirms it with a
//! table read.

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{BlockingStore, ResultStore, StoreBuilder, StoreConfig, DEFAULT_TIMEOUT};
pub use domain::{NotificationEvent, ResultRecord, StorageKey, MAX_KEY_LEN};
pub use error::StoreError;
