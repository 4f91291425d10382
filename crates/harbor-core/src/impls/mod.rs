//! Implementations of the ports.
//!
//! Only the in-memory backend lives here; the PostgreSQL backend is the
//! `harbor-postgres` crate.

pub mod memory;

pub use self::memory::{MemoryChannel, MemoryTable};
