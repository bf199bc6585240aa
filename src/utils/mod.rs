//! Common utilities
//!
//! Clock abstraction used by the fixed-step driver, so tests can step time
//! deterministically instead of sleeping.

pub mod time;

pub use time::{MockTimeProvider, MonotonicTimeProvider, TimeProvider};
