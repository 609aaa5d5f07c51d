//! Shared provider traits for dependency injection.
//!
//! Abstracting the clock lets `--time` output be asserted on in tests.

use chrono::{DateTime, Local};

/// Trait for providing the current local time.
///
/// # Example
///
/// ```
/// use genie::providers::{SystemTimeProvider, TimeProvider};
///
/// let provider = SystemTimeProvider;
/// assert!(provider.now().timestamp() > 0);
/// ```
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Default time provider using the system clock.
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
