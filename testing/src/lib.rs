//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist state container.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Async helpers for waiting on side effects
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TasksReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TasksState::default())
//!     .when_action(TasksAction::OnChangeTaskTitle { text: "x".into() })
//!     .then_state(|state| assert_eq!(state.task_title, "x"))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tasklist_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::FixedClock;
    /// use tasklist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2);
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Async helpers for tests driving a store
pub mod helpers {
    use std::time::Duration;
    use tasklist_runtime::SideEffectReceiver;

    /// Wait up to `timeout` for the next side effect
    ///
    /// Returns `None` on timeout or when the receiver has been detached.
    pub async fn next_side_effect<T>(
        receiver: &mut SideEffectReceiver<T>,
        timeout: Duration,
    ) -> Option<T> {
        tokio::time::timeout(timeout, receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Install a test-friendly tracing subscriber honoring `RUST_LOG`
    ///
    /// Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tasklist_runtime::SideEffectSender;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_next_side_effect_times_out() {
        let sender = SideEffectSender::<u8>::default();
        let mut receiver = sender.subscribe();

        assert_eq!(
            helpers::next_side_effect(&mut receiver, Duration::from_millis(10)).await,
            None
        );

        sender.emit(3);
        assert_eq!(
            helpers::next_side_effect(&mut receiver, Duration::from_millis(10)).await,
            Some(3)
        );
    }
}
