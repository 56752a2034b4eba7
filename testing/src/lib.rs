//! # E-Ticket Testing
//!
//! Testing utilities for reducers of the booking flow.
//!
//! This crate provides:
//! - Deterministic clocks
//! - A Given-When-Then builder for reducers ([`ReducerTest`])
//! - Assertion helpers for returned effects
//! - [`run_effects`] to resolve future effects into the actions they produce,
//!   so adapter round-trips can be driven by hand
//!
//! ## Example
//!
//! ```ignore
//! use eticket_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(BookingReducer::new())
//!     .with_env(test_env())
//!     .given_state(BookingState::default())
//!     .when_action(BookingAction::SetQuantity { value: 42 })
//!     .then_state(|state| assert_eq!(state.quantity().get(), 10))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use eticket_core::effect::Effect;
use eticket_core::environment::Clock;
use futures::future::BoxFuture;
use futures::FutureExt;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use eticket_testing::mocks::FixedClock;
    /// use eticket_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
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

    /// Clock that advances by a fixed step on every read
    ///
    /// Useful where consecutive reads must differ, e.g. time-derived order ids.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: chrono::Duration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` and advancing by `step`
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Create a default fixed clock for tests (2025-09-01 18:30:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_instant())
    }

    /// The instant returned by [`test_clock`]
    #[must_use]
    pub fn test_instant() -> DateTime<Utc> {
        DateTime::from_timestamp(1_756_751_400, 0).unwrap_or_default()
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SteppingClock};

/// Execute effects outside a Store and collect the actions they produce
///
/// `Future` and `Delay` effects are awaited in order (delays are not slept);
/// `Parallel` and `Sequential` are flattened. Produced actions are returned
/// without being reduced, leaving the test in control of feeding them back.
pub async fn run_effects<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A>
where
    A: Send + 'static,
{
    let mut actions = Vec::new();
    for effect in effects {
        collect(effect, &mut actions).await;
    }
    actions
}

fn collect<A>(effect: Effect<A>, actions: &mut Vec<A>) -> BoxFuture<'_, ()>
where
    A: Send + 'static,
{
    async move {
        match effect {
            Effect::None => {},
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
            Effect::Delay { action, .. } => actions.push(*action),
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                for effect in effects {
                    collect(effect, actions).await;
                }
            },
        }
    }
    .boxed()
}
