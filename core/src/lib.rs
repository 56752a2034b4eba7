//! # E-Ticket Core
//!
//! Core traits and types shared by the booking flow.
//!
//! The booking flow is written as a state machine driven by a reducer:
//!
//! - **State**: the in-progress booking (selection, payment status, step)
//! - **Action**: every input, whether a user intent or an adapter callback
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of work the runtime performs later
//! - **Environment**: injected collaborators (payment provider, renderers, clock)
//!
//! Reducers never perform I/O themselves. Anything asynchronous (creating a
//! payment order, capturing it, rendering a ticket) is returned as an
//! [`effect::Effect::Future`] whose output action is fed back into the reducer.
//!
//! ## Example
//!
//! ```
//! use eticket_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct Seats {
//!     count: u8,
//! }
//!
//! enum SeatAction {
//!     Add,
//! }
//!
//! struct SeatReducer;
//!
//! impl Reducer for SeatReducer {
//!     type State = Seats;
//!     type Action = SeatAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Seats,
//!         action: SeatAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<SeatAction>; 4]> {
//!         match action {
//!             SeatAction::Add => state.count = state.count.saturating_add(1).min(10),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut seats = Seats::default();
//! SeatReducer.reduce(&mut seats, SeatAction::Add, &());
//! assert_eq!(seats.count, 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the trait holding all business logic
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Implementations must be deterministic given the same state, action
        /// and environment: validate the action, update state in place, and
        /// describe any side effects as returned values.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values returned by reducers. The runtime's `Store` executes
/// them and sends any produced action back through the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Boxed future that may produce a follow-up action
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(EffectFuture<Action>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the reducer's Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Order identifiers embed a time token, so tests inject a fixed clock
    /// to get reproducible identifiers.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
