//! The three-step booking flow: date, seats, payment.
//!
//! [`BookingReducer`] owns every transition of a [`BookingState`]. Provider
//! calls and ticket generation run as effects and report back as
//! [`BookingAction`]s, so the store keeps serving buyer intents while they
//! are in flight.

mod actions;
mod environment;
mod reducer;
mod state;

#[cfg(test)]
mod tests;

pub use actions::BookingAction;
pub use environment::BookingEnvironment;
pub use reducer::BookingReducer;
pub use state::{
    BookingSelection, BookingState, IssuedTicket, OrderSummary, PaidBooking, PendingOrder,
    StepProgress,
};

use eticket_runtime::Store;

/// Store running the booking reducer
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Starts a fresh booking session
#[must_use]
pub fn booking_store(environment: BookingEnvironment) -> BookingStore {
    Store::new(BookingState::new(), BookingReducer::new(), environment)
}
