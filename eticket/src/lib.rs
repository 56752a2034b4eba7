//! # E-Ticket
//!
//! Ticket purchase flow for a single theatre production.
//!
//! The buyer picks a show date, chooses how many seats to book, accepts the
//! terms and pays through an external provider. Once funds are captured, a
//! single-page PDF ticket is generated with a QR code carrying a compact
//! verification payload.
//!
//! ## Architecture
//!
//! - [`catalog`]: dates on sale and the per-seat price
//! - [`booking`]: the step-by-step state machine, run by an
//!   [`eticket_runtime::Store`]
//! - [`payment`]: provider contract and a sandbox implementation
//! - [`ticket`]: order ids, verification payload, QR encoding, PDF rendering
//!   and document sinks
//! - [`notice`]: buyer-facing failure messages
//! - [`config`]: environment-driven configuration
//!
//! ## Example
//!
//! ```ignore
//! let config = Config::from_env();
//! let env = BookingEnvironment::from_config(&config, SandboxPaymentAdapter::new().shared(), Arc::new(SystemClock));
//! let store = booking_store(env);
//!
//! store.send(BookingAction::SelectDate { key }).await?;
//! store.send(BookingAction::Advance).await?;
//! ```

pub mod booking;
pub mod catalog;
pub mod config;
pub mod locale;
pub mod metrics;
pub mod notice;
pub mod payment;
pub mod ticket;
pub mod types;

pub use booking::{
    booking_store, BookingAction, BookingEnvironment, BookingReducer, BookingState, BookingStore,
    PaidBooking,
};
pub use catalog::{Catalog, CatalogError};
pub use config::Config;
pub use locale::Locale;
pub use notice::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use payment::{PaymentAdapter, PaymentError, SandboxOutcome, SandboxPaymentAdapter};
pub use ticket::{TicketDocument, TicketError, TicketGenerator, VerificationPayload};
pub use types::{DateKey, Money, PaymentStatus, Quantity, ShowDate, Step};
