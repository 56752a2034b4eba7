//! Actions accepted by the booking reducer.

use crate::payment::{CaptureReceipt, OrderHandle};
use crate::ticket::OrderId;
use crate::types::DateKey;
use serde::{Deserialize, Serialize};

/// Actions for the booking flow
///
/// The first group are buyer intents; the second group is reported by the
/// payment provider or by effects the reducer started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    // ========== Buyer intents ==========
    /// Pick a performance; unknown keys are ignored
    SelectDate {
        /// Catalog key
        key: DateKey,
    },

    /// Set seats, clamped into range
    SetQuantity {
        /// Requested seats
        value: i64,
    },

    /// Raw text typed into the seats field
    EnterQuantity {
        /// Field contents
        raw: String,
    },

    /// One more seat
    IncrementQuantity,

    /// One less seat
    DecrementQuantity,

    /// Next step, if the current one is complete
    Advance,

    /// Previous step
    Retreat,

    /// Tick or untick the terms box
    SetTermsAccepted {
        /// New checkbox value
        accepted: bool,
    },

    /// Press the pay button
    StartPayment,

    /// Ask for the ticket of the captured booking
    DownloadTicket,

    // ========== Provider callbacks and effect results ==========
    //
    // Effect results carry the attempt that started them; results for any
    // other attempt are dropped.

    /// The provider created an order
    OrderCreated {
        /// Payment attempt
        attempt: u64,
        /// Provider order
        handle: OrderHandle,
    },

    /// The buyer approved the order in the provider window
    PaymentApproved,

    /// Funds were captured
    PaymentCaptured {
        /// Payment attempt
        attempt: u64,
        /// Capture proof
        receipt: CaptureReceipt,
    },

    /// Capture after approval failed
    CaptureFailed {
        /// Payment attempt
        attempt: u64,
        /// Provider reason
        reason: String,
    },

    /// The provider reported an error
    PaymentErrored {
        /// Payment attempt
        attempt: u64,
        /// Provider reason
        reason: String,
    },

    /// The buyer closed the provider window
    PaymentCancelled,

    /// The provider reported the capture as cancelled
    CaptureCancelled {
        /// Payment attempt
        attempt: u64,
    },

    /// A ticket reached the sink
    TicketIssued {
        /// Delivered file name
        file_name: String,
        /// Order id printed on the ticket
        order_id: OrderId,
    },

    /// Ticket generation or delivery failed
    TicketFailed {
        /// Cause
        reason: String,
    },
}
