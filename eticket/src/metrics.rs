//! Metric names recorded by the booking flow.

use metrics::describe_counter;

/// Orders sent to the payment provider
pub const PAYMENTS_STARTED: &str = "eticket.payments.started";

/// Payments whose funds were captured
pub const PAYMENTS_CAPTURED: &str = "eticket.payments.captured";

/// Payments that failed, labelled by `stage` (`create` or `capture`)
pub const PAYMENTS_FAILED: &str = "eticket.payments.failed";

/// Tickets delivered to a sink
pub const TICKETS_ISSUED: &str = "eticket.tickets.issued";

/// Ticket generation attempts that failed
pub const TICKETS_FAILED: &str = "eticket.tickets.failed";

/// Register descriptions for every booking metric.
pub fn describe_booking_metrics() {
    describe_counter!(PAYMENTS_STARTED, "Orders sent to the payment provider");
    describe_counter!(PAYMENTS_CAPTURED, "Payments captured");
    describe_counter!(PAYMENTS_FAILED, "Payments failed, by stage");
    describe_counter!(TICKETS_ISSUED, "Tickets delivered");
    describe_counter!(TICKETS_FAILED, "Ticket generation failures");
}
