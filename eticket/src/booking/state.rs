//! Booking session state and its read-only queries.

use crate::catalog::Catalog;
use crate::locale::Locale;
use crate::notice::Notice;
use crate::payment::OrderHandle;
use crate::ticket::OrderId;
use crate::types::{DateKey, Money, PaymentStatus, Quantity, Step, StepMarker};
use serde::{Deserialize, Serialize};

/// What the buyer has chosen so far
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSelection {
    /// Chosen performance, if any
    pub selected_date: Option<DateKey>,
    /// Seats, always within range
    pub quantity: Quantity,
    /// Terms checkbox
    pub terms_accepted: bool,
}

/// Selection frozen when payment started
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Payment attempt this order belongs to
    pub attempt: u64,
    /// Performance being paid for
    pub date: DateKey,
    /// Seats being paid for
    pub quantity: Quantity,
    /// Amount requested from the provider
    pub total: Money,
    /// Provider order, once created
    pub handle: Option<OrderHandle>,
}

/// The booking as it was when funds were captured
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidBooking {
    /// Performance paid for
    pub date: DateKey,
    /// Seats paid for
    pub quantity: Quantity,
    /// Amount captured
    pub total: Money,
    /// Provider order
    pub order: OrderHandle,
    /// Provider capture id
    pub capture_id: String,
}

/// Last ticket handed to the sink
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTicket {
    /// Delivered file name
    pub file_name: String,
    /// Order id printed on it
    pub order_id: OrderId,
}

/// One entry of the progress bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepProgress {
    /// The step
    pub step: Step,
    /// Done, current or still to do
    pub marker: StepMarker,
}

/// Sticky order summary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSummary {
    /// Long date, or a placeholder when none is selected
    pub date_label: String,
    /// Seats
    pub quantity: Quantity,
    /// Current total
    pub total: Money,
}

/// State of a single booking session
///
/// Only the booking reducer mutates it; everything else reads through the
/// query methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingState {
    pub(crate) step: Step,
    pub(crate) selection: BookingSelection,
    pub(crate) payment: PaymentStatus,
    pub(crate) pending: Option<PendingOrder>,
    pub(crate) attempts: u64,
    pub(crate) paid: Option<PaidBooking>,
    pub(crate) last_ticket: Option<IssuedTicket>,
    pub(crate) notice: Option<Notice>,
}

impl BookingState {
    /// Fresh session: first step, nothing selected, one seat
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    /// Selected performance, if any
    #[must_use]
    pub const fn selected_date(&self) -> Option<DateKey> {
        self.selection.selected_date
    }

    /// Selected seats
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.selection.quantity
    }

    /// Whether the terms box is ticked
    #[must_use]
    pub const fn terms_accepted(&self) -> bool {
        self.selection.terms_accepted
    }

    /// Payment progress
    #[must_use]
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment
    }

    /// Payment in flight, if any
    #[must_use]
    pub const fn pending_order(&self) -> Option<&PendingOrder> {
        self.pending.as_ref()
    }

    /// Snapshot of the captured booking
    #[must_use]
    pub const fn paid(&self) -> Option<&PaidBooking> {
        self.paid.as_ref()
    }

    /// Most recently delivered ticket
    #[must_use]
    pub const fn last_ticket(&self) -> Option<&IssuedTicket> {
        self.last_ticket.as_ref()
    }

    /// Most recent failure notice
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// `quantity × price` once a date is chosen, zero before
    #[must_use]
    pub fn compute_total(&self, catalog: &Catalog) -> Money {
        if self.selection.selected_date.is_none() {
            return Money::ZERO;
        }
        catalog
            .price_per_seat()
            .checked_multiply(u32::from(self.selection.quantity.get()))
            .unwrap_or(Money::ZERO)
    }

    /// Whether the pay button is enabled
    ///
    /// Disabled while any order is in flight, including a second purchase
    /// after an earlier capture.
    #[must_use]
    pub fn can_pay(&self) -> bool {
        self.selection.terms_accepted
            && self.selection.quantity.get() >= Quantity::MIN
            && self.selection.selected_date.is_some()
            && self.payment != PaymentStatus::AwaitingCapture
            && self.pending.is_none()
    }

    /// Whether a provider result belongs to the attempt in flight
    #[must_use]
    pub fn is_current_attempt(&self, attempt: u64) -> bool {
        self.pending.as_ref().is_some_and(|p| p.attempt == attempt)
    }

    /// Whether `Advance` would move forward from the current step
    #[must_use]
    pub fn can_advance(&self) -> bool {
        match self.step {
            Step::ChooseDate => self.selection.selected_date.is_some(),
            Step::ChooseSeats => self.selection.quantity.get() >= Quantity::MIN,
            Step::Pay => false,
        }
    }

    /// Marker for every step, in order
    #[must_use]
    pub fn progress(&self) -> [StepProgress; 3] {
        Step::ALL.map(|step| StepProgress {
            step,
            marker: match step.index().cmp(&self.step.index()) {
                std::cmp::Ordering::Less => StepMarker::Done,
                std::cmp::Ordering::Equal => StepMarker::Current,
                std::cmp::Ordering::Greater => StepMarker::Todo,
            },
        })
    }

    /// Date, seats and total for the sidebar
    #[must_use]
    pub fn summary(&self, catalog: &Catalog, locale: Locale) -> OrderSummary {
        let date_label = match self.selection.selected_date {
            Some(key) => locale.long_date(key.date()),
            None => match locale {
                Locale::ItIt => "Nessuna data selezionata".to_string(),
                Locale::EnGb => "No date selected".to_string(),
            },
        };
        OrderSummary {
            date_label,
            quantity: self.selection.quantity,
            total: self.compute_total(catalog),
        }
    }
}
