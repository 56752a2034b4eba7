//! The booking state machine.

use super::actions::BookingAction;
use super::environment::BookingEnvironment;
use super::state::{BookingState, IssuedTicket, PaidBooking, PendingOrder};
use crate::metrics as names;
use crate::notice::Notice;
use crate::payment::{CaptureReceipt, OrderRequest, PaymentError};
use crate::types::{PaymentStatus, Quantity};
use eticket_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

/// Reducer for a booking session
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn notify(env: &BookingEnvironment, state: &mut BookingState, notice: Notice) -> Effect<BookingAction> {
        state.notice = Some(notice.clone());
        let notifier = Arc::clone(&env.notifier);
        Effect::future(async move {
            notifier.notify(notice);
            None
        })
    }

    fn start_payment(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
        let Some(date) = state.selection.selected_date.filter(|_| state.can_pay()) else {
            tracing::debug!(status = ?state.payment, "Pay pressed while payment unavailable");
            return SmallVec::new();
        };

        let quantity = state.selection.quantity;
        let total = state.compute_total(&env.catalog);
        let request = OrderRequest::for_booking(total, quantity, date, &env.brand_name);
        state.attempts += 1;
        let attempt = state.attempts;

        // a second purchase after capture keeps the session marked as paid
        if state.payment == PaymentStatus::Idle {
            state.payment = PaymentStatus::AwaitingCapture;
        }
        state.pending = Some(PendingOrder {
            attempt,
            date,
            quantity,
            total,
            handle: None,
        });
        state.notice = None;

        tracing::info!(attempt, %date, qty = quantity.get(), total = %total.value(), "Creating payment order");
        metrics::counter!(names::PAYMENTS_STARTED).increment(1);

        let payments = Arc::clone(&env.payments);
        smallvec![Effect::future(async move {
            Some(match payments.create_order(request).await {
                Ok(handle) => BookingAction::OrderCreated { attempt, handle },
                Err(e) => BookingAction::PaymentErrored {
                    attempt,
                    reason: e.to_string(),
                },
            })
        })]
    }

    fn approve(state: &BookingState, env: &BookingEnvironment) -> Effects {
        let Some((attempt, handle)) = state
            .pending
            .as_ref()
            .and_then(|p| p.handle.clone().map(|h| (p.attempt, h)))
        else {
            tracing::warn!("Approval without a created order ignored");
            return SmallVec::new();
        };

        tracing::info!(attempt, order = %handle, "Payment approved, capturing");
        let payments = Arc::clone(&env.payments);
        smallvec![Effect::future(async move {
            Some(match payments.capture_order(handle).await {
                Ok(receipt) => BookingAction::PaymentCaptured { attempt, receipt },
                Err(PaymentError::Cancelled) => BookingAction::CaptureCancelled { attempt },
                Err(e) => BookingAction::CaptureFailed {
                    attempt,
                    reason: e.to_string(),
                },
            })
        })]
    }

    fn capture(state: &mut BookingState, attempt: u64, receipt: CaptureReceipt) {
        if !state.is_current_attempt(attempt) {
            tracing::warn!(attempt, order = %receipt.order, "Capture for a stale payment attempt dropped");
            return;
        }
        let Some(pending) = state
            .pending
            .take_if(|p| p.handle.as_ref() == Some(&receipt.order))
        else {
            tracing::error!(attempt, order = %receipt.order, "Capture for an order other than the one in flight dropped");
            return;
        };
        let PendingOrder {
            date,
            quantity,
            total,
            ..
        } = pending;

        tracing::info!(
            order = %receipt.order,
            capture_id = %receipt.capture_id,
            total = %total.value(),
            "Payment captured"
        );
        metrics::counter!(names::PAYMENTS_CAPTURED).increment(1);

        state.payment = PaymentStatus::Captured;
        state.paid = Some(PaidBooking {
            date,
            quantity,
            total,
            order: receipt.order,
            capture_id: receipt.capture_id,
        });
    }

    fn fail(
        state: &mut BookingState,
        env: &BookingEnvironment,
        attempt: u64,
        stage: &'static str,
        notice: Notice,
    ) -> Effects {
        if !state.is_current_attempt(attempt) {
            tracing::debug!(attempt, stage, "Failure for a stale payment attempt dropped");
            return SmallVec::new();
        }
        if state.payment == PaymentStatus::AwaitingCapture {
            state.payment = PaymentStatus::Idle;
        }
        state.pending = None;
        metrics::counter!(names::PAYMENTS_FAILED, "stage" => stage).increment(1);
        smallvec![Self::notify(env, state, notice)]
    }

    fn cancel(state: &mut BookingState) {
        if state.payment == PaymentStatus::AwaitingCapture {
            state.payment = PaymentStatus::Idle;
        }
        state.pending = None;
    }

    fn download(state: &BookingState, env: &BookingEnvironment) -> Effects {
        let Some(paid) = state.paid.clone() else {
            tracing::warn!("Ticket requested before payment capture");
            return SmallVec::new();
        };

        let tickets = Arc::clone(&env.tickets);
        let catalog = Arc::clone(&env.catalog);
        let sink = Arc::clone(&env.sink);
        smallvec![Effect::future(async move {
            Some(match tickets.issue(catalog, paid, sink).await {
                Ok(document) => BookingAction::TicketIssued {
                    file_name: document.file_name,
                    order_id: document.record.order_id,
                },
                Err(e) => BookingAction::TicketFailed {
                    reason: e.to_string(),
                },
            })
        })]
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Selection ==========
            BookingAction::SelectDate { key } => {
                if env.catalog.contains(key) {
                    state.selection.selected_date = Some(key);
                } else {
                    tracing::debug!(%key, "Ignoring unknown show date");
                }
                SmallVec::new()
            },

            BookingAction::SetQuantity { value } => {
                state.selection.quantity = Quantity::clamped(value);
                SmallVec::new()
            },

            BookingAction::EnterQuantity { raw } => {
                match Quantity::parse_input(&raw) {
                    Some(quantity) => state.selection.quantity = quantity,
                    None => tracing::debug!(%raw, "Ignoring non-numeric seat input"),
                }
                SmallVec::new()
            },

            BookingAction::IncrementQuantity => {
                state.selection.quantity = state.selection.quantity.increment();
                SmallVec::new()
            },

            BookingAction::DecrementQuantity => {
                state.selection.quantity = state.selection.quantity.decrement();
                SmallVec::new()
            },

            BookingAction::SetTermsAccepted { accepted } => {
                state.selection.terms_accepted = accepted;
                SmallVec::new()
            },

            // ========== Navigation ==========
            BookingAction::Advance => {
                if state.can_advance() {
                    if let Some(next) = state.step.next() {
                        state.step = next;
                    }
                }
                SmallVec::new()
            },

            BookingAction::Retreat => {
                if let Some(previous) = state.step.previous() {
                    state.step = previous;
                }
                SmallVec::new()
            },

            // ========== Payment ==========
            BookingAction::StartPayment => Self::start_payment(state, env),

            BookingAction::OrderCreated { attempt, handle } => {
                match state.pending.as_mut().filter(|p| p.attempt == attempt) {
                    Some(pending) => {
                        tracing::debug!(attempt, order = %handle, "Payment order created");
                        pending.handle = Some(handle);
                    },
                    None => tracing::debug!(attempt, order = %handle, "Order for a stale payment attempt ignored"),
                }
                SmallVec::new()
            },

            BookingAction::PaymentApproved => Self::approve(state, env),

            BookingAction::PaymentCaptured { attempt, receipt } => {
                Self::capture(state, attempt, receipt);
                SmallVec::new()
            },

            BookingAction::CaptureFailed { attempt, reason } => {
                tracing::warn!(attempt, %reason, "Payment capture failed");
                Self::fail(state, env, attempt, "capture", Notice::CaptureFailed)
            },

            BookingAction::PaymentErrored { attempt, reason } => {
                tracing::warn!(attempt, %reason, "Payment provider error");
                Self::fail(state, env, attempt, "create", Notice::ProviderError)
            },

            BookingAction::PaymentCancelled => {
                tracing::info!("Payment cancelled by buyer");
                Self::cancel(state);
                SmallVec::new()
            },

            BookingAction::CaptureCancelled { attempt } => {
                if state.is_current_attempt(attempt) {
                    tracing::info!(attempt, "Capture cancelled by provider");
                    Self::cancel(state);
                }
                SmallVec::new()
            },

            // ========== Ticket ==========
            BookingAction::DownloadTicket => Self::download(state, env),

            BookingAction::TicketIssued { file_name, order_id } => {
                tracing::info!(%file_name, %order_id, "Ticket issued");
                metrics::counter!(names::TICKETS_ISSUED).increment(1);
                state.last_ticket = Some(IssuedTicket { file_name, order_id });
                SmallVec::new()
            },

            BookingAction::TicketFailed { reason } => {
                tracing::error!(%reason, "Ticket generation failed");
                metrics::counter!(names::TICKETS_FAILED).increment(1);
                smallvec![Self::notify(env, state, Notice::TicketFailed { reason })]
            },
        }
    }
}
