#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use crate::catalog::Catalog;
use crate::locale::Locale;
use crate::notice::{Notice, RecordingNotifier};
use crate::payment::{CaptureReceipt, OrderHandle, SandboxOutcome, SandboxPaymentAdapter};
use crate::ticket::{MemorySink, QrCodeEncoder, PdfRenderer, SequentialOrderIds, TicketGenerator};
use crate::types::{DateKey, Money, PaymentStatus, Quantity, Step};
use eticket_core::reducer::Reducer;
use eticket_testing::{assertions, run_effects, ReducerTest};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    env: BookingEnvironment,
    payments: SandboxPaymentAdapter,
    notifier: Arc<RecordingNotifier>,
    sink: Arc<MemorySink>,
}

fn harness(outcome: SandboxOutcome) -> Harness {
    let payments = SandboxPaymentAdapter::new()
        .with_latency(Duration::ZERO)
        .with_outcome(outcome);
    let notifier = Arc::new(RecordingNotifier::new());
    let sink = Arc::new(MemorySink::new());
    let tickets = TicketGenerator::new(
        Arc::new(SequentialOrderIds::new("LL-T")),
        Arc::new(QrCodeEncoder::new()),
        Arc::new(PdfRenderer::new()),
        Locale::ItIt,
    );
    let env = BookingEnvironment::new(
        Arc::new(Catalog::default()),
        Arc::new(payments.clone()),
        Arc::new(tickets),
        sink.clone(),
        notifier.clone(),
        "Trentadue Bit",
    );
    Harness {
        env,
        payments,
        notifier,
        sink,
    }
}

fn test_env() -> BookingEnvironment {
    harness(SandboxOutcome::Approve).env
}

fn sep(day: u32) -> DateKey {
    DateKey::from_ymd(2025, 9, day).unwrap()
}

/// Date 13, three seats, terms accepted, on the payment step
fn ready_to_pay() -> Vec<BookingAction> {
    vec![
        BookingAction::SelectDate { key: sep(13) },
        BookingAction::Advance,
        BookingAction::SetQuantity { value: 3 },
        BookingAction::Advance,
        BookingAction::SetTermsAccepted { accepted: true },
    ]
}

fn awaiting_capture() -> Vec<BookingAction> {
    let mut actions = ready_to_pay();
    actions.push(BookingAction::StartPayment);
    actions.push(BookingAction::OrderCreated {
        attempt: 1,
        handle: OrderHandle::new("SB-TEST"),
    });
    actions
}

fn captured() -> Vec<BookingAction> {
    let mut actions = awaiting_capture();
    actions.push(BookingAction::PaymentCaptured {
        attempt: 1,
        receipt: CaptureReceipt {
            order: OrderHandle::new("SB-TEST"),
            capture_id: "CAP-TEST".to_string(),
        },
    });
    actions
}

fn replay(env: &BookingEnvironment, actions: Vec<BookingAction>) -> BookingState {
    let reducer = BookingReducer::new();
    let mut state = BookingState::new();
    for action in actions {
        let _ = reducer.reduce(&mut state, action, env);
    }
    state
}

// ========== Selection and navigation ==========

#[test]
fn initial_state() {
    let state = BookingState::new();
    assert_eq!(state.step(), Step::ChooseDate);
    assert_eq!(state.payment_status(), PaymentStatus::Idle);
    assert_eq!(state.quantity().get(), 1);
    assert_eq!(state.selected_date(), None);
    assert!(!state.terms_accepted());
}

#[test]
fn unknown_date_is_ignored() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectDate { key: sep(20) })
        .then_state(|state| assert_eq!(state.selected_date(), None))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn advance_needs_a_date() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .when_action(BookingAction::Advance)
        .then_state(|state| assert_eq!(state.step(), Step::ChooseDate))
        .run();

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions([BookingAction::SelectDate { key: sep(12) }])
        .when_action(BookingAction::Advance)
        .then_state(|state| assert_eq!(state.step(), Step::ChooseSeats))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn navigation_is_bounded_at_both_ends() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .when_action(BookingAction::Retreat)
        .then_state(|state| assert_eq!(state.step(), Step::ChooseDate))
        .run();

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(ready_to_pay())
        .when_action(BookingAction::Advance)
        .then_state(|state| assert_eq!(state.step(), Step::Pay))
        .run();
}

#[test]
fn non_numeric_seat_input_keeps_quantity() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions([BookingAction::SetQuantity { value: 4 }])
        .when_action(BookingAction::EnterQuantity {
            raw: "quattro".to_string(),
        })
        .then_state(|state| assert_eq!(state.quantity().get(), 4))
        .run();
}

#[test]
fn seat_buttons_saturate() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions([BookingAction::SetQuantity { value: 10 }])
        .when_action(BookingAction::IncrementQuantity)
        .then_state(|state| assert_eq!(state.quantity().get(), 10))
        .run();

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .when_action(BookingAction::DecrementQuantity)
        .then_state(|state| assert_eq!(state.quantity().get(), 1))
        .run();
}

#[test]
fn total_for_three_seats_on_the_thirteenth() {
    let env = test_env();
    let state = replay(&env, ready_to_pay());
    assert_eq!(state.compute_total(&env.catalog), Money::from_euros(36));
    assert_eq!(state.compute_total(&env.catalog).value(), "36.00");
}

// ========== Payment ==========

#[test]
fn pay_is_gated_on_terms() {
    let mut actions = ready_to_pay();
    actions.pop();

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::StartPayment)
        .then_state(|state| {
            assert!(!state.can_pay());
            assert_eq!(state.payment_status(), PaymentStatus::Idle);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn start_payment_creates_order_for_current_total() {
    let h = harness(SandboxOutcome::Approve);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, ready_to_pay());

    let effects = reducer.reduce(&mut state, BookingAction::StartPayment, &h.env);
    assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture);
    assert!(!state.can_pay());
    assertions::assert_has_future_effect(&effects);

    let actions = run_effects(effects).await;
    assert!(matches!(actions.as_slice(), [BookingAction::OrderCreated { .. }]));

    let requests = h.payments.requests();
    assert_eq!(requests.len(), 1);
    let description = requests[0].description().unwrap();
    assert!(description.contains('3'));
    assert!(description.contains("2025-09-13"));
    assert_eq!(requests[0].amount().unwrap().value, "36.00");
    assert_eq!(requests[0].amount().unwrap().currency_code, "EUR");
}

#[tokio::test]
async fn create_failure_returns_to_idle_with_provider_notice() {
    let h = harness(SandboxOutcome::FailCreate);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, ready_to_pay());

    let effects = reducer.reduce(&mut state, BookingAction::StartPayment, &h.env);
    let outcome = run_effects(effects).await;
    assert!(matches!(outcome.as_slice(), [BookingAction::PaymentErrored { .. }]));

    for action in outcome {
        let effects = reducer.reduce(&mut state, action, &h.env);
        run_effects(effects).await;
    }

    assert_eq!(state.payment_status(), PaymentStatus::Idle);
    assert_eq!(h.notifier.notices(), vec![Notice::ProviderError]);
}

#[tokio::test]
async fn capture_fault_keeps_selection_and_notifies_once() {
    let h = harness(SandboxOutcome::DeclineCapture);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, awaiting_capture());
    let selection_before = state.selection().clone();

    let effects = reducer.reduce(&mut state, BookingAction::PaymentApproved, &h.env);
    let outcome = run_effects(effects).await;
    assert!(matches!(outcome.as_slice(), [BookingAction::CaptureFailed { .. }]));

    for action in outcome {
        let effects = reducer.reduce(&mut state, action, &h.env);
        assert!(run_effects(effects).await.is_empty());
    }

    assert_eq!(state.payment_status(), PaymentStatus::Idle);
    assert_eq!(state.selection(), &selection_before);
    assert_eq!(state.pending_order(), None);
    assert_eq!(state.notice(), Some(&Notice::CaptureFailed));
    assert_eq!(h.notifier.notices(), vec![Notice::CaptureFailed]);
    assert!(state.can_pay());
}

#[test]
fn cancel_returns_to_idle_without_notice() {
    let h = harness(SandboxOutcome::Approve);
    let notifier = h.notifier.clone();

    ReducerTest::new(BookingReducer::new())
        .with_env(h.env)
        .given_state(BookingState::new())
        .given_actions(awaiting_capture())
        .when_action(BookingAction::PaymentCancelled)
        .then_state(move |state| {
            assert_eq!(state.payment_status(), PaymentStatus::Idle);
            assert_eq!(state.notice(), None);
            assert!(notifier.notices().is_empty());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn approval_without_order_is_ignored() {
    let mut actions = ready_to_pay();
    actions.push(BookingAction::StartPayment);

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::PaymentApproved)
        .then_state(|state| assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn capture_records_booking_as_paid() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(awaiting_capture())
        .when_action(BookingAction::PaymentCaptured {
            attempt: 1,
            receipt: CaptureReceipt {
                order: OrderHandle::new("SB-TEST"),
                capture_id: "CAP-TEST".to_string(),
            },
        })
        .then_state(|state| {
            assert_eq!(state.payment_status(), PaymentStatus::Captured);
            let paid = state.paid().unwrap();
            assert_eq!(paid.date, sep(13));
            assert_eq!(paid.quantity, Quantity::clamped(3));
            assert_eq!(paid.total, Money::from_euros(36));
            assert_eq!(paid.capture_id, "CAP-TEST");
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn paid_snapshot_ignores_later_edits() {
    let mut actions = captured();
    actions.push(BookingAction::Retreat);
    actions.push(BookingAction::SetQuantity { value: 7 });

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::SelectDate { key: sep(14) })
        .then_state(|state| {
            assert_eq!(state.step(), Step::ChooseSeats);
            assert_eq!(state.payment_status(), PaymentStatus::Captured);
            assert_eq!(state.quantity().get(), 7);
            let paid = state.paid().unwrap();
            assert_eq!(paid.quantity.get(), 3);
            assert_eq!(paid.date, sep(13));
        })
        .run();
}

#[test]
fn paying_again_after_capture_stays_captured() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(captured())
        .when_action(BookingAction::StartPayment)
        .then_state(|state| {
            assert_eq!(state.payment_status(), PaymentStatus::Captured);
            assert!(state.pending_order().is_some());
        })
        .then_effects(assertions::assert_has_future_effect)
        .run();
}

#[test]
fn failure_after_capture_never_reverts_payment() {
    let mut actions = captured();
    actions.push(BookingAction::StartPayment);

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::CaptureFailed {
            attempt: 2,
            reason: "declined".to_string(),
        })
        .then_state(|state| {
            assert_eq!(state.payment_status(), PaymentStatus::Captured);
            assert!(state.paid().is_some());
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

// ========== Stale and duplicate provider results ==========

/// First attempt for three seats abandoned, second attempt for five in flight
fn retried_with_five_seats() -> Vec<BookingAction> {
    let mut actions = ready_to_pay();
    actions.push(BookingAction::StartPayment);
    actions.push(BookingAction::PaymentCancelled);
    actions.push(BookingAction::SetQuantity { value: 5 });
    actions.push(BookingAction::StartPayment);
    actions
}

#[test]
fn late_order_from_abandoned_attempt_is_dropped() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(retried_with_five_seats())
        .when_action(BookingAction::OrderCreated {
            attempt: 1,
            handle: OrderHandle::new("SB-A"),
        })
        .then_state(|state| {
            let pending = state.pending_order().unwrap();
            assert_eq!(pending.attempt, 2);
            assert_eq!(pending.quantity.get(), 5);
            assert_eq!(pending.handle, None);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn late_capture_cannot_certify_the_newer_attempt() {
    let mut actions = retried_with_five_seats();
    actions.push(BookingAction::OrderCreated {
        attempt: 1,
        handle: OrderHandle::new("SB-A"),
    });

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::PaymentCaptured {
            attempt: 1,
            receipt: CaptureReceipt {
                order: OrderHandle::new("SB-A"),
                capture_id: "CAP-A".to_string(),
            },
        })
        .then_state(|state| {
            assert_eq!(state.paid(), None);
            assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture);
            assert_eq!(state.pending_order().unwrap().attempt, 2);
        })
        .run();
}

#[test]
fn capture_for_another_order_is_dropped() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(awaiting_capture())
        .when_action(BookingAction::PaymentCaptured {
            attempt: 1,
            receipt: CaptureReceipt {
                order: OrderHandle::new("SB-OTHER"),
                capture_id: "CAP-OTHER".to_string(),
            },
        })
        .then_state(|state| {
            assert_eq!(state.paid(), None);
            assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture);
            assert_eq!(
                state.pending_order().unwrap().handle,
                Some(OrderHandle::new("SB-TEST"))
            );
        })
        .run();
}

#[test]
fn late_error_leaves_newer_attempt_running() {
    let h = harness(SandboxOutcome::Approve);
    let notifier = h.notifier.clone();

    ReducerTest::new(BookingReducer::new())
        .with_env(h.env)
        .given_state(BookingState::new())
        .given_actions(retried_with_five_seats())
        .when_action(BookingAction::PaymentErrored {
            attempt: 1,
            reason: "timeout".to_string(),
        })
        .then_state(move |state| {
            assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture);
            assert_eq!(state.pending_order().unwrap().attempt, 2);
            assert_eq!(state.notice(), None);
            assert!(notifier.notices().is_empty());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn late_capture_cancellation_is_ignored() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(retried_with_five_seats())
        .when_action(BookingAction::CaptureCancelled { attempt: 1 })
        .then_state(|state| {
            assert_eq!(state.payment_status(), PaymentStatus::AwaitingCapture);
            assert!(state.pending_order().is_some());
        })
        .run();
}

#[test]
fn second_press_while_order_in_flight_starts_nothing() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(awaiting_capture())
        .when_action(BookingAction::StartPayment)
        .then_state(|state| assert_eq!(state.pending_order().unwrap().attempt, 1))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn second_press_after_capture_starts_one_order() {
    let mut actions = captured();
    actions.push(BookingAction::StartPayment);

    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(actions)
        .when_action(BookingAction::StartPayment)
        .then_state(|state| {
            assert!(!state.can_pay());
            assert_eq!(state.payment_status(), PaymentStatus::Captured);
            assert_eq!(state.pending_order().unwrap().attempt, 2);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn provider_results_name_their_attempt() {
    let h = harness(SandboxOutcome::DeclineCapture);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, ready_to_pay());

    let effects = reducer.reduce(&mut state, BookingAction::StartPayment, &h.env);
    let created = run_effects(effects).await;
    let [BookingAction::OrderCreated { attempt: 1, handle }] = created.as_slice() else {
        panic!("expected OrderCreated for attempt 1, got {created:?}");
    };
    let handle = handle.clone();
    for action in created {
        let _ = reducer.reduce(&mut state, action, &h.env);
    }
    assert_eq!(state.pending_order().unwrap().handle, Some(handle));

    let effects = reducer.reduce(&mut state, BookingAction::PaymentApproved, &h.env);
    let outcome = run_effects(effects).await;
    assert!(matches!(
        outcome.as_slice(),
        [BookingAction::CaptureFailed { attempt: 1, .. }]
    ));
}

// ========== Ticket ==========

#[test]
fn download_before_payment_does_nothing() {
    ReducerTest::new(BookingReducer::new())
        .with_env(test_env())
        .given_state(BookingState::new())
        .given_actions(ready_to_pay())
        .when_action(BookingAction::DownloadTicket)
        .then_state(|state| assert_eq!(state.last_ticket(), None))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn download_delivers_ticket_and_records_it() {
    let h = harness(SandboxOutcome::Approve);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, captured());

    let effects = reducer.reduce(&mut state, BookingAction::DownloadTicket, &h.env);
    let outcome = run_effects(effects).await;
    let [BookingAction::TicketIssued { file_name, order_id }] = outcome.as_slice() else {
        panic!("expected TicketIssued, got {outcome:?}");
    };
    assert_eq!(file_name, "eticket_LL-T-1.pdf");
    assert_eq!(order_id.as_str(), "LL-T-1");
    assert_eq!(h.sink.file_names(), vec!["eticket_LL-T-1.pdf".to_string()]);

    for action in outcome {
        let _ = reducer.reduce(&mut state, action, &h.env);
    }
    assert_eq!(state.last_ticket().unwrap().file_name, "eticket_LL-T-1.pdf");
}

#[tokio::test]
async fn ticket_failure_raises_notice() {
    let h = harness(SandboxOutcome::Approve);
    let reducer = BookingReducer::new();
    let mut state = replay(&h.env, captured());

    let effects = reducer.reduce(
        &mut state,
        BookingAction::TicketFailed {
            reason: "disk full".to_string(),
        },
        &h.env,
    );
    run_effects(effects).await;

    assert_eq!(
        h.notifier.notices(),
        vec![Notice::TicketFailed {
            reason: "disk full".to_string()
        }]
    );
    assert_eq!(state.payment_status(), PaymentStatus::Captured);
}

// ========== Properties ==========

proptest! {
    #[test]
    fn set_quantity_always_clamps(value in any::<i64>()) {
        let env = test_env();
        let mut state = BookingState::new();
        let _ = BookingReducer::new().reduce(&mut state, BookingAction::SetQuantity { value }, &env);
        let q = state.quantity().get();
        prop_assert!((1..=10).contains(&q));
    }

    #[test]
    fn total_is_zero_iff_no_date(day in prop::option::of(12u32..=14), value in 1i64..=10) {
        let env = test_env();
        let mut actions = vec![BookingAction::SetQuantity { value }];
        if let Some(day) = day {
            actions.push(BookingAction::SelectDate { key: sep(day) });
        }
        let state = replay(&env, actions);
        let total = state.compute_total(&env.catalog);

        prop_assert_eq!(total.is_zero(), day.is_none());
        if day.is_some() {
            prop_assert_eq!(total.cents(), 1200 * u64::try_from(value).unwrap());
        }
    }

    #[test]
    fn can_pay_is_false_without_terms(actions in prop::collection::vec(intent(), 0..12)) {
        let env = test_env();
        let mut actions = actions;
        actions.push(BookingAction::SetTermsAccepted { accepted: false });
        let state = replay(&env, actions);
        prop_assert!(!state.can_pay());
    }
}

fn intent() -> impl Strategy<Value = BookingAction> {
    prop_oneof![
        (12u32..=15).prop_map(|day| BookingAction::SelectDate { key: sep(day) }),
        any::<i64>().prop_map(|value| BookingAction::SetQuantity { value }),
        Just(BookingAction::IncrementQuantity),
        Just(BookingAction::DecrementQuantity),
        Just(BookingAction::Advance),
        Just(BookingAction::Retreat),
        any::<bool>().prop_map(|accepted| BookingAction::SetTermsAccepted { accepted }),
    ]
}
