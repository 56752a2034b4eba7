//! Payment provider contract.
//!
//! The booking flow never talks to a provider directly: it builds an
//! [`OrderRequest`], hands it to a [`PaymentAdapter`] from an effect and waits
//! for the outcome to come back as an action. Anything that can create and
//! capture an order (a `PayPal` bridge, a test double) plugs in here.

use crate::types::{DateKey, Money, Quantity};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Payment adapter result future
pub type PaymentFuture<T> = Pin<Box<dyn Future<Output = Result<T, PaymentError>> + Send>>;

/// Payment failures reported by a provider
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentError {
    /// The provider refused the payment
    #[error("payment declined: {reason}")]
    Declined {
        /// Decline reason from the provider
        reason: String,
    },

    /// The provider failed or could not be reached
    #[error("payment provider error: {message}")]
    Provider {
        /// Error message
        message: String,
    },

    /// The buyer closed the provider window
    #[error("payment cancelled by buyer")]
    Cancelled,
}

// ============================================================================
// Widget configuration
// ============================================================================

/// What the provider does once the buyer approves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentIntent {
    /// Capture funds immediately
    #[default]
    Capture,
}

/// Parameters the provider widget is loaded with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWidgetConfig {
    /// Provider client id (`"sb"` selects the sandbox)
    pub client_id: String,
    /// Always `EUR`
    pub currency: String,
    /// Always capture
    pub intent: PaymentIntent,
}

impl PaymentWidgetConfig {
    /// Client id of the provider sandbox
    pub const SANDBOX_CLIENT_ID: &'static str = "sb";

    /// Widget configuration for `client_id`
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            currency: Money::CURRENCY.to_string(),
            intent: PaymentIntent::Capture,
        }
    }

    /// Whether this configuration targets the sandbox
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.client_id == Self::SANDBOX_CLIENT_ID
    }
}

impl Default for PaymentWidgetConfig {
    fn default() -> Self {
        Self::new(Self::SANDBOX_CLIENT_ID)
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Amount of a purchase unit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// ISO 4217 code
    pub currency_code: String,
    /// Decimal string with two fraction digits
    pub value: String,
}

/// One line of an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    /// Amount charged
    pub amount: Amount,
    /// Shown to the buyer in the provider window
    pub description: String,
}

/// Provider presentation hints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationContext {
    /// Merchant name shown by the provider
    pub brand_name: String,
    /// Label of the confirm button
    pub user_action: String,
}

/// Request to create a provider order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Always a single unit for a booking
    pub purchase_units: Vec<PurchaseUnit>,
    /// Presentation hints
    pub application_context: ApplicationContext,
}

impl OrderRequest {
    /// Order for `quantity` seats on `date`
    #[must_use]
    pub fn for_booking(total: Money, quantity: Quantity, date: DateKey, brand_name: &str) -> Self {
        Self {
            purchase_units: vec![PurchaseUnit {
                amount: Amount {
                    currency_code: Money::CURRENCY.to_string(),
                    value: total.value(),
                },
                description: format!("Biglietti teatro — {quantity} posti — {date}"),
            }],
            application_context: ApplicationContext {
                brand_name: brand_name.to_string(),
                user_action: "PAY_NOW".to_string(),
            },
        }
    }

    /// Description of the first unit
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.purchase_units.first().map(|u| u.description.as_str())
    }

    /// Amount of the first unit
    #[must_use]
    pub fn amount(&self) -> Option<&Amount> {
        self.purchase_units.first().map(|u| &u.amount)
    }
}

/// Provider-side order id
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderHandle(String);

impl OrderHandle {
    /// Wraps a provider order id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The provider order id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof that funds were captured
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReceipt {
    /// Order that was captured
    pub order: OrderHandle,
    /// Provider capture id
    pub capture_id: String,
}

// ============================================================================
// Adapter
// ============================================================================

/// Payment provider adapter
///
/// Abstraction over the provider's create/capture calls. Approval and
/// cancellation happen in the provider's own window and reach the flow as
/// actions, not through this trait.
pub trait PaymentAdapter: Send + Sync {
    /// Create an order for the given request
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the provider rejects or fails the request.
    fn create_order(&self, request: OrderRequest) -> PaymentFuture<OrderHandle>;

    /// Capture an approved order
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the capture is declined or fails.
    fn capture_order(&self, order: OrderHandle) -> PaymentFuture<CaptureReceipt>;
}

/// Scripted behaviour of the sandbox adapter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SandboxOutcome {
    /// Create and capture both succeed
    #[default]
    Approve,
    /// Orders are created but capture is declined
    DeclineCapture,
    /// Order creation fails with a provider error
    FailCreate,
}

/// Sandbox payment adapter (the `client_id = "sb"` provider)
///
/// Answers after a simulated network delay and records every order request.
#[derive(Clone, Debug)]
pub struct SandboxPaymentAdapter {
    outcome: SandboxOutcome,
    latency: Duration,
    requests: Arc<Mutex<Vec<OrderRequest>>>,
}

impl SandboxPaymentAdapter {
    /// Creates a sandbox that approves everything
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcome: SandboxOutcome::Approve,
            latency: Duration::from_millis(100),
            requests: Arc::default(),
        }
    }

    /// Script the outcome of future calls
    #[must_use]
    pub const fn with_outcome(mut self, outcome: SandboxOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Change the simulated network delay
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn PaymentAdapter> {
        Arc::new(self)
    }

    /// Order requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SandboxPaymentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentAdapter for SandboxPaymentAdapter {
    fn create_order(&self, request: OrderRequest) -> PaymentFuture<OrderHandle> {
        let outcome = self.outcome;
        let latency = self.latency;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        Box::pin(async move {
            tokio::time::sleep(latency).await;

            if outcome == SandboxOutcome::FailCreate {
                tracing::warn!("Sandbox order creation failed");
                return Err(PaymentError::Provider {
                    message: "sandbox create failure".to_string(),
                });
            }

            let handle = OrderHandle::new(format!("SB-{}", uuid::Uuid::new_v4().simple()));
            tracing::info!(
                order = %handle,
                amount = request.amount().map_or("", |a| a.value.as_str()),
                "Sandbox order created"
            );
            Ok(handle)
        })
    }

    fn capture_order(&self, order: OrderHandle) -> PaymentFuture<CaptureReceipt> {
        let outcome = self.outcome;
        let latency = self.latency;

        Box::pin(async move {
            tokio::time::sleep(latency).await;

            if outcome == SandboxOutcome::DeclineCapture {
                tracing::warn!(order = %order, "Sandbox capture declined");
                return Err(PaymentError::Declined {
                    reason: "INSTRUMENT_DECLINED".to_string(),
                });
            }

            let capture_id = format!("CAP-{}", uuid::Uuid::new_v4().simple());
            tracing::info!(order = %order, capture_id = %capture_id, "Sandbox order captured");
            Ok(CaptureReceipt { order, capture_id })
        })
    }
}
