//! User-facing failure notices.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// A message shown to the buyer when an attempt fails
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// The provider approved but capturing the funds failed
    CaptureFailed,
    /// The provider reported an error before approval
    ProviderError,
    /// The ticket document could not be produced
    TicketFailed {
        /// Underlying cause, for logs
        reason: String,
    },
}

impl Notice {
    /// Text shown to the buyer
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CaptureFailed => "Problema durante la conferma del pagamento.",
            Self::ProviderError => "Errore PayPal. Riprova.",
            Self::TicketFailed { .. } => "Impossibile generare il biglietto. Riprova.",
        }
    }
}

/// Surfaces notices to the buyer
pub trait Notifier: Send + Sync {
    /// Show a notice
    fn notify(&self, notice: Notice);
}

/// Logs notices through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::TicketFailed { reason } => {
                tracing::warn!(%reason, message = notice.message(), "Ticket notice");
            },
            _ => tracing::warn!(message = notice.message(), "Payment notice"),
        }
    }
}

/// Keeps every notice for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
