//! Dependencies injected into the booking reducer.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::notice::{Notifier, TracingNotifier};
use crate::payment::PaymentAdapter;
use crate::ticket::{DocumentSink, FileSink, TicketGenerator};
use eticket_core::environment::Clock;
use std::sync::Arc;

/// Environment dependencies for the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Dates and prices on sale
    pub catalog: Arc<Catalog>,
    /// Payment provider
    pub payments: Arc<dyn PaymentAdapter>,
    /// Ticket document generator
    pub tickets: Arc<TicketGenerator>,
    /// Where finished tickets go
    pub sink: Arc<dyn DocumentSink>,
    /// Shows failure notices to the buyer
    pub notifier: Arc<dyn Notifier>,
    /// Merchant name sent with every order
    pub brand_name: String,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        payments: Arc<dyn PaymentAdapter>,
        tickets: Arc<TicketGenerator>,
        sink: Arc<dyn DocumentSink>,
        notifier: Arc<dyn Notifier>,
        brand_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            payments,
            tickets,
            sink,
            notifier,
            brand_name: brand_name.into(),
        }
    }

    /// Production wiring: default catalog, PDF tickets written to the
    /// configured directory, notices logged
    #[must_use]
    pub fn from_config(config: &Config, payments: Arc<dyn PaymentAdapter>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(Catalog::default()),
            payments,
            Arc::new(TicketGenerator::standard(clock, config.locale)),
            Arc::new(FileSink::new(config.output.dir.clone())),
            Arc::new(TracingNotifier),
            config.payment.brand_name.clone(),
        )
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("catalog", &self.catalog)
            .field("tickets", &self.tickets)
            .field("brand_name", &self.brand_name)
            .finish_non_exhaustive()
    }
}
