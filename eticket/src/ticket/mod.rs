//! E-ticket generation.
//!
//! A paid booking becomes a [`TicketDocument`] in four steps: a fresh
//! [`OrderId`] is drawn, the [`VerificationPayload`] is serialized and encoded
//! into a QR image, the page is laid out and rendered, and the finished bytes
//! are handed to a [`DocumentSink`]. Any failure aborts the whole attempt;
//! nothing is retried.

pub mod encoder;
pub mod layout;
pub mod order_id;
pub mod payload;
pub mod renderer;
pub mod sink;

pub use encoder::{CodeImage, CodeImageEncoder, EncodeError, QrCodeEncoder};
pub use layout::{DetailRow, TicketLayout};
pub use order_id::{OrderId, OrderIdGenerator, SequentialOrderIds, TimestampOrderIds};
pub use payload::{PayloadError, TicketRecord, VerificationPayload};
pub use renderer::{DocumentRenderer, PdfRenderer, RenderError};
pub use sink::{DocumentSink, FileSink, MemorySink, SinkError};

use crate::booking::{BookingState, PaidBooking};
use crate::catalog::Catalog;
use crate::locale::Locale;
use eticket_core::environment::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Ticket generation errors
#[derive(Error, Debug)]
pub enum TicketError {
    /// No captured payment to issue a ticket for
    #[error("no captured payment for this booking")]
    NotPaid,

    /// Payload could not be serialized
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Payload could not be encoded as an image
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Document could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Document could not be delivered
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The rendering task was cancelled or panicked
    #[error("ticket generation interrupted: {0}")]
    Interrupted(String),
}

/// A rendered ticket, ready for delivery
#[derive(Clone, Debug)]
pub struct TicketDocument {
    /// `eticket_<orderId>.<ext>`
    pub file_name: String,
    /// Document bytes
    pub bytes: Vec<u8>,
    /// What the ticket certifies
    pub record: TicketRecord,
    /// What its QR code carries
    pub payload: VerificationPayload,
}

/// Builds ticket documents from paid bookings
pub struct TicketGenerator {
    ids: Arc<dyn OrderIdGenerator>,
    encoder: Arc<dyn CodeImageEncoder>,
    renderer: Arc<dyn DocumentRenderer>,
    locale: Locale,
}

impl TicketGenerator {
    /// Assembles a generator from its parts
    #[must_use]
    pub fn new(
        ids: Arc<dyn OrderIdGenerator>,
        encoder: Arc<dyn CodeImageEncoder>,
        renderer: Arc<dyn DocumentRenderer>,
        locale: Locale,
    ) -> Self {
        Self {
            ids,
            encoder,
            renderer,
            locale,
        }
    }

    /// Time-based ids, QR codes and PDF output
    #[must_use]
    pub fn standard(clock: Arc<dyn Clock>, locale: Locale) -> Self {
        Self::new(
            Arc::new(TimestampOrderIds::new(clock)),
            Arc::new(QrCodeEncoder::new()),
            Arc::new(PdfRenderer::new()),
            locale,
        )
    }

    /// Language of the printed date
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Renders a ticket for `paid`
    ///
    /// Every call draws a new order id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError`] if encoding or rendering fails.
    pub fn generate(
        &self,
        catalog: &Catalog,
        paid: &PaidBooking,
    ) -> Result<TicketDocument, TicketError> {
        let record = TicketRecord {
            order_id: self.ids.next_id(),
            show: catalog.show_name().to_string(),
            date: paid.date,
            quantity: paid.quantity,
            holder: catalog.holder().to_string(),
            total: paid.total,
        };
        let payload = VerificationPayload::from_record(&record);
        let code = self.encoder.encode(&payload.to_json()?)?;

        let date_label = self.locale.long_date(record.date.date());
        let layout = TicketLayout::for_record(&record, catalog.production(), &date_label, code);
        let bytes = self.renderer.render(&layout)?;

        let file_name = format!("eticket_{}.{}", record.order_id, self.renderer.extension());
        tracing::info!(
            order_id = %record.order_id,
            date = %record.date,
            qty = record.quantity.get(),
            bytes = bytes.len(),
            "Ticket generated"
        );

        Ok(TicketDocument {
            file_name,
            bytes,
            record,
            payload,
        })
    }

    /// Renders a ticket for the booking's captured payment
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotPaid`] before doing any work if the payment
    /// has not been captured, otherwise as [`TicketGenerator::generate`].
    pub fn generate_from_state(
        &self,
        catalog: &Catalog,
        state: &BookingState,
    ) -> Result<TicketDocument, TicketError> {
        let paid = state.paid().ok_or(TicketError::NotPaid)?;
        self.generate(catalog, paid)
    }

    /// Renders off the async workers, then delivers to `sink`
    ///
    /// # Errors
    ///
    /// Returns [`TicketError`] if generation or delivery fails; the sink
    /// never sees a partial document.
    pub async fn issue(
        self: Arc<Self>,
        catalog: Arc<Catalog>,
        paid: PaidBooking,
        sink: Arc<dyn DocumentSink>,
    ) -> Result<TicketDocument, TicketError> {
        let document = tokio::task::spawn_blocking(move || self.generate(&catalog, &paid))
            .await
            .map_err(|e| TicketError::Interrupted(e.to_string()))??;

        sink.deliver(&document.file_name, &document.bytes).await?;
        Ok(document)
    }
}

impl std::fmt::Debug for TicketGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketGenerator")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
