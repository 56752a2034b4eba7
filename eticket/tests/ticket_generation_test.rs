//! Ticket documents and their verification payload.

#![allow(clippy::unwrap_used)]

use eticket::booking::PaidBooking;
use eticket::catalog::Catalog;
use eticket::payment::OrderHandle;
use eticket::ticket::{
    CodeImage, CodeImageEncoder, EncodeError, MemorySink, PdfRenderer, QrCodeEncoder,
    SequentialOrderIds, TicketError, TicketGenerator, VerificationPayload,
};
use eticket::{DateKey, Locale, Money, Quantity};
use std::sync::{Arc, Mutex};

/// Encoder that remembers what it was asked to encode
#[derive(Default)]
struct CapturingEncoder {
    seen: Mutex<Vec<String>>,
}

impl CodeImageEncoder for CapturingEncoder {
    fn encode(&self, data: &str) -> Result<CodeImage, EncodeError> {
        self.seen.lock().unwrap().push(data.to_string());
        QrCodeEncoder::new().encode(data)
    }
}

struct RejectingEncoder;

impl CodeImageEncoder for RejectingEncoder {
    fn encode(&self, _data: &str) -> Result<CodeImage, EncodeError> {
        Err(EncodeError::Rejected("too long".to_string()))
    }
}

fn paid(quantity: i64, total: Money) -> PaidBooking {
    PaidBooking {
        date: DateKey::from_ymd(2025, 9, 13).unwrap(),
        quantity: Quantity::clamped(quantity),
        total,
        order: OrderHandle::new("SB-1"),
        capture_id: "CAP-1".to_string(),
    }
}

#[test]
fn qr_carries_the_captured_booking() {
    let encoder = Arc::new(CapturingEncoder::default());
    let generator = TicketGenerator::new(
        Arc::new(SequentialOrderIds::new("LL-T")),
        encoder.clone(),
        Arc::new(PdfRenderer::new()),
        Locale::ItIt,
    );

    let doc = generator
        .generate(&Catalog::default(), &paid(3, Money::from_euros(36)))
        .unwrap();

    let seen = encoder.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        r#"{"v":1,"orderId":"LL-T-1","show":"La Locandiera — Teatro","date":"2025-09-13","qty":3,"holder":"Trentadue Bit","total":36}"#
    );

    let scanned = VerificationPayload::parse(&seen[0]).unwrap();
    assert_eq!(scanned, doc.payload);
    assert_eq!(scanned.qty.get(), 3);
    assert_eq!(scanned.total, Money::from_euros(36));
    assert_eq!(doc.file_name, "eticket_LL-T-1.pdf");
}

#[tokio::test]
async fn encoding_failure_aborts_before_delivery() {
    let sink = Arc::new(MemorySink::new());
    let generator = Arc::new(TicketGenerator::new(
        Arc::new(SequentialOrderIds::new("LL-T")),
        Arc::new(RejectingEncoder),
        Arc::new(PdfRenderer::new()),
        Locale::ItIt,
    ));

    let result = generator
        .issue(
            Arc::new(Catalog::default()),
            paid(2, Money::from_euros(24)),
            sink.clone(),
        )
        .await;

    assert!(matches!(result, Err(TicketError::Encode(_))));
    assert!(sink.documents().is_empty());
}

#[test]
fn english_locale_still_renders() {
    let generator = TicketGenerator::new(
        Arc::new(SequentialOrderIds::new("LL-EN")),
        Arc::new(QrCodeEncoder::new()),
        Arc::new(PdfRenderer::new()),
        Locale::EnGb,
    );
    let doc = generator
        .generate(&Catalog::default(), &paid(10, Money::from_euros(120)))
        .unwrap();

    assert_eq!(generator.locale(), Locale::EnGb);
    assert_eq!(doc.payload.qty.get(), 10);
    assert_eq!(&doc.bytes[0..4], b"%PDF");
}
