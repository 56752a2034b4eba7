//! Ticket record and the JSON payload carried by its QR code.

use super::order_id::OrderId;
use crate::types::{DateKey, Money, Quantity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verification payload errors
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Serialization failed
    #[error("failed to encode verification payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// Text is not a payload
    #[error("malformed verification payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Payload was written by an unknown schema version
    #[error("unsupported verification payload version {0}")]
    UnsupportedVersion(u32),
}

/// Everything a single issued ticket certifies
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Fresh id for this ticket
    pub order_id: OrderId,
    /// Show title
    pub show: String,
    /// Performance date
    pub date: DateKey,
    /// Seats covered
    pub quantity: Quantity,
    /// Issuing organisation
    pub holder: String,
    /// Amount paid
    pub total: Money,
}

/// Compact JSON embedded in the ticket's QR code
///
/// Fields serialize in declaration order: `v, orderId, show, date, qty, holder, total`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPayload {
    /// Schema version, always [`VerificationPayload::VERSION`]
    pub v: u32,
    /// Ticket order id
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    /// Show title
    pub show: String,
    /// Performance date (`YYYY-MM-DD`)
    pub date: DateKey,
    /// Seats covered
    pub qty: Quantity,
    /// Issuing organisation
    pub holder: String,
    /// Amount paid, as a number of euros
    #[serde(with = "euros")]
    pub total: Money,
}

#[derive(Deserialize)]
struct Versioned {
    v: u32,
}

impl VerificationPayload {
    /// Current schema version
    pub const VERSION: u32 = 1;

    /// Payload certifying `record`
    #[must_use]
    pub fn from_record(record: &TicketRecord) -> Self {
        Self {
            v: Self::VERSION,
            order_id: record.order_id.clone(),
            show: record.show.clone(),
            date: record.date,
            qty: record.quantity,
            holder: record.holder.clone(),
            total: record.total,
        }
    }

    /// Canonical compact JSON
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(PayloadError::Encode)
    }

    /// Reads a payload scanned from a ticket
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::UnsupportedVersion`] for any version other than
    /// 1 and [`PayloadError::Malformed`] for anything else that does not decode.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let Versioned { v } = serde_json::from_str(text).map_err(PayloadError::Malformed)?;
        if v != Self::VERSION {
            return Err(PayloadError::UnsupportedVersion(v));
        }
        serde_json::from_str(text).map_err(PayloadError::Malformed)
    }
}

/// Money as a JSON number of euros (`36`, `12.5`)
mod euros {
    use crate::types::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_precision_loss)] // ticket totals are far below 2^52 cents
    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        let cents = money.cents();
        if cents % 100 == 0 {
            serializer.serialize_u64(cents / 100)
        } else {
            serializer.serialize_f64(cents as f64 / 100.0)
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let euros = f64::deserialize(deserializer)?;
        if !euros.is_finite() || euros < 0.0 {
            return Err(de::Error::custom("total must be a non-negative amount"));
        }
        Ok(Money::from_cents((euros * 100.0).round() as u64))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(total: Money) -> TicketRecord {
        TicketRecord {
            order_id: OrderId::new("LL-mf1gfbk0-42"),
            show: "La Locandiera — Teatro".to_string(),
            date: DateKey::from_ymd(2025, 9, 13).unwrap(),
            quantity: Quantity::clamped(3),
            holder: "Trentadue Bit".to_string(),
            total,
        }
    }

    #[test]
    fn json_has_fixed_field_order_and_numeric_total() {
        let json = VerificationPayload::from_record(&record(Money::from_euros(36)))
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"v":1,"orderId":"LL-mf1gfbk0-42","show":"La Locandiera — Teatro","date":"2025-09-13","qty":3,"holder":"Trentadue Bit","total":36}"#
        );
    }

    #[test]
    fn fractional_totals_keep_cents() {
        let json = VerificationPayload::from_record(&record(Money::from_cents(1250)))
            .to_json()
            .unwrap();
        assert!(json.ends_with(r#""total":12.5}"#));
    }

    #[test]
    fn parse_reads_back_what_was_printed() {
        let payload = VerificationPayload::from_record(&record(Money::from_cents(3605)));
        let parsed = VerificationPayload::parse(&payload.to_json().unwrap()).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn parse_rejects_other_versions() {
        let text = r#"{"v":2,"orderId":"x","show":"s","date":"2025-09-13","qty":1,"holder":"h","total":12}"#;
        assert!(matches!(
            VerificationPayload::parse(text),
            Err(PayloadError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            VerificationPayload::parse("not json"),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn parse_rejects_out_of_range_quantity() {
        let text = r#"{"v":1,"orderId":"x","show":"s","date":"2025-09-13","qty":11,"holder":"h","total":132}"#;
        assert!(matches!(
            VerificationPayload::parse(text),
            Err(PayloadError::Malformed(_))
        ));
    }
}
