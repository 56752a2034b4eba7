//! The fixed set of purchasable performances.

use crate::types::{DateKey, Money, ShowDate};
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building a catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A catalog needs at least one date
    #[error("catalog has no show dates")]
    Empty,

    /// Two dates share a key
    #[error("duplicate show date {0}")]
    DuplicateDate(DateKey),

    /// Seats cannot be free
    #[error("price per seat must be positive")]
    NonPositivePrice,
}

/// Ordered show dates plus the per-seat price
///
/// Immutable once built; the booking reducer only reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    show_name: String,
    production: String,
    holder: String,
    price_per_seat: Money,
    dates: Vec<ShowDate>,
}

impl Catalog {
    /// Builds a catalog, validating its dates and price
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when `dates` is empty, contains a key twice,
    /// or `price_per_seat` is zero.
    pub fn new(
        show_name: impl Into<String>,
        production: impl Into<String>,
        holder: impl Into<String>,
        price_per_seat: Money,
        dates: Vec<ShowDate>,
    ) -> Result<Self, CatalogError> {
        if dates.is_empty() {
            return Err(CatalogError::Empty);
        }
        if price_per_seat.is_zero() {
            return Err(CatalogError::NonPositivePrice);
        }
        let mut seen = HashSet::with_capacity(dates.len());
        for date in &dates {
            if !seen.insert(date.key) {
                return Err(CatalogError::DuplicateDate(date.key));
            }
        }

        Ok(Self {
            show_name: show_name.into(),
            production: production.into(),
            holder: holder.into(),
            price_per_seat,
            dates,
        })
    }

    /// The September 2025 run of "La Locandiera"
    #[must_use]
    pub fn la_locandiera() -> Self {
        let dates = [(12, "Ven 12 Set 2025"), (13, "Sab 13 Set 2025"), (14, "Dom 14 Set 2025")]
            .into_iter()
            .filter_map(|(day, label)| {
                NaiveDate::from_ymd_opt(2025, 9, day).map(|d| ShowDate::new(DateKey::new(d), label))
            })
            .collect();

        Self {
            show_name: "La Locandiera — Teatro".to_string(),
            production: "La Locandiera".to_string(),
            holder: "Trentadue Bit".to_string(),
            price_per_seat: Money::from_euros(12),
            dates,
        }
    }

    /// All dates in display order
    #[must_use]
    pub fn dates(&self) -> &[ShowDate] {
        &self.dates
    }

    /// Looks up a date by key
    #[must_use]
    pub fn get(&self, key: DateKey) -> Option<&ShowDate> {
        self.dates.iter().find(|d| d.key == key)
    }

    /// Whether `key` is a purchasable date
    #[must_use]
    pub fn contains(&self, key: DateKey) -> bool {
        self.get(key).is_some()
    }

    /// Price of a single seat
    #[must_use]
    pub const fn price_per_seat(&self) -> Money {
        self.price_per_seat
    }

    /// Full show title printed on the ticket
    #[must_use]
    pub fn show_name(&self) -> &str {
        &self.show_name
    }

    /// Production name used in the ticket header
    #[must_use]
    pub fn production(&self) -> &str {
        &self.production
    }

    /// Organisation issuing the tickets
    #[must_use]
    pub fn holder(&self) -> &str {
        &self.holder
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::la_locandiera()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(day: u32) -> DateKey {
        DateKey::from_ymd(2025, 9, day).unwrap()
    }

    #[test]
    fn default_catalog_has_three_september_dates() {
        let catalog = Catalog::default();
        let keys: Vec<String> = catalog.dates().iter().map(|d| d.key.to_string()).collect();
        assert_eq!(keys, ["2025-09-12", "2025-09-13", "2025-09-14"]);
        assert_eq!(catalog.get(key(13)).unwrap().label, "Sab 13 Set 2025");
        assert_eq!(catalog.price_per_seat(), Money::from_euros(12));
        assert_eq!(catalog.holder(), "Trentadue Bit");
        assert!(!catalog.contains(key(15)));
    }

    #[test]
    fn building_rejects_invalid_catalogs() {
        let date = ShowDate::new(key(12), "Ven 12 Set 2025");

        assert_eq!(
            Catalog::new("s", "p", "h", Money::from_euros(1), vec![]),
            Err(CatalogError::Empty)
        );
        assert_eq!(
            Catalog::new("s", "p", "h", Money::ZERO, vec![date.clone()]),
            Err(CatalogError::NonPositivePrice)
        );
        assert_eq!(
            Catalog::new("s", "p", "h", Money::from_euros(1), vec![date.clone(), date]),
            Err(CatalogError::DuplicateDate(key(12)))
        );
    }
}
