//! Value objects shared across the booking flow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Show dates
// ============================================================================

/// Calendar-date identifier of a performance (`YYYY-MM-DD`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Creates a key from a calendar date
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Creates a key from year, month and day, if they form a valid date
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Returns the calendar date
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

/// A purchasable performance date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDate {
    /// Unique key within the catalog
    pub key: DateKey,
    /// Short display label (e.g. "Sab 13 Set 2025")
    pub label: String,
}

impl ShowDate {
    /// Creates a show date
    #[must_use]
    pub fn new(key: DateKey, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

// ============================================================================
// Quantity (always within [1, 10])
// ============================================================================

/// Number of seats in a booking, clamped to `[Quantity::MIN, Quantity::MAX]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quantity(u8);

/// Number conversion for seat input text
#[allow(clippy::cast_precision_loss)] // only compared against a small range
fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(0.0);
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        // only overflow is left to fail
        return Some(u64::from_str_radix(digits, radix).map_or(f64::INFINITY, |v| v as f64));
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {},
    }
    // `inf` and `nan` spellings are not numbers here
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse().ok()
}

impl Quantity {
    /// Smallest bookable quantity
    pub const MIN: u8 = 1;
    /// Largest bookable quantity
    pub const MAX: u8 = 10;

    /// Clamps any integer into the allowed range
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped first
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Parses free-form numeric input the way the seat field does
    ///
    /// Accepts what a browser number conversion accepts: decimals, exponents,
    /// `0x`/`0o`/`0b` integers and `Infinity`. Returns `None` for anything
    /// else so the caller can keep the previous value. Empty input reads as
    /// zero, fractional input is truncated after clamping.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped first
    pub fn parse_input(raw: &str) -> Option<Self> {
        let value = parse_number(raw.trim())?;
        if value.is_nan() {
            return None;
        }
        let clamped = value.clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        Some(Self(clamped.trunc() as u8))
    }

    /// Returns the seat count
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One more seat, saturating at the maximum
    #[must_use]
    pub fn increment(self) -> Self {
        Self::clamped(i64::from(self.0) + 1)
    }

    /// One less seat, saturating at the minimum
    #[must_use]
    pub fn decrement(self) -> Self {
        Self::clamped(i64::from(self.0) - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Quantity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "quantity {value} outside {}..={}",
                Self::MIN,
                Self::MAX
            ))
        }
    }
}

impl From<Quantity> for u8 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (EUR cents to avoid floating point errors)
// ============================================================================

/// An amount in euro cents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// ISO 4217 code of the only supported currency
    pub const CURRENCY: &'static str = "EUR";

    /// Zero euros
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole euros, saturating on overflow
    #[must_use]
    pub const fn from_euros(euros: u64) -> Self {
        Self(euros.saturating_mul(100))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Amount with exactly two decimals, as payment providers expect ("36.00")
    #[must_use]
    pub fn value(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€ {}", self.value())
    }
}

// ============================================================================
// Steps
// ============================================================================

/// Position in the linear booking flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Pick the performance date
    #[default]
    ChooseDate,
    /// Pick the number of seats
    ChooseSeats,
    /// Accept terms and pay
    Pay,
}

impl Step {
    /// All steps in order
    pub const ALL: [Self; 3] = [Self::ChooseDate, Self::ChooseSeats, Self::Pay];

    /// Zero-based position
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::ChooseDate => 0,
            Self::ChooseSeats => 1,
            Self::Pay => 2,
        }
    }

    /// The following step, if any
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ChooseDate => Some(Self::ChooseSeats),
            Self::ChooseSeats => Some(Self::Pay),
            Self::Pay => None,
        }
    }

    /// The preceding step, if any
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::ChooseDate => None,
            Self::ChooseSeats => Some(Self::ChooseDate),
            Self::Pay => Some(Self::ChooseSeats),
        }
    }

    /// Short label shown in the progress bar
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChooseDate => "Data",
            Self::ChooseSeats => "Posti",
            Self::Pay => "Pagamento",
        }
    }

    /// Hint shown under the label
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::ChooseDate => "Scegli la data",
            Self::ChooseSeats => "Seleziona i posti",
            Self::Pay => "Pagamento sicuro",
        }
    }
}

/// How a step renders relative to the current one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMarker {
    /// Already passed
    Done,
    /// The step being shown
    Current,
    /// Not reached yet
    Todo,
}

// ============================================================================
// Payment status
// ============================================================================

/// Where the payment for this session stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No payment in flight
    #[default]
    Idle,
    /// An order was created and the provider has not reported an outcome yet
    AwaitingCapture,
    /// Funds were captured; never reverts
    Captured,
}
