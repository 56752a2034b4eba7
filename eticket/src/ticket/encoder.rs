//! Scannable code images.

use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

/// Code image encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Nothing to encode
    #[error("cannot encode empty data")]
    Empty,

    /// The encoder rejected the data (usually too long)
    #[error("code encoding failed: {0}")]
    Rejected(String),
}

/// Square grid of dark and light modules, quiet zone included
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeImage {
    width: usize,
    modules: Vec<bool>,
}

impl CodeImage {
    /// Builds an image from row-major modules (`true` is dark)
    ///
    /// Returns `None` unless `modules` holds exactly `width * width` entries.
    #[must_use]
    pub fn new(width: usize, modules: Vec<bool>) -> Option<Self> {
        (width > 0 && width.checked_mul(width) == Some(modules.len()))
            .then_some(Self { width, modules })
    }

    /// Modules per side
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` (from the top) is dark
    #[must_use]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Positions of every dark module as `(x, y)`
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i % width, i / width))
    }
}

/// Turns text into a scannable image
pub trait CodeImageEncoder: Send + Sync {
    /// Encode `data`
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if `data` cannot be represented.
    fn encode(&self, data: &str) -> Result<CodeImage, EncodeError>;
}

/// QR encoder, error correction level M
#[derive(Clone, Copy, Debug)]
pub struct QrCodeEncoder {
    quiet_zone: usize,
}

impl QrCodeEncoder {
    /// One light module of margin around the symbol
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet_zone: 1 }
    }

    /// Change the light margin, in modules
    #[must_use]
    pub const fn with_quiet_zone(mut self, modules: usize) -> Self {
        self.quiet_zone = modules;
        self
    }
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeImageEncoder for QrCodeEncoder {
    fn encode(&self, data: &str) -> Result<CodeImage, EncodeError> {
        if data.is_empty() {
            return Err(EncodeError::Empty);
        }
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
            .map_err(|e| EncodeError::Rejected(e.to_string()))?;

        let inner = code.width();
        let width = inner + 2 * self.quiet_zone;
        let mut modules = vec![false; width * width];
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color == Color::Dark {
                let (x, y) = (i % inner + self.quiet_zone, i / inner + self.quiet_zone);
                modules[y * width + x] = true;
            }
        }

        tracing::debug!(bytes = data.len(), modules = width, "Encoded QR code");
        CodeImage::new(width, modules).ok_or_else(|| EncodeError::Rejected("empty symbol".to_string()))
    }
}
