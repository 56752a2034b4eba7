//! Configuration for the booking flow.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::locale::Locale;
use crate::payment::PaymentWidgetConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Payment provider configuration
    pub payment: PaymentConfig,
    /// Where issued tickets are written
    pub output: OutputConfig,
    /// Language of long date labels
    pub locale: Locale,
    /// Log filter (trace, debug, info, warn, error or an `EnvFilter` directive)
    pub log_level: String,
}

/// Payment provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Provider client id; `"sb"` is the sandbox
    pub client_id: String,
    /// Merchant name shown in the provider window
    pub brand_name: String,
}

/// Ticket output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `eticket_<orderId>.pdf` files
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Missing or unparseable values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            payment: PaymentConfig {
                client_id: lookup("PAYPAL_CLIENT_ID")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.payment.client_id),
                brand_name: lookup("ETICKET_BRAND_NAME")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.payment.brand_name),
            },
            output: OutputConfig {
                dir: lookup("ETICKET_OUTPUT_DIR")
                    .filter(|s| !s.trim().is_empty())
                    .map_or(defaults.output.dir, PathBuf::from),
            },
            locale: lookup("ETICKET_LOCALE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.locale),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Widget parameters for the payment provider
    #[must_use]
    pub fn widget(&self) -> PaymentWidgetConfig {
        PaymentWidgetConfig::new(self.payment.client_id.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payment: PaymentConfig {
                client_id: PaymentWidgetConfig::SANDBOX_CLIENT_ID.to_string(),
                brand_name: "Trentadue Bit".to_string(),
            },
            output: OutputConfig {
                dir: PathBuf::from("tickets"),
            },
            locale: Locale::ItIt,
            log_level: "eticket=info,eticket_runtime=info".to_string(),
        }
    }
}
