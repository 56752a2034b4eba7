//! Booking flow demo
//!
//! Walks one purchase end to end against the sandbox payment adapter:
//! pick a date, choose seats, accept the terms, pay, and write the ticket
//! into the configured output directory.
//!
//! # Usage
//!
//! ```bash
//! ETICKET_OUTPUT_DIR=/tmp/tickets cargo run --bin demo
//! ```

use anyhow::{bail, Context};
use eticket::{
    booking_store, BookingAction, BookingEnvironment, BookingStore, Config, DateKey,
    PaymentStatus, SandboxPaymentAdapter,
};
use eticket_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EFFECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    eticket_runtime::metrics::describe_store_metrics();
    eticket::metrics::describe_booking_metrics();

    let widget = config.widget();
    if !widget.is_sandbox() {
        bail!("the demo only runs against the sandbox (PAYPAL_CLIENT_ID=sb)");
    }

    let env = BookingEnvironment::from_config(
        &config,
        SandboxPaymentAdapter::new().shared(),
        Arc::new(SystemClock),
    );
    let catalog = Arc::clone(&env.catalog);
    let store = booking_store(env);

    println!("\n{}", catalog.show_name());
    for date in catalog.dates() {
        println!("  {}  {}", date.key, date.label);
    }

    let date: DateKey = "2025-09-13".parse().context("demo date")?;
    for action in [
        BookingAction::SelectDate { key: date },
        BookingAction::Advance,
        BookingAction::SetQuantity { value: 3 },
        BookingAction::Advance,
        BookingAction::SetTermsAccepted { accepted: true },
    ] {
        send(&store, action).await?;
    }

    let summary = store
        .state(|s| s.summary(&catalog, config.locale))
        .await;
    println!(
        "\nRiepilogo: {} · {} posti · {}",
        summary.date_label, summary.quantity, summary.total
    );

    send(&store, BookingAction::StartPayment).await?;
    if store.state(|s| s.pending_order().and_then(|p| p.handle.clone())).await.is_none() {
        bail!("payment order was not created");
    }

    // The buyer approves in the provider window
    send(&store, BookingAction::PaymentApproved).await?;
    if store.state(|s| s.payment_status()).await != PaymentStatus::Captured {
        bail!("payment was not captured");
    }
    println!("Pagamento confermato");

    send(&store, BookingAction::DownloadTicket).await?;
    let ticket = store
        .state(|s| s.last_ticket().cloned())
        .await
        .context("ticket was not issued")?;

    println!(
        "Biglietto: {}",
        config.output.dir.join(&ticket.file_name).display()
    );

    store
        .shutdown(EFFECT_TIMEOUT)
        .await
        .context("store shutdown")?;
    Ok(())
}

async fn send(store: &BookingStore, action: BookingAction) -> anyhow::Result<()> {
    let mut handle = store.send(action).await?;
    if handle.wait_with_timeout(EFFECT_TIMEOUT).await.is_err() {
        bail!("timed out waiting for effects");
    }
    Ok(())
}
