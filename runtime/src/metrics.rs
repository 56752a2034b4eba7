//! Metric names recorded by the Store.
//!
//! Recording goes through the `metrics` facade; nothing is exported unless
//! the embedding application installs a recorder. Call [`describe_store_metrics`]
//! once after installing one so descriptions show up alongside the values.

use metrics::{describe_counter, describe_histogram, Unit};

/// Actions reduced by any store
pub const COMMANDS_TOTAL: &str = "store.commands.total";

/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Reducer execution time
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Actions rejected because the store was shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";

/// Register descriptions for every metric the Store records.
pub fn describe_store_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Actions reduced by the store");
    describe_counter!(EFFECTS_EXECUTED, "Effects executed, by effect type");
    describe_histogram!(REDUCER_DURATION, Unit::Seconds, "Reducer execution time");
    describe_counter!(SHUTDOWN_REJECTED, "Actions rejected during shutdown");
}
