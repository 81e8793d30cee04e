// Helpers shared by the engine and any presentation client.

use crate::models::TradeSetup;

/// Number of setups shown by default.
pub const DEFAULT_LATEST_SETUPS: usize = 5;

pub const EMPTY_SETUPS_MESSAGE: &str = "No trade setups detected on latest candle.";

/// The last `n` items of an ascending sequence, still ascending.
pub fn latest<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// One-line status for a setup list, used when rendering an empty table.
pub fn setups_summary(setups: &[TradeSetup]) -> String {
    match setups.last() {
        None => EMPTY_SETUPS_MESSAGE.to_string(),
        Some(last) => format!(
            "{} setup(s) detected, latest {} at {} (entry {:.2}, stop {:.2}, target {:.2})",
            setups.len(),
            last.direction,
            last.time.format("%Y-%m-%d %H:%M:%S"),
            last.entry,
            last.stop_loss,
            last.target
        ),
    }
}
