//! The booking date picker only offers days from tomorrow on.

use anyhow::Result;
use chrono::{DateTime, Utc};
use dom::NodeKey;
use page_handler::HostContext;

/// The calendar day after `now` (UTC), as `YYYY-MM-DD`.
pub fn min_booking_date(now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    today.succ_opt().unwrap_or(today).format("%Y-%m-%d").to_string()
}

/// Set the input's `min` from the current wall clock. Evaluated once.
///
/// # Errors
/// Propagates view mutation failures.
pub fn apply(ctx: &mut HostContext<'_>, date_input: NodeKey) -> Result<String> {
    let min = min_booking_date(ctx.wall_clock());
    ctx.view.set_attribute(date_input, "min", &min)?;
    Ok(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn tomorrow_rolls_over_month_and_year_ends() {
        let new_year_eve = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).single();
        assert_eq!(new_year_eve.map(min_booking_date).as_deref(), Some("2025-01-01"));
        let leap = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).single();
        assert_eq!(leap.map(min_booking_date).as_deref(), Some("2024-02-29"));
    }
}
