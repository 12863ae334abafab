use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use super::recalc::AdjustmentTable;

/// Spreads a mid-period income forward as positive adjustments.
///
/// The spread starts on the top-up date itself and is not bounded by the next
/// payday, unlike deficit smoothing which starts the day after and stops at
/// the payday. Callers recalculate from the top-up date afterwards.
pub fn distribute_top_up(
    adjustments: &mut AdjustmentTable,
    date: NaiveDate,
    amount: Decimal,
    distribution_days: u32,
) {
    let days = distribution_days.max(1);
    let chunk = amount / Decimal::from(days);
    for offset in 0..i64::from(days) {
        *adjustments
            .entry(date + Duration::days(offset))
            .or_insert(Decimal::ZERO) += chunk;
    }
}
