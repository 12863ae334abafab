use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::ledger::{Ledger, Policy};

use super::period;

/// Derived limit entering each day; fully rebuilt for the affected span on
/// every mutation.
pub type LimitTable = BTreeMap<NaiveDate, Decimal>;

/// Signed corrections to a day's baseline limit: negative from deficit
/// smoothing, positive from top-up distribution. Transient, like the limits.
pub type AdjustmentTable = BTreeMap<NaiveDate, Decimal>;

/// Rebuilds the daily-limit and adjustment tables for the period governing
/// `start`.
///
/// The cleared span starts at the payday even though the walk starts the day
/// after it, so the payday itself never carries a derived limit entry. Each
/// walked day records the limit *entering* it, then rolls unspent allowance
/// forward or handles the deficit: spread over the smoothing window when
/// surplus distribution is on, otherwise debited from the next day's baseline
/// and floored at zero.
pub fn recalculate(
    ledger: &Ledger,
    policy: &Policy,
    daily_limits: &mut LimitTable,
    adjustments: &mut AdjustmentTable,
    start: NaiveDate,
) {
    let Some(bounds) = period::resolve_period(ledger, start) else {
        return;
    };
    let period_days = period::period_length(ledger, policy, &bounds);
    let initial_limit = initial_daily_limit(ledger, policy, bounds.payday, period_days);

    clear_span(daily_limits, bounds.payday, period_days);
    clear_span(adjustments, bounds.payday, period_days);

    if period_days <= 0 {
        return;
    }

    let end = bounds.payday + Duration::days(period_days);
    let mut day = bounds.payday + Duration::days(1);
    let mut running = initial_limit;
    while day < end {
        let adjusted_initial = initial_limit + adjustments.get(&day).copied().unwrap_or_default();
        let expenses = ledger.daily_expenses(day);

        daily_limits.insert(day, running);

        if expenses <= running {
            // Unspent allowance compounds onto tomorrow's baseline.
            running = adjusted_initial + (running - expenses);
        } else {
            let deficit = expenses - running;
            if policy.surplus_enabled {
                spread_deficit(
                    adjustments,
                    day,
                    deficit,
                    policy.distribution_days(),
                    bounds.next_payday,
                );
                running = adjusted_initial;
            } else {
                running = (adjusted_initial - deficit).max(Decimal::ZERO);
            }
        }

        if bounds.next_payday.map_or(false, |next| day >= next) {
            break;
        }
        day += Duration::days(1);
    }

    tracing::debug!(
        payday = %bounds.payday,
        period_days,
        %initial_limit,
        "daily limits recalculated"
    );
}

/// Full recalculation anchored at the earliest income date of the ledger.
/// Used after policy changes, which can retroactively change every period.
pub fn recalculate_all(
    ledger: &Ledger,
    policy: &Policy,
    daily_limits: &mut LimitTable,
    adjustments: &mut AdjustmentTable,
) {
    if let Some(first) = ledger.earliest_income_date() {
        recalculate(ledger, policy, daily_limits, adjustments, first);
    }
}

fn initial_daily_limit(
    ledger: &Ledger,
    policy: &Policy,
    payday: NaiveDate,
    period_days: i64,
) -> Decimal {
    if let Some(fixed) = policy.fixed_daily_limit {
        return fixed;
    }
    let total_income = ledger.payday_income(payday);
    let available = total_income * (Decimal::ONE_HUNDRED - policy.savings_percentage)
        / Decimal::ONE_HUNDRED;
    if period_days > 0 {
        available / Decimal::from(period_days)
    } else {
        Decimal::ZERO
    }
}

/// Drops table entries in `[payday, payday + period_days)`; a non-positive
/// length clears everything from the payday onward.
fn clear_span(table: &mut BTreeMap<NaiveDate, Decimal>, payday: NaiveDate, period_days: i64) {
    if period_days <= 0 {
        let _ = table.split_off(&payday);
        return;
    }
    let end = payday + Duration::days(period_days);
    let stale: Vec<NaiveDate> = table.range(payday..end).map(|(date, _)| *date).collect();
    for date in stale {
        table.remove(&date);
    }
}

/// Spreads a deficit as equal negative corrections over the following
/// `distribution_days`, stopping once a future day reaches the next payday.
fn spread_deficit(
    adjustments: &mut AdjustmentTable,
    day: NaiveDate,
    deficit: Decimal,
    distribution_days: u32,
    next_payday: Option<NaiveDate>,
) {
    let per_day = deficit / Decimal::from(distribution_days);
    for offset in 1..=i64::from(distribution_days) {
        let future = day + Duration::days(offset);
        if next_payday.map_or(false, |next| future >= next) {
            break;
        }
        *adjustments.entry(future).or_insert(Decimal::ZERO) -= per_day;
    }
}
