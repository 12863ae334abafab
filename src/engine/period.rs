use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ledger::{Ledger, Policy};

/// The payday governing a reference date, plus the next income date after the
/// reference, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub payday: NaiveDate,
    pub next_payday: Option<NaiveDate>,
}

/// Finds the latest income date at or before `reference` and the earliest one
/// strictly after it. Returns `None` when the ledger holds no income at or
/// before the reference; callers then skip recalculation entirely.
pub fn resolve_period(ledger: &Ledger, reference: NaiveDate) -> Option<PeriodBounds> {
    let mut payday = None;
    let mut next_payday = None;
    for date in ledger.income_dates() {
        if date <= reference {
            payday = Some(date);
        } else {
            next_payday = Some(date);
            break;
        }
    }
    payday.map(|payday| PeriodBounds { payday, next_payday })
}

/// Number of days governed by the payday's income.
///
/// With an active fixed daily limit the period is however many whole days the
/// payday income can fund; otherwise it runs to the next payday, or to the
/// same day of the next calendar month when there is none.
pub fn period_length(ledger: &Ledger, policy: &Policy, bounds: &PeriodBounds) -> i64 {
    if let Some(fixed) = active_fixed_limit(policy) {
        let available = ledger.payday_income(bounds.payday);
        return (available / fixed)
            .floor()
            .to_i64()
            .unwrap_or(0);
    }
    let end = match bounds.next_payday {
        Some(next) => next,
        None => same_day_next_month(bounds.payday),
    };
    (end - bounds.payday).num_days()
}

fn active_fixed_limit(policy: &Policy) -> Option<Decimal> {
    policy.fixed_daily_limit.filter(|fixed| *fixed > Decimal::ZERO)
}

/// Same day of the following month, clamped to the shorter month's last day
/// (Jan 31 -> Feb 28/29).
fn same_day_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}
