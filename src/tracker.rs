use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::{self, recalc, topup};
use crate::errors::Result;
use crate::ledger::{Ledger, Policy, Transaction, TransactionKind, TransactionPatch};

/// Owned tracker state: the ledger and policy are the sources of truth, the
/// two tables are derived caches rebuilt on every mutation.
///
/// This struct is also the persisted document; each section and each settings
/// field tolerates being absent in older or partial files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    #[serde(default, rename = "settings")]
    policy: Policy,
    #[serde(default)]
    transactions: Ledger,
    #[serde(default)]
    daily_limits: engine::LimitTable,
    #[serde(default)]
    surplus_adjustments: engine::AdjustmentTable,
}

/// Whole-ledger totals, not scoped to any period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub savings_amount: Decimal,
    pub remaining_balance: Decimal,
}

/// Transactions and derived limits falling within one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthData {
    pub transactions: BTreeMap<NaiveDate, Vec<Transaction>>,
    pub daily_limits: engine::LimitTable,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn ledger(&self) -> &Ledger {
        &self.transactions
    }

    /// Records a transaction and rebuilds the affected period.
    ///
    /// An income on a date with an earlier income date already in the ledger
    /// is a top-up: spread forward as positive adjustments instead of
    /// anchoring a new period's initial limit.
    pub fn add_transaction(
        &mut self,
        date: NaiveDate,
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
    ) {
        let is_top_up = kind == TransactionKind::Income
            && self
                .transactions
                .earliest_income_date()
                .map_or(false, |first| first < date);

        self.transactions
            .add(date, Transaction::new(kind, amount, description));

        if is_top_up {
            topup::distribute_top_up(
                &mut self.surplus_adjustments,
                date,
                amount.abs(),
                self.policy.distribution_days(),
            );
        }
        self.recalculate_from(date);
    }

    /// In-place edit preserving the recorded timestamp.
    pub fn edit_transaction(
        &mut self,
        date: NaiveDate,
        index: usize,
        patch: TransactionPatch,
    ) -> Result<()> {
        self.transactions.edit(date, index, patch)?;
        self.recalculate_from(date);
        Ok(())
    }

    pub fn remove_transaction(&mut self, date: NaiveDate, index: usize) -> Result<Transaction> {
        let removed = self.transactions.remove(date, index)?;
        self.recalculate_from(date);
        Ok(removed)
    }

    pub fn set_savings_percentage(&mut self, percentage: Decimal) {
        self.policy.set_savings_percentage(percentage);
        self.recalculate_all();
    }

    pub fn set_fixed_daily_limit(&mut self, limit: Decimal) -> Result<()> {
        self.policy.set_fixed_daily_limit(limit)?;
        self.recalculate_all();
        Ok(())
    }

    pub fn set_surplus_settings(&mut self, enabled: bool, distribution_days: u32) {
        self.policy.set_surplus_settings(enabled, distribution_days);
        self.recalculate_all();
    }

    /// Derived limit entering the day; zero when the day has none.
    pub fn daily_limit(&self, date: NaiveDate) -> Decimal {
        self.daily_limits.get(&date).copied().unwrap_or_default()
    }

    /// Signed baseline correction recorded for the day, zero when absent.
    pub fn surplus_adjustment(&self, date: NaiveDate) -> Decimal {
        self.surplus_adjustments
            .get(&date)
            .copied()
            .unwrap_or_default()
    }

    pub fn daily_expenses(&self, date: NaiveDate) -> Decimal {
        self.transactions.daily_expenses(date)
    }

    pub fn payday_income(&self, date: NaiveDate) -> Decimal {
        self.transactions.payday_income(date)
    }

    pub fn transactions_for(&self, date: NaiveDate) -> &[Transaction] {
        self.transactions.transactions_for(date)
    }

    /// Totals over the entire ledger; savings come off the income at the
    /// configured percentage.
    pub fn balance_summary(&self) -> BalanceSummary {
        let total_income = self.transactions.total_income();
        let total_expenses = self.transactions.total_expenses();
        let savings_amount =
            total_income * self.policy.savings_percentage / Decimal::ONE_HUNDRED;
        BalanceSummary {
            total_income,
            total_expenses,
            savings_amount,
            remaining_balance: total_income - total_expenses - savings_amount,
        }
    }

    /// Transactions and limits within the calendar month of `reference`.
    pub fn month_data(&self, reference: NaiveDate) -> MonthData {
        let in_month =
            |date: NaiveDate| date.year() == reference.year() && date.month() == reference.month();
        MonthData {
            transactions: self
                .transactions
                .iter()
                .filter(|(date, _)| in_month(*date))
                .map(|(date, transactions)| (date, transactions.to_vec()))
                .collect(),
            daily_limits: self
                .daily_limits
                .iter()
                .filter(|(date, _)| in_month(**date))
                .map(|(date, limit)| (*date, *limit))
                .collect(),
        }
    }

    /// [`Self::month_data`] for today's calendar month.
    pub fn current_month_data(&self) -> MonthData {
        self.month_data(Local::now().date_naive())
    }

    fn recalculate_from(&mut self, date: NaiveDate) {
        recalc::recalculate(
            &self.transactions,
            &self.policy,
            &mut self.daily_limits,
            &mut self.surplus_adjustments,
            date,
        );
    }

    fn recalculate_all(&mut self) {
        recalc::recalculate_all(
            &self.transactions,
            &self.policy,
            &mut self.daily_limits,
            &mut self.surplus_adjustments,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrackerError;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker_with_salary() -> Tracker {
        let mut tracker = Tracker::new();
        tracker.add_transaction(
            date(2025, 5, 10),
            TransactionKind::Income,
            dec!(1000),
            "Salary",
        );
        tracker.set_savings_percentage(dec!(20));
        tracker
    }

    #[test]
    fn day_after_payday_gets_the_base_limit() {
        let tracker = tracker_with_salary();
        assert_eq!(tracker.daily_limit(date(2025, 5, 11)).round_dp(2), dec!(25.81));
        assert_eq!(tracker.daily_limit(date(2025, 5, 10)), Decimal::ZERO);
    }

    #[test]
    fn rollover_and_deficit_update_following_days() {
        let mut tracker = tracker_with_salary();

        tracker.add_transaction(date(2025, 5, 11), TransactionKind::Expense, dec!(30), "Overspent");
        let reduced = tracker.daily_limit(date(2025, 5, 12));
        assert_eq!(reduced.round_dp(2), dec!(21.61));

        tracker.add_transaction(date(2025, 5, 12), TransactionKind::Expense, dec!(10), "Underspent");
        assert!(tracker.daily_limit(date(2025, 5, 13)) > reduced);
    }

    #[test]
    fn smoothing_resets_the_next_day_and_spreads_the_deficit() {
        let mut tracker = tracker_with_salary();
        tracker.set_surplus_settings(true, 4);

        let entering = tracker.daily_limit(date(2025, 5, 11));
        tracker.add_transaction(
            date(2025, 5, 11),
            TransactionKind::Expense,
            entering + dec!(30),
            "Big Overspend",
        );

        assert_eq!(tracker.daily_limit(date(2025, 5, 12)), entering);
        for offset in 12..=15 {
            assert_eq!(tracker.surplus_adjustment(date(2025, 5, offset)), dec!(-7.5));
        }
        assert_eq!(tracker.surplus_adjustment(date(2025, 5, 16)), Decimal::ZERO);
    }

    #[test]
    fn top_up_leaves_earlier_days_untouched() {
        let mut tracker = Tracker::new();
        tracker.add_transaction(
            date(2025, 5, 10),
            TransactionKind::Income,
            dec!(3100),
            "Salary",
        );
        // No spending: 100/day compounds, so day 5 of the period enters at 500.
        let before = tracker.daily_limit(date(2025, 5, 15));
        assert_eq!(before, dec!(500));

        tracker.add_transaction(
            date(2025, 5, 20),
            TransactionKind::Income,
            dec!(400),
            "Side gig",
        );

        assert_eq!(tracker.daily_limit(date(2025, 5, 15)), before);
        assert_eq!(tracker.payday_income(date(2025, 5, 10)), dec!(3100));
    }

    #[test]
    fn top_up_spread_survives_past_a_short_recalculated_span() {
        // Fixed-limit mode keeps the top-up's own recalculated span short, so
        // the tail of the spread stays in the adjustment table.
        let mut tracker = Tracker::new();
        tracker.set_fixed_daily_limit(dec!(100)).unwrap();
        tracker.set_surplus_settings(false, 4);
        tracker.add_transaction(
            date(2025, 5, 10),
            TransactionKind::Income,
            dec!(3100),
            "Salary",
        );

        tracker.add_transaction(
            date(2025, 5, 20),
            TransactionKind::Income,
            dec!(200),
            "Side gig",
        );

        // 200 spread over 4 days is +50 each; the recalculation that follows
        // rebuilds only the two funded days [05-20, 05-22).
        assert_eq!(tracker.surplus_adjustment(date(2025, 5, 22)), dec!(50));
        assert_eq!(tracker.surplus_adjustment(date(2025, 5, 23)), dec!(50));
        assert_eq!(tracker.surplus_adjustment(date(2025, 5, 24)), Decimal::ZERO);
    }

    #[test]
    fn edit_recalculates_from_the_transaction_date() {
        let mut tracker = tracker_with_salary();
        tracker.add_transaction(date(2025, 5, 11), TransactionKind::Expense, dec!(30), "Overspent");
        assert_eq!(tracker.daily_limit(date(2025, 5, 12)).round_dp(2), dec!(21.61));

        tracker
            .edit_transaction(
                date(2025, 5, 11),
                0,
                TransactionPatch {
                    amount: Some(dec!(10)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(tracker.daily_limit(date(2025, 5, 12)).round_dp(2), dec!(41.61));
    }

    #[test]
    fn edit_and_remove_report_missing_entries() {
        let mut tracker = Tracker::new();
        assert!(matches!(
            tracker.edit_transaction(date(2025, 5, 11), 0, TransactionPatch::default()),
            Err(TrackerError::NotFound(_))
        ));
        assert!(matches!(
            tracker.remove_transaction(date(2025, 5, 11), 0),
            Err(TrackerError::NotFound(_))
        ));
    }

    #[test]
    fn balance_summary_covers_the_whole_ledger() {
        let mut tracker = tracker_with_salary();
        tracker.add_transaction(date(2025, 5, 11), TransactionKind::Expense, dec!(30), "Lunch");
        tracker.add_transaction(date(2025, 6, 2), TransactionKind::Expense, dec!(70), "Utilities");

        let summary = tracker.balance_summary();
        assert_eq!(summary.total_income, dec!(1000));
        assert_eq!(summary.total_expenses, dec!(100));
        assert_eq!(summary.savings_amount, dec!(200));
        assert_eq!(summary.remaining_balance, dec!(700));
    }

    #[test]
    fn month_data_filters_by_calendar_month() {
        let mut tracker = tracker_with_salary();
        tracker.add_transaction(date(2025, 5, 11), TransactionKind::Expense, dec!(30), "Lunch");
        tracker.add_transaction(date(2025, 6, 2), TransactionKind::Expense, dec!(70), "Utilities");

        let may = tracker.month_data(date(2025, 5, 1));
        assert_eq!(may.transactions.len(), 2);
        assert!(may.transactions.contains_key(&date(2025, 5, 10)));
        assert!(!may.transactions.contains_key(&date(2025, 6, 2)));
        assert!(may.daily_limits.keys().all(|d| d.month() == 5));
        assert!(!may.daily_limits.is_empty());
    }
}
