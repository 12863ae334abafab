use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

use super::transaction::{Transaction, TransactionPatch};

/// Date-keyed transaction store. Insertion order is preserved within a date;
/// no date key ever maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<NaiveDate, Vec<Transaction>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, date: NaiveDate, transaction: Transaction) {
        self.entries.entry(date).or_default().push(transaction);
    }

    /// Removes the transaction at `index` under `date`, dropping the date key
    /// when its list empties.
    pub fn remove(&mut self, date: NaiveDate, index: usize) -> Result<Transaction> {
        let transactions = self
            .entries
            .get_mut(&date)
            .ok_or_else(|| TrackerError::NotFound(format!("no transactions on {date}")))?;
        if index >= transactions.len() {
            return Err(TrackerError::NotFound(format!(
                "no transaction at index {index} on {date}"
            )));
        }
        let removed = transactions.remove(index);
        if transactions.is_empty() {
            self.entries.remove(&date);
        }
        Ok(removed)
    }

    pub fn edit(&mut self, date: NaiveDate, index: usize, patch: TransactionPatch) -> Result<()> {
        let transaction = self
            .entries
            .get_mut(&date)
            .and_then(|transactions| transactions.get_mut(index))
            .ok_or_else(|| {
                TrackerError::NotFound(format!("no transaction at index {index} on {date}"))
            })?;
        transaction.apply(patch);
        Ok(())
    }

    pub fn transactions_for(&self, date: NaiveDate) -> &[Transaction] {
        self.entries.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Transaction])> + '_ {
        self.entries
            .iter()
            .map(|(date, transactions)| (*date, transactions.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dates carrying at least one income transaction, ascending.
    pub fn income_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries
            .iter()
            .filter(|(_, transactions)| transactions.iter().any(Transaction::is_income))
            .map(|(date, _)| *date)
    }

    /// Earliest income date across the whole ledger, if any.
    pub fn earliest_income_date(&self) -> Option<NaiveDate> {
        self.income_dates().next()
    }

    /// Total income recorded on a single date.
    pub fn payday_income(&self, date: NaiveDate) -> Decimal {
        self.transactions_for(date)
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum()
    }

    /// Total expenses recorded on a single date.
    pub fn daily_expenses(&self, date: NaiveDate) -> Decimal {
        self.transactions_for(date)
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_income(&self) -> Decimal {
        self.entries
            .values()
            .flatten()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_expenses(&self) -> Decimal {
        self.entries
            .values()
            .flatten()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }
}
