//! Rent ledger import.
//!
//! Landlords rarely type their arrears history by hand; they export a ledger
//! from their bank or agent portal. This module parses those CSV exports and
//! condenses them into the arrears facts the wizard would otherwise ask for.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// Payments later than this many times in the ledger count as persistent
/// late payment for Ground 11 purposes.
const PERSISTENT_LATE_THRESHOLD: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("rent ledger could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("rent ledger row {row}: {reason}")]
    Row { row: usize, reason: String },
    #[error("rent ledger has no entries")]
    Empty,
    #[error("rent ledger import is not mapped for {0} cases")]
    UnsupportedJurisdiction(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub due_date: NaiveDate,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub paid_date: Option<NaiveDate>,
}

impl LedgerEntry {
    fn unpaid(&self) -> bool {
        self.amount_paid + 0.005 < self.amount_due
    }

    fn late(&self) -> bool {
        if self.unpaid() {
            return true;
        }
        match self.paid_date {
            Some(paid) => paid > self.due_date,
            None => false,
        }
    }
}

/// What the ledger says about the tenancy's payment history, expressed in
/// the units the arrears questions use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentLedgerSummary {
    pub entries: usize,
    pub total_due: f64,
    pub total_paid: f64,
    /// Outstanding balance, floored at zero.
    pub arrears_amount: f64,
    /// Arrears divided by the mean periodic charge, rounded to two decimals.
    pub months_equivalent: f64,
    pub unpaid_periods: usize,
    pub late_payments: usize,
    pub persistent_lateness: bool,
}

impl RentLedgerSummary {
    pub fn in_arrears(&self) -> bool {
        self.arrears_amount > 0.0
    }
}

pub fn parse_ledger<R: Read>(reader: R) -> Result<RentLedgerSummary, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (index, record) in csv_reader.deserialize::<LedgerRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;
        entries.push(row.into_entry(row_number)?);
    }
    if entries.is_empty() {
        return Err(LedgerError::Empty);
    }
    entries.sort_by_key(|entry| entry.due_date);

    Ok(summarise(&entries))
}

fn summarise(entries: &[LedgerEntry]) -> RentLedgerSummary {
    let total_due: f64 = entries.iter().map(|entry| entry.amount_due).sum();
    let total_paid: f64 = entries.iter().map(|entry| entry.amount_paid).sum();
    let arrears_amount = round_money(f64::max(total_due - total_paid, 0.0));

    let charged: Vec<f64> = entries
        .iter()
        .map(|entry| entry.amount_due)
        .filter(|amount| *amount > 0.0)
        .collect();
    let months_equivalent = if charged.is_empty() || arrears_amount == 0.0 {
        0.0
    } else {
        let mean_charge = charged.iter().sum::<f64>() / charged.len() as f64;
        round_fraction(arrears_amount / mean_charge)
    };

    let unpaid_periods = entries.iter().filter(|entry| entry.unpaid()).count();
    let late_payments = entries.iter().filter(|entry| entry.late()).count();

    RentLedgerSummary {
        entries: entries.len(),
        total_due: round_money(total_due),
        total_paid: round_money(total_paid),
        arrears_amount,
        months_equivalent,
        unpaid_periods,
        late_payments,
        persistent_lateness: late_payments >= PERSISTENT_LATE_THRESHOLD,
    }
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_fraction(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Due Date")]
    due_date: String,
    #[serde(rename = "Amount Due")]
    amount_due: String,
    #[serde(
        rename = "Amount Paid",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    amount_paid: Option<String>,
    #[serde(
        rename = "Paid Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    paid_date: Option<String>,
}

impl LedgerRow {
    fn into_entry(self, row_number: usize) -> Result<LedgerEntry, LedgerError> {
        let due_date = parse_date(&self.due_date).ok_or_else(|| LedgerError::Row {
            row: row_number,
            reason: format!("'{}' is not a recognised due date", self.due_date),
        })?;
        let amount_due = parse_amount(&self.amount_due).ok_or_else(|| LedgerError::Row {
            row: row_number,
            reason: format!("'{}' is not a recognised amount due", self.amount_due),
        })?;
        let amount_paid = match self.amount_paid.as_deref() {
            Some(raw) => parse_amount(raw).ok_or_else(|| LedgerError::Row {
                row: row_number,
                reason: format!("'{raw}' is not a recognised amount paid"),
            })?,
            None => 0.0,
        };
        let paid_date = match self.paid_date.as_deref() {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| LedgerError::Row {
                row: row_number,
                reason: format!("'{raw}' is not a recognised paid date"),
            })?),
            None => None,
        };
        Ok(LedgerEntry {
            due_date,
            amount_due,
            amount_paid,
            paid_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Ledger exports arrive with either ISO or UK day-first dates.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}

/// Accepts bank-style amounts: currency sign, thousands separators, spaces.
fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '£' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let amount: f64 = cleaned.parse().ok()?;
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn parse_amount_for_tests(value: &str) -> Option<f64> {
    parse_amount(value)
}
