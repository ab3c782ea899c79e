//! Descriptive statistics over an order table

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::data::{Order, Table};
use crate::error::{TransformError, TransformResult};

/// The facts reported for a whole order table
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub highest_customer: String,
    pub lowest_customer: String,
    pub mean_amount: f64,
    pub earliest_customer: String,
    pub most_common_month: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The customer who placed the highest order amount was {}.",
            self.highest_customer
        )?;
        writeln!(
            f,
            "The customer who placed the lowest order amount was {}.",
            self.lowest_customer
        )?;
        writeln!(
            f,
            "The average order amount across all customers was {:?}.",
            self.mean_amount
        )?;
        writeln!(
            f,
            "The customer who placed the earliest order was {}.",
            self.earliest_customer
        )?;
        write!(f, "Most orders happened in {}.", self.most_common_month)
    }
}

fn require_rows<'a>(table: &'a Table, what: &str) -> TransformResult<&'a [Order]> {
    if table.is_empty() {
        return Err(TransformError::Domain(format!(
            "{} is undefined for an empty table",
            what
        )));
    }
    Ok(table.orders())
}

/// Geometric mean of the strictly positive amounts.
///
/// Zero and negative amounts are ignored. The result always lies between the
/// smallest and largest positive amount.
pub fn geometric_mean(amounts: &[i64]) -> TransformResult<f64> {
    let positive: Vec<f64> = amounts
        .iter()
        .filter(|&&a| a > 0)
        .map(|&a| a as f64)
        .collect();
    if positive.is_empty() {
        return Err(TransformError::Domain(
            "geometric mean needs at least one positive amount".to_string(),
        ));
    }

    let log_sum: f64 = positive.iter().map(|a| a.ln()).sum();
    let mean = (log_sum / positive.len() as f64).exp();

    let min = positive.iter().copied().fold(f64::INFINITY, f64::min);
    let max = positive.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(mean.clamp(min, max))
}

/// Spend threshold separating low and high orders
pub fn spending_threshold(table: &Table) -> TransformResult<f64> {
    let threshold = geometric_mean(&table.amounts())?;
    debug!("geometric mean of positive amounts is {}", threshold);
    Ok(threshold)
}

/// Customer of the largest order; among equal amounts the last row wins,
/// as it would after a stable ascending sort.
pub fn highest_order_customer(table: &Table) -> TransformResult<&str> {
    let orders = require_rows(table, "highest order")?;
    Ok(orders
        .iter()
        .max_by_key(|o| o.amount)
        .map(|o| o.customer.as_str())
        .unwrap_or_default())
}

/// Customer of the smallest order; among equal amounts the first row wins.
pub fn lowest_order_customer(table: &Table) -> TransformResult<&str> {
    let orders = require_rows(table, "lowest order")?;
    Ok(orders
        .iter()
        .min_by_key(|o| o.amount)
        .map(|o| o.customer.as_str())
        .unwrap_or_default())
}

/// Arithmetic mean over every amount, zero and negative included
pub fn mean_amount(table: &Table) -> TransformResult<f64> {
    let orders = require_rows(table, "mean amount")?;
    let sum: f64 = orders.iter().map(|o| o.amount as f64).sum();
    Ok(sum / orders.len() as f64)
}

/// Customer of the earliest order; among equal dates the first row wins.
pub fn earliest_order_customer(table: &Table) -> TransformResult<&str> {
    let orders = require_rows(table, "earliest order")?;
    Ok(orders
        .iter()
        .min_by_key(|o| o.date)
        .map(|o| o.customer.as_str())
        .unwrap_or_default())
}

/// Most frequent English month name across order dates.
///
/// Ties go to the alphabetically first month name.
pub fn most_common_month(table: &Table) -> TransformResult<String> {
    let orders = require_rows(table, "most common month")?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for order in orders {
        *counts.entry(order.date.format("%B").to_string()).or_insert(0) += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for (month, &count) in &counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((month, count));
        }
    }
    best.map(|(month, _)| month.clone())
        .ok_or_else(|| TransformError::Domain("no order dates".to_string()))
}

/// Compute every reported fact for the table
pub fn summarize(table: &Table) -> TransformResult<Summary> {
    let summary = Summary {
        highest_customer: highest_order_customer(table)?.to_string(),
        lowest_customer: lowest_order_customer(table)?.to_string(),
        mean_amount: mean_amount(table)?,
        earliest_customer: earliest_order_customer(table)?.to_string(),
        most_common_month: most_common_month(table)?,
    };
    debug!("summary: {:?}", summary);
    Ok(summary)
}
