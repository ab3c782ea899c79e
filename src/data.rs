//! Order table model and CSV loading

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{TransformError, TransformResult};

/// Name of the customer identifier column
pub const CUSTOMER: &str = "customer";
/// Name of the order amount column
pub const AMOUNT: &str = "amount";
/// Name of the order timestamp column
pub const DATE: &str = "date";

/// Datetime layouts tried in order after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
];

/// What a column holds and where its value lives on an [`Order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Customer,
    Amount,
    Date,
    /// Untyped text column; the index points into the order's extra values
    Text(usize),
}

/// A named column of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// One purchase record
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Position of the record in its source, shown as the row index
    pub row: usize,
    pub customer: String,
    pub amount: i64,
    pub date: NaiveDateTime,
    extra: Vec<String>,
}

impl Order {
    pub fn new(row: usize, customer: impl Into<String>, amount: i64, date: NaiveDateTime) -> Self {
        Self {
            row,
            customer: customer.into(),
            amount,
            date,
            extra: Vec::new(),
        }
    }

    /// Value of the text column stored at `index`
    pub fn text(&self, index: usize) -> &str {
        self.extra.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// Ordered orders sharing one growable set of named columns.
///
/// Every order carries a value for every column: the typed `customer`,
/// `amount` and `date` fields, plus one text value per extra column. The only
/// ways to build a table either take typed orders or coerce raw text, so
/// `amount` is always an integer once a table exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Vec<ColumnSpec>,
    orders: Vec<Order>,
}

impl Table {
    /// Build a table with the three required columns from typed orders
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let schema = vec![
            ColumnSpec {
                name: CUSTOMER.to_string(),
                kind: ColumnKind::Customer,
            },
            ColumnSpec {
                name: AMOUNT.to_string(),
                kind: ColumnKind::Amount,
            },
            ColumnSpec {
                name: DATE.to_string(),
                kind: ColumnKind::Date,
            },
        ];
        let orders = orders
            .into_iter()
            .map(|mut order| {
                order.extra.clear();
                order
            })
            .collect();
        Self { schema, orders }
    }

    /// Build a table from a header and raw text rows, coercing `amount` and `date`.
    ///
    /// Repeated header names are kept, renamed `name.1`, `name.2`, ... after
    /// their first occurrence, which is the one the required columns bind to.
    /// Fails with a data load error when a required column is missing, a row
    /// has the wrong width, or a value cannot be coerced.
    pub fn from_raw(headers: Vec<String>, rows: Vec<Vec<String>>) -> TransformResult<Self> {
        let headers = dedupe_headers(headers);

        let position = |wanted: &str| -> TransformResult<usize> {
            headers.iter().position(|h| h == wanted).ok_or_else(|| {
                TransformError::DataLoad(format!("missing required column '{}'", wanted))
            })
        };
        let customer_at = position(CUSTOMER)?;
        let amount_at = position(AMOUNT)?;
        let date_at = position(DATE)?;

        let mut text_positions = Vec::new();
        let schema: Vec<ColumnSpec> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let kind = if i == customer_at {
                    ColumnKind::Customer
                } else if i == amount_at {
                    ColumnKind::Amount
                } else if i == date_at {
                    ColumnKind::Date
                } else {
                    text_positions.push(i);
                    ColumnKind::Text(text_positions.len() - 1)
                };
                ColumnSpec {
                    name: name.clone(),
                    kind,
                }
            })
            .collect();

        let mut orders = Vec::with_capacity(rows.len());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != headers.len() {
                return Err(TransformError::DataLoad(format!(
                    "row {}: expected {} fields, found {}",
                    row,
                    headers.len(),
                    values.len()
                )));
            }

            let raw_amount = &values[amount_at];
            let amount = coerce_amount(raw_amount).ok_or_else(|| {
                TransformError::DataLoad(format!(
                    "row {}: column '{}': cannot convert '{}' to an integer",
                    row, AMOUNT, raw_amount
                ))
            })?;

            let raw_date = &values[date_at];
            let date = parse_date(raw_date).ok_or_else(|| {
                TransformError::DataLoad(format!(
                    "row {}: column '{}': cannot parse '{}' as a date",
                    row, DATE, raw_date
                ))
            })?;

            let extra = text_positions.iter().map(|&i| values[i].clone()).collect();
            orders.push(Order {
                row,
                customer: values[customer_at].clone(),
                amount,
                date,
                extra,
            });
        }

        Ok(Self { schema, orders })
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn schema(&self) -> &[ColumnSpec] {
        &self.schema
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.iter().any(|c| c.name == name)
    }

    /// All values of a column rendered as text, in row order
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let spec = self.schema.iter().find(|c| c.name == name)?;
        Some(
            self.orders
                .iter()
                .map(|order| match spec.kind {
                    ColumnKind::Customer => order.customer.clone(),
                    ColumnKind::Amount => order.amount.to_string(),
                    ColumnKind::Date => order.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ColumnKind::Text(i) => order.text(i).to_string(),
                })
                .collect(),
        )
    }

    pub fn amounts(&self) -> Vec<i64> {
        self.orders.iter().map(|o| o.amount).collect()
    }

    /// Append a text column; the caller has already checked the name and length.
    pub(crate) fn push_text_column(&mut self, name: String, values: Vec<String>) {
        let index = self
            .schema
            .iter()
            .filter(|c| matches!(c.kind, ColumnKind::Text(_)))
            .count();
        self.schema.push(ColumnSpec {
            name,
            kind: ColumnKind::Text(index),
        });
        for (order, value) in self.orders.iter_mut().zip(values) {
            order.extra.push(value);
        }
    }

    /// New table with this table's columns holding the given orders
    pub(crate) fn with_orders(&self, orders: Vec<Order>) -> Self {
        Self {
            schema: self.schema.clone(),
            orders,
        }
    }
}

/// Rename repeated header names to `name.N`, skipping names already taken
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut renamed = Vec::with_capacity(headers.len());
    for name in headers {
        let mut unique = name.clone();
        let mut n = 1;
        while seen.contains(&unique) {
            unique = format!("{}.{}", name, n);
            n += 1;
        }
        seen.insert(unique.clone());
        renamed.push(unique);
    }
    renamed
}

/// Coerce a raw amount to an integer.
///
/// Integer text is taken as is. Finite decimal text is truncated toward zero.
/// Everything else, including blanks, NaN and infinities, is rejected.
pub fn coerce_amount(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(value) = s.parse::<i64>() {
        return Some(value);
    }
    let value = s.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Best-effort timestamp parsing over the common ISO, slash and textual layouts.
///
/// Offsets are accepted but dropped: the local wall-clock time is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load the orders file at `path` into a table.
///
/// The first line is the header and must name `customer`, `amount` and `date`;
/// any other columns are carried along as text.
pub fn read_orders<P: AsRef<Path>>(path: P) -> TransformResult<Table> {
    let path = path.as_ref();
    debug!("opening {}", path.display());

    let file = File::open(path).map_err(|source| TransformError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TransformError::DataLoad(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::from_raw(headers, rows)?;
    info!(
        "loaded {} orders with columns {:?} from {}",
        table.len(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}
