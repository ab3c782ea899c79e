//! Table transformations: column enrichment and threshold splitting

use tracing::{debug, info};

use crate::data::Table;
use crate::error::{TransformError, TransformResult};

/// Append a column of externally supplied values to every row, in row order.
///
/// The table is changed in place and the same borrow is handed back, so
/// callers never hold two diverging copies. `values` must hold exactly one
/// entry per row and `column_name` must be new; on failure the table is left
/// untouched.
pub fn enrich<'a, I, S>(
    table: &'a mut Table,
    column_name: &str,
    values: I,
) -> TransformResult<&'a mut Table>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if table.has_column(column_name) {
        return Err(TransformError::ColumnExists(column_name.to_string()));
    }

    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    if values.len() != table.len() {
        return Err(TransformError::ShapeMismatch {
            column: column_name.to_string(),
            expected: table.len(),
            got: values.len(),
        });
    }

    table.push_text_column(column_name.to_string(), values);
    info!("appended column '{}' to {} orders", column_name, table.len());
    Ok(table)
}

/// Split orders into those below `threshold` and those at or above it.
///
/// Rows are stably sorted ascending by amount and cut at the first amount that
/// is not below the threshold, so rows equal to the threshold go to the high
/// group. Both halves keep the sorted order. The input table is not modified.
/// A NaN threshold orders against nothing and fails with a domain error.
pub fn split(table: &Table, threshold: f64) -> TransformResult<(Table, Table)> {
    if threshold.is_nan() {
        return Err(TransformError::Domain(
            "cannot split orders at a NaN threshold".to_string(),
        ));
    }

    let mut sorted = table.orders().to_vec();
    sorted.sort_by_key(|order| order.amount);

    let cut = sorted.partition_point(|order| (order.amount as f64) < threshold);
    let high = sorted.split_off(cut);
    debug!(
        "split at {}: {} low, {} high",
        threshold,
        sorted.len(),
        high.len()
    );

    Ok((table.with_orders(sorted), table.with_orders(high)))
}
