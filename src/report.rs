//! Plain-text rendering of table samples

use chrono::NaiveTime;

use crate::data::{ColumnKind, Table};

/// Render the first `n` rows of `table` as a right-aligned text grid.
///
/// The leading unnamed column is each order's source row index. Dates drop
/// their time part when every shown date falls on midnight.
pub fn render_sample(table: &Table, n: usize) -> String {
    if table.is_empty() {
        return format!(
            "Empty table\nColumns: [{}]",
            table.column_names().join(", ")
        );
    }

    let shown = &table.orders()[..n.min(table.len())];
    let date_format = if shown.iter().all(|o| o.date.time() == NaiveTime::MIN) {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(shown.len() + 1);
    let mut header = vec![String::new()];
    header.extend(table.schema().iter().map(|c| c.name.clone()));
    grid.push(header);

    for order in shown {
        let mut line = vec![order.row.to_string()];
        line.extend(table.schema().iter().map(|c| match c.kind {
            ColumnKind::Customer => order.customer.clone(),
            ColumnKind::Amount => order.amount.to_string(),
            ColumnKind::Date => order.date.format(date_format).to_string(),
            ColumnKind::Text(i) => order.text(i).to_string(),
        }));
        grid.push(line);
    }

    let mut widths = vec![0; grid[0].len()];
    for line in &grid {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    grid.iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Order;
    use crate::transform::enrich;
    use chrono::NaiveDate;

    fn create_test_table() -> Table {
        let day = |d| {
            NaiveDate::from_ymd_opt(2020, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        Table::from_orders(vec![
            Order::new(0, "A", 10, day(1)),
            Order::new(1, "B", 0, day(2)),
            Order::new(2, "Carol", 40, day(3)),
        ])
    }

    #[test]
    fn test_render_sample() {
        let mut table = create_test_table();
        enrich(&mut table, "Country", ["GBR", "AUS", "USA"]).unwrap();

        let text = render_sample(&table, 2);
        assert_eq!(
            text,
            "   customer  amount        date  Country\n\
             0         A      10  2020-01-01      GBR\n\
             1         B       0  2020-01-02      AUS"
        );
    }

    #[test]
    fn test_render_sample_with_times() {
        let table = Table::from_orders(vec![Order::new(
            7,
            "A",
            3,
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
        )]);
        let text = render_sample(&table, 5);
        assert!(text.contains("2020-01-01 09:15:00"));
        assert!(text.lines().nth(1).unwrap().starts_with('7'));
    }

    #[test]
    fn test_render_empty_table() {
        let table = Table::from_orders(Vec::new());
        assert_eq!(
            render_sample(&table, 5),
            "Empty table\nColumns: [customer, amount, date]"
        );
    }
}
