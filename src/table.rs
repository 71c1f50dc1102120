//! Plain-text grid tables in the classic "pretty" style.
//!
//! ```text
//! +----------+--------+
//! | Provider | Region |
//! +----------+--------+
//! |   aws    | eu-1   |
//! +----------+--------+
//! ```
//!
//! Every cell is centred in its column; when the padding is odd the extra space goes
//! to the right. The output has no trailing newline, so the width of the table is the
//! length of its first line.

/// Renders `headers` and `rows` as a bordered grid.
pub fn render_pretty<H, R, C>(headers: &[H], rows: &[R]) -> String
where
    H: AsRef<str>,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| text_width(h.as_ref())).collect();
    for row in rows {
        for (index, value) in row.as_ref().iter().take(columns).enumerate() {
            widths[index] = widths[index].max(text_width(value.as_ref()));
        }
    }

    let rule = rule_line(&widths);
    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(rule.clone());
    lines.push(row_line(&widths, headers.iter().map(|h| h.as_ref())));
    lines.push(rule.clone());
    for row in rows {
        let cells = row.as_ref();
        lines.push(row_line(
            &widths,
            (0..columns).map(|index| cells.get(index).map(|c| c.as_ref()).unwrap_or("")),
        ));
    }
    lines.push(rule);
    lines.join("\n")
}

/// Width of the widest line of a rendered table.
pub fn table_width(table: &str) -> usize {
    table.lines().map(text_width).max().unwrap_or(0)
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

fn rule_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn row_line<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (width, value) in widths.iter().zip(cells) {
        let padding = width - text_width(value);
        let left = padding / 2;
        line.push(' ');
        line.push_str(&" ".repeat(left));
        line.push_str(value);
        line.push_str(&" ".repeat(padding - left));
        line.push_str(" |");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_grid_with_centred_cells() {
        let table = render_pretty(
            &["Benchmark", "Best"],
            &[vec!["LINPACK", "aws / eu / m5"], vec!["CoreMark Multi", "gcp"]],
        );
        let expected = "\
+----------------+---------------+
|   Benchmark    |     Best      |
+----------------+---------------+
|    LINPACK     | aws / eu / m5 |
| CoreMark Multi |      gcp      |
+----------------+---------------+";
        assert_eq!(table, expected);
        assert_eq!(table_width(&table), 34);
    }

    #[test]
    fn empty_body_keeps_header() {
        let rows: Vec<Vec<String>> = Vec::new();
        let table = render_pretty(&["A"], &rows);
        assert_eq!(table, "+---+\n| A |\n+---+\n+---+");
    }

    #[test]
    fn short_rows_are_padded() {
        let table = render_pretty(&["A", "B"], &[vec!["x"]]);
        assert_eq!(table.lines().nth(3), Some("| x |   |"));
    }
}
