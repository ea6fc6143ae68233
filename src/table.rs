use std::fmt::Write as _;

/// Renders rows as an aligned text table. Cells that read as numbers are
/// right-aligned; rows beyond `max_rows` are summarized on a final line.
pub fn render_table(headers: &[String], rows: &[Vec<String>], max_rows: usize) -> String {
    let shown = &rows[..rows.len().min(max_rows)];
    let mut widths = headers
        .iter()
        .map(|h| display_width(h).max(3))
        .collect::<Vec<_>>();
    for row in shown {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in shown {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    if rows.len() > shown.len() {
        let _ = writeln!(output, "... {} more row(s)", rows.len() - shown.len());
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>], max_rows: usize) {
    print!("{}", render_table(headers, rows, max_rows));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = value.replace(['\n', '\r', '\t'], " ");
            if looks_numeric(&cell) {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn looks_numeric(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}
