use std::borrow::Cow;
use std::fmt::Write as _;

/// Renders the cell matrix as an elastic text table for terminal preview.
/// The matrix carries no header row, so every line is a data line.
pub fn render_matrix(matrix: &[Vec<String>]) -> String {
    let column_count = matrix.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![1usize; column_count];
    for row in matrix {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    for row in matrix {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_matrix(matrix: &[Vec<String>]) {
    print!("{}", render_matrix(matrix));
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(row.len());
    for (idx, value) in row.iter().enumerate() {
        let sanitized = sanitize_cell(value);
        let width = sanitized.chars().count();
        let mut cell = sanitized.into_owned();
        let padding = widths.get(idx).copied().unwrap_or_default().saturating_sub(width);
        if padding > 0 {
            cell.push_str(&" ".repeat(padding));
        }
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            value
                .chars()
                .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_across_ragged_rows() {
        let matrix = vec![
            vec!["".to_string(), "numero_releve".to_string(), "R1".to_string()],
            vec!["".to_string()],
            vec!["Strate arborée".to_string(), "Fagus".to_string(), "2".to_string()],
        ];
        let rendered = render_matrix(&matrix);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("numero_releve"));
        // Separator row renders as an empty line.
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("Strate arborée"));
    }
}
